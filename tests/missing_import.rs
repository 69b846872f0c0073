mod common;

use common::{
    DOCTRINE_MAPPING, apply_action, change, code_actions, create_test_backend,
    create_test_backend_with_namespaces, open,
};
use phpantom_annotations::{DIAGNOSTIC_CODE, DIAGNOSTIC_SOURCE, MISSING_IMPORT_MESSAGE};
use tower_lsp::LanguageServer;
use tower_lsp::lsp_types::*;

fn mapping_uri() -> Url {
    Url::parse("file:///vendor/doctrine/orm/Mapping.php").unwrap()
}

#[tokio::test]
async fn test_unimported_tag_gets_warning_and_single_fix() {
    let backend = create_test_backend();
    open(&backend, &mapping_uri(), DOCTRINE_MAPPING).await;

    let uri = Url::parse("file:///src/User.php").unwrap();
    let text = concat!(
        "<?php\n",
        "namespace App\\Entity;\n",
        "\n",
        "/**\n",
        " * @Entity\n",
        " */\n",
        "class User {}\n",
    );
    open(&backend, &uri, text).await;

    let diagnostics = backend.diagnostics_for(uri.as_str());
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.message, MISSING_IMPORT_MESSAGE);
    assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::WARNING));
    assert_eq!(diagnostic.source.as_deref(), Some(DIAGNOSTIC_SOURCE));
    assert_eq!(
        diagnostic.code,
        Some(NumberOrString::String(DIAGNOSTIC_CODE.to_string()))
    );
    // Anchored at the name token only.
    assert_eq!(
        diagnostic.range,
        Range::new(Position::new(4, 3), Position::new(4, 10))
    );
    assert_eq!(
        diagnostic.data,
        Some(serde_json::json!(["Doctrine\\ORM\\Mapping\\Entity"]))
    );

    let actions = code_actions(&backend, &uri).await;
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].title, "Import `Doctrine\\ORM\\Mapping\\Entity`");
    assert_eq!(actions[0].kind, Some(CodeActionKind::QUICKFIX));
    assert_eq!(actions[0].is_preferred, Some(true));
    assert_eq!(actions[0].diagnostics.as_ref().map(|d| d.len()), Some(1));
}

#[tokio::test]
async fn test_two_candidates_give_two_fixes_in_fqn_order() {
    let backend = create_test_backend();
    open(
        &backend,
        &Url::parse("file:///vendor/symfony/Route.php").unwrap(),
        "<?php\nnamespace Symfony\\Component\\Routing\\Annotation;\nclass Route {}\n",
    )
    .await;
    open(
        &backend,
        &Url::parse("file:///vendor/sensio/Route.php").unwrap(),
        "<?php\nnamespace Sensio\\Bundle\\FrameworkExtraBundle\\Configuration;\nclass Route {}\n",
    )
    .await;

    let uri = Url::parse("file:///src/Controller.php").unwrap();
    let text = concat!(
        "<?php\n",
        "namespace App\\Controller;\n",
        "\n",
        "class HomeController {\n",
        "    /** @Route(\"/\") */\n",
        "    public function index() {}\n",
        "}\n",
    );
    open(&backend, &uri, text).await;

    let actions = code_actions(&backend, &uri).await;
    let titles: Vec<&str> = actions.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Import `Sensio\\Bundle\\FrameworkExtraBundle\\Configuration\\Route`",
            "Import `Symfony\\Component\\Routing\\Annotation\\Route`",
        ]
    );
    assert!(actions.iter().all(|a| a.is_preferred == Some(false)));
}

#[tokio::test]
async fn test_imported_tag_is_not_reported() {
    let backend = create_test_backend_with_namespaces(&["\\App\\Annotation"]);
    open(
        &backend,
        &Url::parse("file:///src/Annotation/Foo.php").unwrap(),
        "<?php\nnamespace App\\Annotation;\nclass Foo {}\n",
    )
    .await;

    let uri = Url::parse("file:///src/Service.php").unwrap();
    let text = concat!(
        "<?php\n",
        "namespace App\\Service;\n",
        "\n",
        "use App\\Annotation\\Foo;\n",
        "\n",
        "/** @Foo */\n",
        "class Service {}\n",
    );
    open(&backend, &uri, text).await;

    assert!(backend.diagnostics_for(uri.as_str()).is_empty());
    assert!(code_actions(&backend, &uri).await.is_empty());
}

#[tokio::test]
async fn test_alias_match_is_case_insensitive() {
    let backend = create_test_backend();
    open(&backend, &mapping_uri(), DOCTRINE_MAPPING).await;

    let uri = Url::parse("file:///src/Post.php").unwrap();
    let text = concat!(
        "<?php\n",
        "namespace App\\Entity;\n",
        "\n",
        "use Doctrine\\ORM\\Mapping as orm;\n",
        "\n",
        "/**\n",
        " * @ORM\\Entity\n",
        " * @ORM\\Column(type=\"string\")\n",
        " */\n",
        "class Post {}\n",
    );
    open(&backend, &uri, text).await;

    assert!(backend.diagnostics_for(uri.as_str()).is_empty());
}

#[tokio::test]
async fn test_missing_class_is_reported_without_fix() {
    let backend = create_test_backend();

    let uri = Url::parse("file:///src/Thing.php").unwrap();
    let text = "<?php\nnamespace App;\n\n/** @DoesNotExist */\nclass Thing {}\n";
    open(&backend, &uri, text).await;

    let diagnostics = backend.diagnostics_for(uri.as_str());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].data, Some(serde_json::json!([])));
    assert!(code_actions(&backend, &uri).await.is_empty());
}

#[tokio::test]
async fn test_documentation_tags_are_ignored_even_when_a_class_matches() {
    let backend = create_test_backend_with_namespaces(&["\\Lib"]);
    open(
        &backend,
        &Url::parse("file:///lib/Tags.php").unwrap(),
        "<?php\nnamespace Lib;\nclass param {}\nclass author {}\n",
    )
    .await;

    let uri = Url::parse("file:///src/Doc.php").unwrap();
    let text = concat!(
        "<?php\n",
        "namespace App;\n",
        "\n",
        "class Doc {\n",
        "    /**\n",
        "     * Contact dev@example.com for details.\n",
        "     *\n",
        "     * @param string $name\n",
        "     * @return void\n",
        "     * @psalm-suppress MixedAssignment\n",
        "     */\n",
        "    public function run($name) {}\n",
        "}\n",
    );
    open(&backend, &uri, text).await;

    assert!(backend.diagnostics_for(uri.as_str()).is_empty());
}

#[tokio::test]
async fn test_configured_ignored_tags_are_skipped() {
    let backend = phpantom_annotations::Backend::new_test_with_config(
        phpantom_annotations::AnnotationConfig {
            ignored_tags: vec!["Secret".to_string()],
            ..phpantom_annotations::AnnotationConfig::default()
        },
    );

    let uri = Url::parse("file:///src/Ignored.php").unwrap();
    open(&backend, &uri, "<?php\nnamespace App;\n/** @Secret */\nclass A {}\n").await;

    assert!(backend.diagnostics_for(uri.as_str()).is_empty());
}

#[tokio::test]
async fn test_fully_qualified_tag_is_exempt() {
    let backend = create_test_backend();

    let uri = Url::parse("file:///src/Fq.php").unwrap();
    let text = "<?php\nnamespace App;\n\n/** @\\Vendor\\Nowhere\\Foo */\nclass Fq {}\n";
    open(&backend, &uri, text).await;

    assert!(backend.diagnostics_for(uri.as_str()).is_empty());
}

#[tokio::test]
async fn test_same_namespace_class_is_a_direct_reference() {
    let backend = create_test_backend();
    open(
        &backend,
        &Url::parse("file:///src/Entity/Marker.php").unwrap(),
        "<?php\nnamespace App\\Entity;\n\n/** @Annotation */\nfinal class Marker {}\n",
    )
    .await;

    let uri = Url::parse("file:///src/Entity/Order.php").unwrap();
    let text = "<?php\nnamespace App\\Entity;\n\n/** @Marker */\nclass Order {}\n";
    open(&backend, &uri, text).await;

    assert!(backend.diagnostics_for(uri.as_str()).is_empty());
}

#[tokio::test]
async fn test_classes_outside_the_allow_list_are_not_offered() {
    let backend = create_test_backend_with_namespaces(&["\\App\\Annotation"]);
    open(
        &backend,
        &Url::parse("file:///lib/Foo.php").unwrap(),
        "<?php\nnamespace Random\\Stuff;\nclass Foo {}\n",
    )
    .await;

    let uri = Url::parse("file:///src/A.php").unwrap();
    open(&backend, &uri, "<?php\nnamespace App;\n/** @Foo */\nclass A {}\n").await;

    let diagnostics = backend.diagnostics_for(uri.as_str());
    assert_eq!(diagnostics.len(), 1);
    assert!(code_actions(&backend, &uri).await.is_empty());
}

#[tokio::test]
async fn test_nested_annotations_are_each_reported() {
    let backend = create_test_backend();
    open(&backend, &mapping_uri(), DOCTRINE_MAPPING).await;

    let uri = Url::parse("file:///src/Group.php").unwrap();
    let text = concat!(
        "<?php\n",
        "namespace App\\Entity;\n",
        "\n",
        "class Group {\n",
        "    /**\n",
        "     * @JoinTable(name=\"g\", joinColumns={@JoinColumn(name=\"a\")})\n",
        "     */\n",
        "    private $users;\n",
        "}\n",
    );
    open(&backend, &uri, text).await;

    let actions = code_actions(&backend, &uri).await;
    let titles: Vec<&str> = actions.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Import `Doctrine\\ORM\\Mapping\\JoinTable`",
            "Import `Doctrine\\ORM\\Mapping\\JoinColumn`",
        ]
    );
}

#[tokio::test]
async fn test_applying_the_fix_clears_the_problem() {
    let backend = create_test_backend();
    open(&backend, &mapping_uri(), DOCTRINE_MAPPING).await;

    let uri = Url::parse("file:///src/Invoice.php").unwrap();
    let text = concat!(
        "<?php\n",
        "namespace App\\Entity;\n",
        "\n",
        "use App\\Base\\Model;\n",
        "\n",
        "/**\n",
        " * @ORM\\Entity\n",
        " */\n",
        "class Invoice extends Model {}\n",
    );
    open(&backend, &uri, text).await;

    let actions = code_actions(&backend, &uri).await;
    assert_eq!(actions.len(), 1);
    let fixed = apply_action(text, &uri, &actions[0]);
    assert_eq!(
        fixed,
        concat!(
            "<?php\n",
            "namespace App\\Entity;\n",
            "\n",
            "use App\\Base\\Model;\n",
            "use Doctrine\\ORM\\Mapping\\Entity;\n",
            "\n",
            "/**\n",
            " * @Entity\n",
            " */\n",
            "class Invoice extends Model {}\n",
        )
    );

    change(&backend, &uri, &fixed).await;
    assert!(backend.diagnostics_for(uri.as_str()).is_empty());
    assert!(code_actions(&backend, &uri).await.is_empty());
}

#[tokio::test]
async fn test_fix_reuses_an_existing_alias() {
    let backend = create_test_backend();
    open(&backend, &mapping_uri(), DOCTRINE_MAPPING).await;

    let uri = Url::parse("file:///src/Line.php").unwrap();
    let text = concat!(
        "<?php\n",
        "namespace App\\Entity;\n",
        "\n",
        "use Doctrine\\ORM\\Mapping\\Column as Col;\n",
        "\n",
        "class Line {\n",
        "    /** @ORM\\Column(type=\"string\") */\n",
        "    private $name;\n",
        "    /** @Column */\n",
        "    private $qty;\n",
        "}\n",
    );
    open(&backend, &uri, text).await;
    assert_eq!(backend.diagnostics_for(uri.as_str()).len(), 2);

    // Both tags are offered a fix, and the first one only renames the tag.
    let actions = code_actions(&backend, &uri).await;
    assert_eq!(actions.len(), 2);
    let once = apply_action(text, &uri, &actions[0]);
    assert!(once.contains("/** @Col(type=\"string\") */"));
    assert_eq!(once.matches("use ").count(), 1);

    change(&backend, &uri, &once).await;
    let actions = code_actions(&backend, &uri).await;
    assert_eq!(actions.len(), 1);
    let twice = apply_action(&once, &uri, &actions[0]);
    assert!(twice.contains("    /** @Col */\n    private $qty;"));

    change(&backend, &uri, &twice).await;
    assert!(backend.diagnostics_for(uri.as_str()).is_empty());
    assert!(code_actions(&backend, &uri).await.is_empty());
}

#[tokio::test]
async fn test_problem_follows_edits() {
    let backend = create_test_backend();
    open(&backend, &mapping_uri(), DOCTRINE_MAPPING).await;

    let uri = Url::parse("file:///src/Live.php").unwrap();
    open(&backend, &uri, "<?php\nnamespace App;\nclass Live {}\n").await;
    assert!(backend.diagnostics_for(uri.as_str()).is_empty());

    change(&backend, &uri, "<?php\nnamespace App;\n/** @Column */\nclass Live {}\n").await;
    assert_eq!(backend.diagnostics_for(uri.as_str()).len(), 1);
}

#[tokio::test]
async fn test_close_forgets_document_but_keeps_symbols() {
    let backend = create_test_backend();
    open(&backend, &mapping_uri(), DOCTRINE_MAPPING).await;

    let uri = Url::parse("file:///src/Closed.php").unwrap();
    open(&backend, &uri, "<?php\nnamespace App;\n/** @Column */\nclass C {}\n").await;
    assert_eq!(backend.diagnostics_for(uri.as_str()).len(), 1);

    backend
        .did_close(DidCloseTextDocumentParams {
            text_document: TextDocumentIdentifier {
                uri: mapping_uri(),
            },
        })
        .await;
    backend
        .did_close(DidCloseTextDocumentParams {
            text_document: TextDocumentIdentifier { uri: uri.clone() },
        })
        .await;
    assert!(backend.diagnostics_for(uri.as_str()).is_empty());

    // Reopening still finds the candidate from the closed mapping file.
    open(&backend, &uri, "<?php\nnamespace App;\n/** @Column */\nclass C {}\n").await;
    assert_eq!(code_actions(&backend, &uri).await.len(), 1);
}
