//! Documentation-only tags.
//!
//! Docblocks mix annotations (`@ORM\Entity`) with ordinary documentation
//! tags (`@param`, `@return`, ...).  The latter are never class references,
//! even when a class of the same name happens to exist, so they are
//! excluded from resolution by exact name before anything else happens.

use crate::config::AnnotationConfig;

/// Tags that are never treated as annotations.  Matched by exact name.
pub const NON_ANNOTATION_TAGS: &[&str] = &[
    // phpDocumentor
    "@abstract",
    "@access",
    "@api",
    "@author",
    "@category",
    "@copyright",
    "@deprecated",
    "@example",
    "@filesource",
    "@final",
    "@global",
    "@ignore",
    "@internal",
    "@license",
    "@link",
    "@method",
    "@name",
    "@package",
    "@param",
    "@property",
    "@property-read",
    "@property-write",
    "@return",
    "@see",
    "@since",
    "@source",
    "@static",
    "@staticvar",
    "@subpackage",
    "@throws",
    "@todo",
    "@TODO",
    "@tutorial",
    "@uses",
    "@used-by",
    "@var",
    "@version",
    "@inheritdoc",
    "@inheritDoc",
    "@noinspection",
    "@fixme",
    "@FIXME",
    // Generics and static analysis
    "@template",
    "@template-covariant",
    "@template-contravariant",
    "@extends",
    "@implements",
    "@use",
    "@mixin",
    "@readonly",
    "@immutable",
    "@pure",
    "@suppress",
    // Annotation meta tags, used on annotation classes themselves
    "@Annotation",
    "@Attribute",
    "@Attributes",
    "@Enum",
    "@IgnoreAnnotation",
    "@NamedArgumentConstructor",
    "@Required",
    "@Target",
    // PHPUnit
    "@after",
    "@afterClass",
    "@backupGlobals",
    "@backupStaticAttributes",
    "@before",
    "@beforeClass",
    "@codeCoverageIgnore",
    "@codeCoverageIgnoreEnd",
    "@codeCoverageIgnoreStart",
    "@covers",
    "@coversDefaultClass",
    "@coversNothing",
    "@dataProvider",
    "@depends",
    "@doesNotPerformAssertions",
    "@expectedException",
    "@expectedExceptionCode",
    "@expectedExceptionMessage",
    "@group",
    "@large",
    "@medium",
    "@preserveGlobalState",
    "@requires",
    "@runInSeparateProcess",
    "@runTestsInSeparateProcesses",
    "@small",
    "@test",
    "@testdox",
    "@testWith",
    "@ticket",
];

/// Tag prefixes owned by static analysers (`@phpstan-param`, `@psalm-type`).
const ANALYSER_TAG_PREFIXES: &[&str] = &["@phpstan-", "@psalm-", "@phan-"];

/// Whether `raw_name` (including the `@`) is a documentation tag rather
/// than a potential annotation.
///
/// Blank names count as documentation tags: there is nothing to resolve.
pub fn is_documentation_tag(raw_name: &str, config: &AnnotationConfig) -> bool {
    let name = raw_name.trim();
    if name.trim_start_matches('@').is_empty() {
        return true;
    }

    if NON_ANNOTATION_TAGS.contains(&name) {
        return true;
    }

    if ANALYSER_TAG_PREFIXES.iter().any(|p| name.starts_with(p)) {
        return true;
    }

    let bare = name.trim_start_matches('@');
    config
        .ignored_tags
        .iter()
        .any(|t| t.trim_start_matches('@') == bare)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
