/// PHP parsing and symbol extraction.
///
/// This module parses PHP source text with the mago_syntax parser and
/// extracts everything the annotation inspector needs from one file:
///
/// - namespace scopes, each with its `use` imports and the class-like
///   declarations made directly inside it,
/// - every `/** ... */` docblock comment, parsed into a [`DocNode`] tree
///   and assigned to the scope it appears in.
///
/// All extracted data is owned so nothing depends on the parser's arena
/// lifetime.
///
/// Sub-modules:
/// - [`use_statements`]: `use` statement extraction
mod use_statements;

use std::panic;

use bumpalo::Bump;
use mago_span::HasSpan;
use mago_syntax::ast::*;
use mago_syntax::parser::parse_file_content;

use crate::docblock::{DocNode, parse_docblock};
use crate::types::{ClassLikeKind, ClassSymbol, NamespacePath, Span, UseImport};

/// One namespace block of a file, or the file-level global scope.
#[derive(Debug, Clone)]
pub struct NamespaceScope {
    pub namespace: NamespacePath,
    /// Byte range the scope covers.  For `namespace Foo;` blocks this runs
    /// up to the next namespace declaration (or the end of the file).
    pub span: Span,
    /// Class imports from `use` statements directly inside this scope.
    pub imports: Vec<UseImport>,
    /// Class-like declarations directly inside this scope.
    pub classes: Vec<ClassSymbol>,
}

impl NamespaceScope {
    fn new(namespace: NamespacePath, span: Span) -> Self {
        NamespaceScope {
            namespace,
            span,
            imports: Vec::new(),
            classes: Vec::new(),
        }
    }
}

/// A docblock comment together with the scope it appears in.
#[derive(Debug, Clone)]
pub struct DocblockComment {
    pub node: DocNode,
    /// Index into [`ParsedFile::scopes`].
    pub scope: usize,
}

/// Everything extracted from one PHP file.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// `scopes[0]` is always the file-level global scope; declared
    /// namespaces follow in source order.
    pub scopes: Vec<NamespaceScope>,
    pub docblocks: Vec<DocblockComment>,
}

impl ParsedFile {
    fn empty(len: usize) -> Self {
        ParsedFile {
            scopes: vec![NamespaceScope::new(
                NamespacePath::global(),
                Span::new(0, len as u32),
            )],
            docblocks: Vec::new(),
        }
    }

    /// The innermost scope containing `offset`.
    pub fn scope_at(&self, offset: u32) -> &NamespaceScope {
        &self.scopes[self.scope_index_at(offset)]
    }

    fn scope_index_at(&self, offset: u32) -> usize {
        self.scopes
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, s)| s.span.contains(offset))
            .map(|(i, _)| i)
            .last()
            .unwrap_or(0)
    }

    /// Whether the file declares any namespace.
    pub fn has_namespace(&self) -> bool {
        self.scopes.len() > 1
    }

    /// All class-like declarations in the file.
    pub fn classes(&self) -> impl Iterator<Item = &ClassSymbol> {
        self.scopes.iter().flat_map(|s| s.classes.iter())
    }
}

/// Parse PHP source text and extract scopes, classes, and docblocks.
///
/// The mago-syntax parser can panic on malformed input (half-typed
/// heredocs are common while editing).  A panic is caught and the file is
/// treated as empty, so a broken buffer never takes the server down.
pub fn parse_php_file(content: &str) -> ParsedFile {
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| parse_inner(content)));

    match result {
        Ok(parsed) => parsed,
        Err(_) => {
            tracing::error!("PHPantom: parser panicked, treating file as empty");
            ParsedFile::empty(content.len())
        }
    }
}

fn parse_inner(content: &str) -> ParsedFile {
    let arena = Bump::new();
    let file_id = mago_database::file::FileId::new("input.php");
    let program = parse_file_content(&arena, file_id, content);

    let mut parsed = ParsedFile::empty(content.len());

    for statement in program.statements.iter() {
        match statement {
            Statement::Use(use_stmt) => {
                use_statements::extract_use_items(
                    &use_stmt.items,
                    use_stmt.span().end.offset,
                    &mut parsed.scopes[0].imports,
                );
            }
            Statement::Namespace(ns) => {
                let namespace = ns
                    .name
                    .as_ref()
                    .map(|ident| NamespacePath::parse(ident.value()))
                    .unwrap_or_else(NamespacePath::global);
                let span = ns.span();
                let mut scope = NamespaceScope::new(
                    namespace,
                    Span::new(span.start.offset, span.end.offset),
                );
                collect_scope_statements(ns.statements().iter(), &mut scope);
                parsed.scopes.push(scope);
            }
            _ => {
                if let Some(class) = class_symbol(statement, &NamespacePath::global()) {
                    parsed.scopes[0].classes.push(class);
                }
            }
        }
    }

    extend_implicit_scopes(&mut parsed.scopes, content);

    for trivia in program.trivia.iter() {
        if !matches!(trivia.kind, TriviaKind::DocBlockComment) {
            continue;
        }
        let start = trivia.span.start.offset;
        let node = parse_docblock(trivia.value, start);
        let scope = parsed.scope_index_at(start);
        parsed.docblocks.push(DocblockComment { node, scope });
    }

    parsed
}

/// Walk the statements of one namespace body, collecting imports and
/// class-like declarations.
fn collect_scope_statements<'a>(
    statements: impl Iterator<Item = &'a Statement<'a>>,
    scope: &mut NamespaceScope,
) {
    for statement in statements {
        match statement {
            Statement::Use(use_stmt) => {
                use_statements::extract_use_items(
                    &use_stmt.items,
                    use_stmt.span().end.offset,
                    &mut scope.imports,
                );
            }
            _ => {
                if let Some(class) = class_symbol(statement, &scope.namespace) {
                    scope.classes.push(class);
                }
            }
        }
    }
}

fn class_symbol(statement: &Statement, namespace: &NamespacePath) -> Option<ClassSymbol> {
    let (name, kind) = match statement {
        Statement::Class(class) => (class.name.value, ClassLikeKind::Class),
        Statement::Interface(iface) => (iface.name.value, ClassLikeKind::Interface),
        Statement::Trait(trait_def) => (trait_def.name.value, ClassLikeKind::Trait),
        Statement::Enum(enum_def) => (enum_def.name.value, ClassLikeKind::Enum),
        _ => return None,
    };
    Some(ClassSymbol::new(namespace.clone(), name, kind))
}

/// `namespace Foo;` blocks have no closing brace: their body runs until the
/// next namespace declaration.  The parser's span stops at the last
/// statement, so trailing comments would otherwise fall into the global
/// scope.
fn extend_implicit_scopes(scopes: &mut [NamespaceScope], content: &str) {
    let file_end = content.len() as u32;
    let starts: Vec<u32> = scopes.iter().skip(1).map(|s| s.span.start).collect();

    for (i, scope) in scopes.iter_mut().enumerate().skip(1) {
        if is_braced_namespace(content, scope.span.start) {
            continue;
        }
        let limit = starts
            .get(i)
            .map(|next| next.saturating_sub(1))
            .unwrap_or(file_end);
        scope.span.end = scope.span.end.max(limit);
    }
}

/// Whether the namespace declaration at `start` opens a `{ ... }` body.
fn is_braced_namespace(content: &str, start: u32) -> bool {
    content
        .get(start as usize..)
        .and_then(|rest| rest.find([';', '{']).map(|idx| rest.as_bytes()[idx] == b'{'))
        .unwrap_or(false)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
