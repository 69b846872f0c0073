//! Annotation tag resolution.
//!
//! Given a docblock tag such as `@ORM\Column` and the namespace scope the
//! docblock sits in, decide what the tag refers to.  The steps run in
//! order and the first match wins:
//!
//!   1. The tag's first segment is an import alias → [`AlreadyImported`].
//!   2. The tag is written fully qualified (`@\Foo\Bar`) → [`FullyQualified`].
//!   3. PHP's class-name rules reach a known class → [`ResolvedReference`].
//!   4. Classes with the tag's simple name under the allow-listed
//!      annotation namespaces → [`Candidates`], or [`NoCandidates`].
//!
//! The import table is the expensive part of step 1, so it is handed in as
//! a [`LazyImportTable`]: built on first use, then shared by every tag of
//! the same docblock.
//!
//! [`AlreadyImported`]: ResolutionResult::AlreadyImported
//! [`FullyQualified`]: ResolutionResult::FullyQualified
//! [`ResolvedReference`]: ResolutionResult::ResolvedReference
//! [`Candidates`]: ResolutionResult::Candidates
//! [`NoCandidates`]: ResolutionResult::NoCandidates

use std::cell::OnceCell;
use std::collections::HashMap;

use crate::config::AnnotationConfig;
use crate::index::SymbolIndex;
use crate::parser::NamespaceScope;
use crate::types::{
    AnnotationTag, ClassSymbol, NS_SEPARATOR, NamespacePath, ResolutionResult, UseImport,
};
use crate::walker::classes_under_namespace;

/// Case-insensitive alias → import mapping for one namespace scope.
#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    entries: HashMap<String, UseImport>,
}

impl ImportTable {
    /// Build the table from a scope's imports.  PHP rejects duplicate
    /// aliases, so for broken code the first import wins.
    pub fn from_imports(imports: &[UseImport]) -> Self {
        let mut entries = HashMap::new();
        for import in imports {
            entries
                .entry(import.alias.to_lowercase())
                .or_insert_with(|| import.clone());
        }
        ImportTable { entries }
    }

    pub fn contains_alias(&self, alias: &str) -> bool {
        self.entries.contains_key(&alias.to_lowercase())
    }

    /// The imported name bound to `alias`, without a leading `\`.
    pub fn resolve_alias(&self, alias: &str) -> Option<&str> {
        self.entries
            .get(&alias.to_lowercase())
            .map(|import| import.fqn.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An [`ImportTable`] that is built at most once, on first access.
///
/// One instance lives for one docblock visit and is dropped with it.
pub struct LazyImportTable<'a> {
    scope: &'a NamespaceScope,
    table: OnceCell<ImportTable>,
}

impl<'a> LazyImportTable<'a> {
    pub fn new(scope: &'a NamespaceScope) -> Self {
        LazyImportTable {
            scope,
            table: OnceCell::new(),
        }
    }

    pub fn get(&self) -> &ImportTable {
        self.table.get_or_init(|| {
            tracing::trace!(
                namespace = %self.scope.namespace,
                imports = self.scope.imports.len(),
                "building import table"
            );
            ImportTable::from_imports(&self.scope.imports)
        })
    }

    /// Whether the table has been built yet.
    pub fn is_built(&self) -> bool {
        self.table.get().is_some()
    }
}

/// Resolve one annotation tag.
///
/// The caller has already excluded documentation tags (`@param`, ...).
pub fn resolve_tag(
    tag: &AnnotationTag,
    scope: &NamespaceScope,
    imports: &LazyImportTable<'_>,
    config: &AnnotationConfig,
    index: &dyn SymbolIndex,
) -> ResolutionResult {
    let alias = tag.alias_candidate();
    if !alias.is_empty() && imports.get().contains_alias(alias) {
        return ResolutionResult::AlreadyImported;
    }

    if tag.is_fully_qualified() {
        return ResolutionResult::FullyQualified;
    }

    if let Some(class) =
        resolve_class_reference(index, tag.name(), &scope.namespace, imports.get())
    {
        return ResolutionResult::ResolvedReference(class);
    }

    let candidates = find_candidates(index, tag.terminal_segment(), config);
    if candidates.is_empty() {
        ResolutionResult::NoCandidates
    } else {
        ResolutionResult::Candidates(candidates)
    }
}

/// Resolve a class name the way PHP resolves class references in code.
///
/// Rules:
///   1. Fully qualified (`\Foo\Bar`) → looked up as written
///   2. Qualified (`Foo\Bar`) → first segment expanded through the
///      imports if it is an alias, otherwise prefixed with the namespace
///   3. Unqualified (`Bar`) → the import bound to it, otherwise prefixed
///      with the namespace
///
/// Unqualified class names never fall back to the global namespace from
/// inside a namespace; that fallback only exists for functions and
/// constants.
pub fn resolve_class_reference(
    index: &dyn SymbolIndex,
    name: &str,
    namespace: &NamespacePath,
    imports: &ImportTable,
) -> Option<ClassSymbol> {
    if name.is_empty() {
        return None;
    }

    if name.starts_with(NS_SEPARATOR) {
        return index.find_class(name);
    }

    let (first, rest) = match name.find(NS_SEPARATOR) {
        Some(idx) => (&name[..idx], &name[idx..]),
        None => (name, ""),
    };

    if let Some(target) = imports.resolve_alias(first) {
        return index.find_class(&format!("{}{}", target, rest));
    }

    index.find_class(&namespace.qualify(name))
}

/// Classes named `simple_name` under the allow-listed annotation roots.
///
/// Each root is walked with the configured depth ceiling; the result is
/// deduplicated by FQN and sorted by FQN so fix lists are stable.
pub fn find_candidates(
    index: &dyn SymbolIndex,
    simple_name: &str,
    config: &AnnotationConfig,
) -> Vec<ClassSymbol> {
    if simple_name.is_empty() {
        return Vec::new();
    }

    let mut by_fqn: HashMap<String, ClassSymbol> = HashMap::new();
    for root in config.namespace_roots() {
        for class in classes_under_namespace(index, &root, config.max_namespace_depth) {
            if class.name == simple_name {
                by_fqn.entry(class.fqn_key()).or_insert(class);
            }
        }
    }

    let mut candidates: Vec<ClassSymbol> = by_fqn.into_values().collect();
    candidates.sort_by(|a, b| a.fqn.cmp(&b.fqn));
    candidates
}

// ─── Tests ──────────────────────────────────────────────────────────────────
