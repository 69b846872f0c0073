//! The project symbol index.
//!
//! [`SymbolIndex`] is the read-only capability the resolver and the
//! namespace walker are written against.  [`ProjectIndex`] is the
//! in-memory implementation the server keeps up to date as files are
//! opened, changed, and scanned; tests build it directly from PHP source.
//!
//! Namespace names are case-insensitive in PHP, so every lookup goes
//! through [`NamespacePath::key`].  Each file registers one
//! [`NamespaceOccurrence`] per namespace block it declares, plus the
//! parent → child links of the namespace chain (`\A` → `B` → `C` for
//! `namespace A\B\C;`).  Links are reference counted so removing a file
//! drops exactly what it added.

use std::collections::HashMap;

use crate::parser::ParsedFile;
use crate::types::{ClassSymbol, NamespacePath, NS_SEPARATOR, to_fqn};

/// One physical declaration site of a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceOccurrence {
    pub namespace: NamespacePath,
    /// The file the block was declared in.
    pub uri: String,
    /// Class-like symbols declared directly inside the block.
    pub classes: Vec<ClassSymbol>,
}

/// Read-only queries over the project's declared symbols.
pub trait SymbolIndex {
    /// Every declaration site of `namespace` (case-insensitive).
    fn namespace_declarations(&self, namespace: &NamespacePath) -> Vec<&NamespaceOccurrence>;

    /// Names of the immediate child namespaces of `parent`.
    fn child_namespaces(&self, parent: &NamespacePath) -> Vec<String>;

    /// Look up a class by fully-qualified name (case-insensitive, leading
    /// `\` optional).
    fn find_class(&self, fqn: &str) -> Option<ClassSymbol>;
}

#[derive(Debug, Clone)]
struct ChildEntry {
    /// Child name as first registered.
    name: String,
    refs: usize,
}

/// In-memory [`SymbolIndex`] built from parsed files.
#[derive(Debug, Default)]
pub struct ProjectIndex {
    /// Namespace key → declaration sites.
    occurrences: HashMap<String, Vec<NamespaceOccurrence>>,
    /// Parent namespace key → child key → entry.
    children: HashMap<String, HashMap<String, ChildEntry>>,
    /// URI → namespaces the file registered (one entry per block).
    files: HashMap<String, Vec<NamespacePath>>,
}

impl ProjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything `uri` contributed with the symbols of `parsed`.
    pub fn update_file(&mut self, uri: &str, parsed: &ParsedFile) {
        self.remove_file(uri);

        let mut registered = Vec::new();
        for scope in &parsed.scopes {
            // Files without global declarations don't need a global entry.
            if scope.namespace.is_global() && scope.classes.is_empty() {
                continue;
            }

            self.occurrences
                .entry(scope.namespace.key())
                .or_default()
                .push(NamespaceOccurrence {
                    namespace: scope.namespace.clone(),
                    uri: uri.to_string(),
                    classes: scope.classes.clone(),
                });
            self.link_chain(&scope.namespace);
            registered.push(scope.namespace.clone());
        }

        if !registered.is_empty() {
            self.files.insert(uri.to_string(), registered);
        }
    }

    /// Forget every symbol `uri` contributed.
    pub fn remove_file(&mut self, uri: &str) {
        let Some(namespaces) = self.files.remove(uri) else {
            return;
        };

        for namespace in &namespaces {
            let key = namespace.key();
            if let Some(list) = self.occurrences.get_mut(&key) {
                list.retain(|occ| occ.uri != uri);
                if list.is_empty() {
                    self.occurrences.remove(&key);
                }
            }
            self.unlink_chain(namespace);
        }
    }

    /// Number of files that contributed symbols.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of class-like declarations across all files.
    pub fn class_count(&self) -> usize {
        self.occurrences
            .values()
            .flat_map(|list| list.iter())
            .map(|occ| occ.classes.len())
            .sum()
    }

    fn link_chain(&mut self, namespace: &NamespacePath) {
        let mut current = namespace.clone();
        while let Some(parent) = current.parent() {
            let child = current.last_segment().to_string();
            let entry = self
                .children
                .entry(parent.key())
                .or_default()
                .entry(child.to_lowercase())
                .or_insert_with(|| ChildEntry {
                    name: child,
                    refs: 0,
                });
            entry.refs += 1;
            current = parent;
        }
    }

    fn unlink_chain(&mut self, namespace: &NamespacePath) {
        let mut current = namespace.clone();
        while let Some(parent) = current.parent() {
            let parent_key = parent.key();
            let child_key = current.last_segment().to_lowercase();
            if let Some(kids) = self.children.get_mut(&parent_key) {
                if let Some(entry) = kids.get_mut(&child_key) {
                    entry.refs = entry.refs.saturating_sub(1);
                    if entry.refs == 0 {
                        kids.remove(&child_key);
                    }
                }
                if kids.is_empty() {
                    self.children.remove(&parent_key);
                }
            }
            current = parent;
        }
    }
}

impl SymbolIndex for ProjectIndex {
    fn namespace_declarations(&self, namespace: &NamespacePath) -> Vec<&NamespaceOccurrence> {
        self.occurrences
            .get(&namespace.key())
            .map(|list| list.iter().collect())
            .unwrap_or_default()
    }

    fn child_namespaces(&self, parent: &NamespacePath) -> Vec<String> {
        self.children
            .get(&parent.key())
            .map(|kids| kids.values().map(|e| e.name.clone()).collect())
            .unwrap_or_default()
    }

    fn find_class(&self, fqn: &str) -> Option<ClassSymbol> {
        let fqn = to_fqn(fqn);
        let (namespace, name) = match fqn.rfind(NS_SEPARATOR) {
            Some(idx) => (NamespacePath::parse(&fqn[..idx]), &fqn[idx + 1..]),
            None => (NamespacePath::global(), fqn.as_str()),
        };
        if name.is_empty() {
            return None;
        }

        self.namespace_declarations(&namespace)
            .into_iter()
            .flat_map(|occ| occ.classes.iter())
            .find(|class| class.name.eq_ignore_ascii_case(name))
            .cloned()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
