//! Namespace index walker.
//!
//! Enumerates the class-like symbols declared in a namespace and,
//! recursively, in all of its sub-namespaces.  The recursion is bounded by
//! a depth counter: a namespace hierarchy deeper than the ceiling is
//! truncated, never an error.

use std::collections::HashSet;

use crate::index::SymbolIndex;
use crate::types::{ClassSymbol, NamespacePath};

/// Collect every class declared in `root` and its sub-namespaces.
///
/// `max_depth` counts namespace levels, the root included: with a depth of
/// 10 the root and nine levels of descendants are visited.  A depth of 0
/// returns nothing without touching the index.  Classes are deduplicated
/// by case-insensitive FQN (first declaration wins); the order of the
/// result is unspecified.
pub fn classes_under_namespace(
    index: &dyn SymbolIndex,
    root: &NamespacePath,
    max_depth: usize,
) -> Vec<ClassSymbol> {
    let mut seen = HashSet::new();
    let mut classes = Vec::new();
    collect(index, root, max_depth, &mut seen, &mut classes);
    classes
}

fn collect(
    index: &dyn SymbolIndex,
    namespace: &NamespacePath,
    depth_left: usize,
    seen: &mut HashSet<String>,
    classes: &mut Vec<ClassSymbol>,
) {
    if depth_left == 0 {
        return;
    }

    for occurrence in index.namespace_declarations(namespace) {
        for class in &occurrence.classes {
            if seen.insert(class.fqn_key()) {
                classes.push(class.clone());
            }
        }
    }

    for child in index.child_namespaces(namespace) {
        collect(index, &namespace.child(&child), depth_left - 1, seen, classes);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
