//! Missing-import inspection.
//!
//! Runs the resolver over every annotation tag of every docblock in a file
//! and reports the tags that need an import.  The whole file is inspected
//! in one pass, after parsing has seen all of its `use` statements.
//!
//! Reporting policy per [`ResolutionResult`]:
//!
//! | outcome                                   | report                      |
//! |-------------------------------------------|-----------------------------|
//! | `AlreadyImported`, `FullyQualified`       | nothing                     |
//! | `ResolvedReference`                       | nothing                     |
//! | `Candidates`                              | problem + one fix per FQN   |
//! | `NoCandidates`                            | problem, no fix             |

use std::collections::HashMap;

use tower_lsp::lsp_types::DiagnosticSeverity;

use crate::config::AnnotationConfig;
use crate::docblock::{DocNode, is_documentation_tag};
use crate::index::SymbolIndex;
use crate::parser::{NamespaceScope, ParsedFile};
use crate::resolver::{LazyImportTable, resolve_tag};
use crate::types::{AnnotationTag, ResolutionResult};

/// Message attached to every missing-import problem.
pub const MISSING_IMPORT_MESSAGE: &str = "Missing import";

/// A tag that needs an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    /// The offending tag; its span covers only the name token so the
    /// highlight stays small.
    pub tag: AnnotationTag,
    pub message: &'static str,
    pub severity: DiagnosticSeverity,
    /// Fully-qualified names (no leading `\`) that could be imported,
    /// one fix per entry.  Empty when nothing plausible was found.
    pub choices: Vec<String>,
}

impl Problem {
    fn missing_import(tag: AnnotationTag, choices: Vec<String>) -> Self {
        Problem {
            tag,
            message: MISSING_IMPORT_MESSAGE,
            severity: DiagnosticSeverity::WARNING,
            choices,
        }
    }
}

/// Inspect every docblock of a parsed file.
pub fn inspect_file(
    parsed: &ParsedFile,
    index: &dyn SymbolIndex,
    config: &AnnotationConfig,
) -> Vec<Problem> {
    let mut problems = Vec::new();
    for docblock in &parsed.docblocks {
        let scope = &parsed.scopes[docblock.scope];
        inspect_docblock(&docblock.node, scope, index, config, &mut problems);
    }
    problems
}

/// Inspect the tags of one docblock.
///
/// The import table and the per-name results live only for this call.
fn inspect_docblock(
    comment: &DocNode,
    scope: &NamespaceScope,
    index: &dyn SymbolIndex,
    config: &AnnotationConfig,
    problems: &mut Vec<Problem>,
) {
    let tags = annotation_tags(comment, config);
    if tags.is_empty() {
        return;
    }

    let imports = LazyImportTable::new(scope);
    let mut resolved: HashMap<String, ResolutionResult> = HashMap::new();

    for tag in tags {
        let result = resolved
            .entry(tag.raw_name.clone())
            .or_insert_with(|| resolve_tag(&tag, scope, &imports, config, index));

        match result {
            ResolutionResult::Candidates(classes) => {
                let choices = classes
                    .iter()
                    .map(|c| c.fqn.trim_start_matches('\\').to_string())
                    .collect();
                problems.push(Problem::missing_import(tag, choices));
            }
            ResolutionResult::NoCandidates => {
                problems.push(Problem::missing_import(tag, Vec::new()));
            }
            ResolutionResult::AlreadyImported
            | ResolutionResult::FullyQualified
            | ResolutionResult::ResolvedReference(_) => {}
        }
    }
}

/// All tags of a docblock that could be annotations, nested ones included.
///
/// A tag qualifies when its first child is a name token and the name is
/// not a documentation tag.
pub fn annotation_tags(comment: &DocNode, config: &AnnotationConfig) -> Vec<AnnotationTag> {
    comment
        .tags()
        .into_iter()
        .filter_map(|tag| {
            let token = tag.name_token()?;
            if is_documentation_tag(&token.text, config) {
                return None;
            }
            Some(AnnotationTag::new(&token.text, token.span))
        })
        .collect()
}

// ─── Tests ──────────────────────────────────────────────────────────────────
