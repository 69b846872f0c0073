/// Quick fixes for missing annotation imports.
///
/// Every missing-import problem whose tag overlaps the requested range
/// yields one `quickfix` action per candidate class.  Problems are
/// recomputed from the current buffer rather than read from the client's
/// diagnostics, so an outdated diagnostic can never produce an edit
/// against text that has moved.
use std::collections::HashMap;

use tower_lsp::lsp_types::*;

use crate::Backend;
use crate::diagnostics::is_missing_import;
use crate::fix::build_import_edits;

impl Backend {
    pub(crate) fn missing_import_actions(&self, params: &CodeActionParams) -> Vec<CodeActionOrCommand> {
        let uri = &params.text_document.uri;
        let Some(content) = self.get_document(uri.as_str()) else {
            return Vec::new();
        };
        let Some(parsed) = self.get_parsed(uri.as_str()) else {
            return Vec::new();
        };

        let start = Self::position_to_offset(&content, params.range.start);
        let end = Self::position_to_offset(&content, params.range.end);

        let mut actions = Vec::new();
        for problem in self.inspect_document(uri.as_str()) {
            let span = problem.tag.span;
            if span.start > end || start > span.end {
                continue;
            }

            let range = Self::span_to_range(&content, span);
            let diagnostics: Vec<Diagnostic> = params
                .context
                .diagnostics
                .iter()
                .filter(|d| is_missing_import(d) && d.range == range)
                .cloned()
                .collect();
            let is_preferred = problem.choices.len() == 1;

            for fqn in &problem.choices {
                let edits: Vec<TextEdit> = build_import_edits(&content, &parsed, &problem.tag, fqn)
                    .into_iter()
                    .map(|edit| TextEdit {
                        range: Self::span_to_range(&content, edit.span),
                        new_text: edit.new_text,
                    })
                    .collect();
                if edits.is_empty() {
                    continue;
                }

                let mut changes = HashMap::new();
                changes.insert(uri.clone(), edits);

                actions.push(CodeActionOrCommand::CodeAction(CodeAction {
                    title: format!("Import `{}`", fqn),
                    kind: Some(CodeActionKind::QUICKFIX),
                    diagnostics: if diagnostics.is_empty() {
                        None
                    } else {
                        Some(diagnostics.clone())
                    },
                    edit: Some(WorkspaceEdit {
                        changes: Some(changes),
                        ..WorkspaceEdit::default()
                    }),
                    is_preferred: Some(is_preferred),
                    ..CodeAction::default()
                }));
            }
        }
        actions
    }
}
