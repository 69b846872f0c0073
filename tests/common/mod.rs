#![allow(dead_code)]

use phpantom_annotations::{AnnotationConfig, Backend};
use std::fs;
use std::path::Path;
use tower_lsp::LanguageServer;
use tower_lsp::lsp_types::*;

/// Doctrine-style annotation classes used by most tests.
pub const DOCTRINE_MAPPING: &str = concat!(
    "<?php\n",
    "namespace Doctrine\\ORM\\Mapping;\n",
    "\n",
    "/** @Annotation */\n",
    "final class Entity {}\n",
    "/** @Annotation */\n",
    "final class Column {}\n",
    "/** @Annotation */\n",
    "final class JoinTable {}\n",
    "/** @Annotation */\n",
    "final class JoinColumn {}\n",
);

pub fn create_test_backend() -> Backend {
    Backend::new_test()
}

/// A backend whose allow-list is exactly `namespaces`.
pub fn create_test_backend_with_namespaces(namespaces: &[&str]) -> Backend {
    Backend::new_test_with_config(AnnotationConfig {
        namespaces: namespaces.iter().map(|s| s.to_string()).collect(),
        ..AnnotationConfig::default()
    })
}

/// Write `files` (relative path, content) below `root`.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (rel_path, content) in files {
        let full = root.join(rel_path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("failed to create dirs");
        }
        fs::write(&full, content).expect("failed to write PHP file");
    }
}

/// Helper: create a temp workspace with the given files, then return an
/// indexed Backend rooted there.
pub fn create_indexed_workspace(files: &[(&str, &str)]) -> (Backend, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    write_files(dir.path(), files);

    let backend = Backend::new_test_with_workspace(dir.path().to_path_buf());
    backend.index_workspace();
    (backend, dir)
}

pub async fn open(backend: &Backend, uri: &Url, text: &str) {
    backend
        .did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri: uri.clone(),
                language_id: "php".to_string(),
                version: 1,
                text: text.to_string(),
            },
        })
        .await;
}

pub async fn change(backend: &Backend, uri: &Url, text: &str) {
    backend
        .did_change(DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier {
                uri: uri.clone(),
                version: 2,
            },
            content_changes: vec![TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: text.to_string(),
            }],
        })
        .await;
}

/// Request code actions for the whole document.
pub async fn code_actions(backend: &Backend, uri: &Url) -> Vec<CodeAction> {
    let params = CodeActionParams {
        text_document: TextDocumentIdentifier { uri: uri.clone() },
        range: Range::new(Position::new(0, 0), Position::new(u32::MAX, 0)),
        context: CodeActionContext {
            diagnostics: backend.diagnostics_for(uri.as_str()),
            only: None,
            trigger_kind: None,
        },
        work_done_progress_params: WorkDoneProgressParams::default(),
        partial_result_params: PartialResultParams::default(),
    };

    match backend.code_action(params).await.unwrap() {
        Some(actions) => actions
            .into_iter()
            .filter_map(|a| match a {
                CodeActionOrCommand::CodeAction(action) => Some(action),
                CodeActionOrCommand::Command(_) => None,
            })
            .collect(),
        None => Vec::new(),
    }
}

/// Apply the text edits of a code action to `text`.
pub fn apply_action(text: &str, uri: &Url, action: &CodeAction) -> String {
    let edits = action
        .edit
        .as_ref()
        .and_then(|e| e.changes.as_ref())
        .and_then(|c| c.get(uri))
        .cloned()
        .unwrap_or_default();
    apply_text_edits(text, &edits)
}

pub fn apply_text_edits(text: &str, edits: &[TextEdit]) -> String {
    let mut ordered: Vec<(usize, usize, &str)> = edits
        .iter()
        .map(|e| {
            (
                offset_of(text, e.range.start),
                offset_of(text, e.range.end),
                e.new_text.as_str(),
            )
        })
        .collect();
    // Apply back to front so earlier offsets stay valid.
    ordered.sort_by(|a, b| b.0.cmp(&a.0));

    let mut out = text.to_string();
    for (start, end, new_text) in ordered {
        out.replace_range(start..end, new_text);
    }
    out
}

fn offset_of(text: &str, position: Position) -> usize {
    let mut offset = 0;
    for (i, line) in text.split('\n').enumerate() {
        if i == position.line as usize {
            return offset
                + line
                    .char_indices()
                    .nth(position.character as usize)
                    .map(|(idx, _)| idx)
                    .unwrap_or(line.len());
        }
        offset += line.len() + 1;
    }
    text.len()
}
