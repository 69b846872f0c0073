/// Workspace indexing.
///
/// Walks the directories chosen by [`composer::index_roots`], parses every
/// `.php` file and feeds its namespace declarations into the project
/// index.  Unreadable files are logged and skipped.
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use parking_lot::RwLock;
use tower_lsp::lsp_types::Url;

use crate::composer;
use crate::error::IndexError;
use crate::index::ProjectIndex;
use crate::parser::parse_php_file;

/// All `.php` files below `root`.
///
/// `.gitignore` rules are not honoured because the vendor directory, where
/// most annotation classes live, is normally ignored.  Hidden directories
/// are still skipped.
pub fn collect_php_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkBuilder::new(root)
        .git_ignore(false)
        .git_exclude(false)
        .parents(false)
        .build()
    {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() && path.extension().is_some_and(|ext| ext == "php") {
                    files.push(path.to_path_buf());
                }
            }
            Err(source) => {
                let err = IndexError::Walk {
                    path: root.to_path_buf(),
                    source,
                };
                tracing::warn!("{}", err);
            }
        }
    }
    files.sort();
    files
}

pub fn read_php_file(path: &Path) -> Result<String, IndexError> {
    std::fs::read_to_string(path).map_err(|source| IndexError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// The `file://` URI used as the index key for `path`.
pub fn file_uri(path: &Path) -> String {
    Url::from_file_path(path)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| format!("file://{}", path.display()))
}

/// Index every PHP file of the workspace.  Returns the number of files
/// that were parsed.
pub fn index_workspace(root: &Path, index: &RwLock<ProjectIndex>) -> usize {
    let mut indexed = 0;
    for dir in composer::index_roots(root) {
        tracing::debug!(dir = %dir.display(), "indexing directory");
        for path in collect_php_files(&dir) {
            match read_php_file(&path) {
                Ok(content) => {
                    let parsed = parse_php_file(&content);
                    index.write().update_file(&file_uri(&path), &parsed);
                    indexed += 1;
                }
                Err(err) => tracing::warn!("{}", err),
            }
        }
    }
    indexed
}
