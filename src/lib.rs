use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use parking_lot::RwLock;
use tower_lsp::Client;

// ─── Module declarations ────────────────────────────────────────────────────
pub mod check;
mod code_action;
pub mod composer;
pub mod config;
mod diagnostics;
pub mod docblock;
pub mod error;
pub mod fix;
pub mod index;
pub mod inspection;
pub mod logging;
pub mod parser;
pub mod resolver;
mod server;
pub mod types;
mod util;
pub mod walker;
pub mod workspace;

// ─── Re-exports ─────────────────────────────────────────────────────────────

pub use config::AnnotationConfig;
pub use diagnostics::{DIAGNOSTIC_CODE, DIAGNOSTIC_SOURCE};
pub use index::{ProjectIndex, SymbolIndex};
pub use inspection::{MISSING_IMPORT_MESSAGE, Problem};
pub use parser::ParsedFile;
pub use types::ResolutionResult;

pub struct Backend {
    name: String,
    version: String,
    open_files: Arc<Mutex<HashMap<String, String>>>,
    /// Parse results of the open files, keyed by URI.
    parsed_files: Arc<Mutex<HashMap<String, Arc<ParsedFile>>>>,
    /// Namespace declarations of the whole workspace plus open buffers.
    index: Arc<RwLock<ProjectIndex>>,
    config: Arc<Mutex<AnnotationConfig>>,
    workspace_root: Arc<Mutex<Option<PathBuf>>>,
    client: Option<Client>,
}

impl Backend {
    fn with_client(client: Option<Client>) -> Self {
        Self {
            name: "PHPantomAnnotations".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            open_files: Arc::new(Mutex::new(HashMap::new())),
            parsed_files: Arc::new(Mutex::new(HashMap::new())),
            index: Arc::new(RwLock::new(ProjectIndex::new())),
            config: Arc::new(Mutex::new(AnnotationConfig::default())),
            workspace_root: Arc::new(Mutex::new(None)),
            client,
        }
    }

    pub fn new(client: Client) -> Self {
        Self::with_client(Some(client))
    }

    pub fn new_test() -> Self {
        Self::with_client(None)
    }

    pub fn new_test_with_config(config: AnnotationConfig) -> Self {
        let backend = Self::with_client(None);
        backend.set_config(config);
        backend
    }

    /// Create a backend rooted at `root` without indexing it yet.
    pub fn new_test_with_workspace(root: PathBuf) -> Self {
        let backend = Self::with_client(None);
        if let Ok(mut wr) = backend.workspace_root.lock() {
            *wr = Some(root);
        }
        backend
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_version(&self) -> &str {
        &self.version
    }

    pub fn get_config(&self) -> AnnotationConfig {
        self.config
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    pub fn set_config(&self, config: AnnotationConfig) {
        if let Ok(mut c) = self.config.lock() {
            *c = config;
        }
    }

    pub fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace_root
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }

    /// Index every PHP file under the workspace root.  Returns the number
    /// of files parsed, 0 without a root.
    pub fn index_workspace(&self) -> usize {
        let count = match self.workspace_root() {
            Some(root) => workspace::index_workspace(&root, &self.index),
            None => 0,
        };
        self.reindex_open_documents();
        count
    }

    /// Put the open buffers back into the index.
    ///
    /// A workspace walk indexes the on-disk copy of every file, including
    /// files that are open with unsaved edits; the buffer must win.
    pub fn reindex_open_documents(&self) {
        let open: Vec<(String, Arc<ParsedFile>)> = match self.parsed_files.lock() {
            Ok(map) => map
                .iter()
                .map(|(uri, parsed)| (uri.clone(), Arc::clone(parsed)))
                .collect(),
            Err(_) => return,
        };
        if open.is_empty() {
            return;
        }

        let mut index = self.index.write();
        for (uri, parsed) in &open {
            index.update_file(uri, parsed);
        }
        tracing::debug!(count = open.len(), "open documents re-indexed");
    }

    /// Store the text of an open document, re-parse it and refresh its
    /// index entry.
    pub fn update_document(&self, uri: &str, text: &str) {
        let parsed = Arc::new(parser::parse_php_file(text));

        // Recorded before the index write; `reindex_open_documents` reads it.
        if let Ok(mut files) = self.open_files.lock() {
            files.insert(uri.to_string(), text.to_string());
        }
        if let Ok(mut map) = self.parsed_files.lock() {
            map.insert(uri.to_string(), Arc::clone(&parsed));
        }
        self.index.write().update_file(uri, &parsed);
    }

    /// Forget an open document.  Its declarations stay in the index.
    pub fn close_document(&self, uri: &str) {
        if let Ok(mut files) = self.open_files.lock() {
            files.remove(uri);
        }
        if let Ok(mut map) = self.parsed_files.lock() {
            map.remove(uri);
        }
    }

    pub fn get_document(&self, uri: &str) -> Option<String> {
        self.open_files
            .lock()
            .ok()
            .and_then(|files| files.get(uri).cloned())
    }

    fn get_parsed(&self, uri: &str) -> Option<Arc<ParsedFile>> {
        self.parsed_files
            .lock()
            .ok()
            .and_then(|map| map.get(uri).cloned())
    }

    fn open_uris(&self) -> Vec<String> {
        self.open_files
            .lock()
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Run the missing-import inspection over an open document.
    pub fn inspect_document(&self, uri: &str) -> Vec<Problem> {
        let Some(parsed) = self.get_parsed(uri) else {
            return Vec::new();
        };
        let config = self.get_config();
        let index = self.index.read();
        let problems = inspection::inspect_file(&parsed, &*index, &config);
        tracing::debug!(uri, problems = problems.len(), "inspected document");
        problems
    }

    /// Number of files and classes currently indexed.
    pub fn index_stats(&self) -> (usize, usize) {
        let index = self.index.read();
        (index.file_count(), index.class_count())
    }
}
