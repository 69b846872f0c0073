/// LSP server trait implementation.
///
/// This module contains the `impl LanguageServer for Backend` block,
/// which handles the LSP protocol messages (initialize, didOpen, didChange,
/// didClose, codeAction).
use std::path::Path;
use std::sync::Arc;

use tower_lsp::LanguageServer;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

use crate::Backend;
use crate::config::AnnotationConfig;
use crate::workspace;

impl Backend {
    /// Resolve the configuration layers: defaults, then the workspace TOML
    /// file, then the client's initialization options.  A layer that fails
    /// to load is logged and skipped.
    fn resolve_config(
        workspace_root: Option<&Path>,
        options: Option<&serde_json::Value>,
    ) -> AnnotationConfig {
        let mut config = AnnotationConfig::default();

        if let Some(root) = workspace_root {
            match AnnotationConfig::load_from_workspace(root) {
                Ok(Some(from_file)) => config = from_file,
                Ok(None) => {}
                Err(err) => tracing::warn!("PHPantom: {}", err),
            }
        }

        if let Some(options) = options {
            match AnnotationConfig::from_initialization_options(options) {
                Ok(Some(from_client)) => config = from_client,
                Ok(None) => {}
                Err(err) => tracing::warn!("PHPantom: {}", err),
            }
        }

        config
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // Extract and store the workspace root path
        #[allow(deprecated)]
        let workspace_root = params
            .root_uri
            .as_ref()
            .and_then(|uri| uri.to_file_path().ok());

        let config = Self::resolve_config(
            workspace_root.as_deref(),
            params.initialization_options.as_ref(),
        );
        tracing::info!(
            namespaces = config.namespaces.len(),
            max_depth = config.max_namespace_depth,
            "annotation config loaded"
        );
        self.set_config(config);

        if let Some(root) = workspace_root
            && let Ok(mut wr) = self.workspace_root.lock()
        {
            *wr = Some(root);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                code_action_provider: Some(CodeActionProviderCapability::Options(
                    CodeActionOptions {
                        code_action_kinds: Some(vec![CodeActionKind::QUICKFIX]),
                        work_done_progress_options: WorkDoneProgressOptions {
                            work_done_progress: None,
                        },
                        resolve_provider: Some(false),
                    },
                )),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: self.name.clone(),
                version: Some(self.version.clone()),
            }),
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let Some(root) = self.workspace_root() else {
            self.log(
                MessageType::INFO,
                "PHPantomAnnotations initialized without a workspace".to_string(),
            )
            .await;
            return;
        };

        let index = Arc::clone(&self.index);
        let indexed = tokio::task::spawn_blocking(move || {
            workspace::index_workspace(&root, &index)
        })
        .await;
        // Documents opened during the walk had their entries overwritten by
        // the on-disk copies.
        self.reindex_open_documents();

        match indexed {
            Ok(count) => {
                let (files, classes) = self.index_stats();
                tracing::info!(parsed = count, files, classes, "workspace indexed");
                self.log(
                    MessageType::INFO,
                    format!(
                        "PHPantomAnnotations initialized! Indexed {} file(s), {} class(es)",
                        count, classes
                    ),
                )
                .await;
            }
            Err(err) => {
                tracing::error!("PHPantom: workspace indexing failed: {}", err);
                self.log(
                    MessageType::ERROR,
                    format!("PHPantomAnnotations: workspace indexing failed: {}", err),
                )
                .await;
            }
        }

        self.republish_all().await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        let uri = doc.uri;

        self.update_document(uri.as_str(), &doc.text);
        self.publish_diagnostics(&uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;

        // Full sync: the last change carries the whole document.
        if let Some(change) = params.content_changes.last() {
            self.update_document(uri.as_str(), &change.text);
            self.publish_diagnostics(&uri).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;

        self.close_document(uri.as_str());
        self.clear_diagnostics(&uri).await;
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let actions = self.missing_import_actions(&params);
        if actions.is_empty() {
            Ok(None)
        } else {
            Ok(Some(actions))
        }
    }
}
