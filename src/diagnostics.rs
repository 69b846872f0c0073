/// Missing-import diagnostics.
///
/// Converts inspection [`Problem`]s into LSP diagnostics and publishes
/// them.  The candidate FQNs ride along in `Diagnostic::data` so clients
/// can show them, but code actions always recompute the choices from the
/// current text.
use tower_lsp::lsp_types::*;

use crate::Backend;
use crate::inspection::Problem;

pub const DIAGNOSTIC_SOURCE: &str = "phpantom-annotations";
pub const DIAGNOSTIC_CODE: &str = "missing-import";

pub(crate) fn problem_to_diagnostic(content: &str, problem: &Problem) -> Diagnostic {
    Diagnostic {
        range: Backend::span_to_range(content, problem.tag.span),
        severity: Some(problem.severity),
        code: Some(NumberOrString::String(DIAGNOSTIC_CODE.to_string())),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: problem.message.to_string(),
        data: Some(serde_json::json!(problem.choices)),
        ..Diagnostic::default()
    }
}

/// Whether a diagnostic was produced by this server.
pub(crate) fn is_missing_import(diagnostic: &Diagnostic) -> bool {
    diagnostic.source.as_deref() == Some(DIAGNOSTIC_SOURCE)
        && matches!(&diagnostic.code, Some(NumberOrString::String(code)) if code == DIAGNOSTIC_CODE)
}

impl Backend {
    /// Diagnostics for an open document, empty when it is not open.
    pub fn diagnostics_for(&self, uri: &str) -> Vec<Diagnostic> {
        let Some(content) = self.get_document(uri) else {
            return Vec::new();
        };
        self.inspect_document(uri)
            .iter()
            .map(|problem| problem_to_diagnostic(&content, problem))
            .collect()
    }

    pub(crate) async fn publish_diagnostics(&self, uri: &Url) {
        let diagnostics = self.diagnostics_for(uri.as_str());
        if let Some(client) = &self.client {
            client
                .publish_diagnostics(uri.clone(), diagnostics, None)
                .await;
        }
    }

    pub(crate) async fn clear_diagnostics(&self, uri: &Url) {
        if let Some(client) = &self.client {
            client.publish_diagnostics(uri.clone(), Vec::new(), None).await;
        }
    }

    /// Re-publish diagnostics for every open document, e.g. after the
    /// workspace index changed.
    pub(crate) async fn republish_all(&self) {
        for uri in self.open_uris() {
            if let Ok(url) = Url::parse(&uri) {
                self.publish_diagnostics(&url).await;
            }
        }
    }
}
