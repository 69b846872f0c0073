/// Composer project layout.
///
/// This module reads `composer.json` to decide which directories of a
/// workspace hold PHP code worth indexing: the PSR-4 source roots of the
/// project itself and the vendor directory, where annotation libraries
/// (Doctrine, Symfony, JMS, ...) live.
///
/// A mapping like `"App\\" => "src/"` contributes `<workspace>/src/`;
/// `config.vendor-dir` (default `vendor`) contributes the vendor tree.
/// Without a `composer.json` the whole workspace is indexed.
use std::path::{Path, PathBuf};

/// A single PSR-4 namespace-to-directory mapping.
#[derive(Debug, Clone)]
pub struct Psr4Mapping {
    /// The namespace prefix, always ending with `\` (e.g. `"App\"`).
    pub prefix: String,
    /// The base directory path relative to the workspace root (e.g. `"src/"`).
    pub base_path: String,
}

fn read_composer_json(workspace_root: &Path) -> Option<serde_json::Value> {
    let content = std::fs::read_to_string(workspace_root.join("composer.json")).ok()?;
    match serde_json::from_str(&content) {
        Ok(json) => Some(json),
        Err(err) => {
            tracing::warn!("PHPantom: ignoring invalid composer.json: {}", err);
            None
        }
    }
}

/// Parse a `composer.json` file at the given workspace root and extract all
/// PSR-4 autoload mappings from both `autoload` and `autoload-dev` sections.
///
/// Returns an empty `Vec` if the file doesn't exist, can't be read, or
/// contains no PSR-4 mappings.
pub fn parse_composer_json(workspace_root: &Path) -> Vec<Psr4Mapping> {
    let Some(json) = read_composer_json(workspace_root) else {
        return Vec::new();
    };

    let mut mappings = Vec::new();

    for section_key in &["autoload", "autoload-dev"] {
        if let Some(section) = json.get(section_key)
            && let Some(psr4) = section.get("psr-4")
            && let Some(psr4_obj) = psr4.as_object()
        {
            for (prefix, paths) in psr4_obj {
                extract_psr4_entries(prefix, paths, &mut mappings);
            }
        }
    }

    // Longest prefix first
    mappings.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

    mappings
}

/// Extract PSR-4 entries from a single prefix → path(s) pair.
///
/// The value can be either a string (`"src/"`) or an array of strings
/// (`["src/", "lib/"]`).
fn extract_psr4_entries(prefix: &str, paths: &serde_json::Value, mappings: &mut Vec<Psr4Mapping>) {
    let normalised_prefix = if prefix.ends_with('\\') || prefix.is_empty() {
        prefix.to_string()
    } else {
        format!("{}\\", prefix)
    };

    let mut push = |path: &str| {
        mappings.push(Psr4Mapping {
            prefix: normalised_prefix.clone(),
            base_path: normalise_path(path),
        });
    };

    match paths {
        serde_json::Value::String(path) => push(path.as_str()),
        serde_json::Value::Array(arr) => {
            for entry in arr {
                if let Some(path) = entry.as_str() {
                    push(path);
                }
            }
        }
        _ => {}
    }
}

/// Normalise a directory path: ensure it uses forward slashes and ends with `/`.
fn normalise_path(path: &str) -> String {
    let p = path.replace('\\', "/");
    if p.ends_with('/') || p.is_empty() {
        p
    } else {
        format!("{}/", p)
    }
}

/// The vendor directory name from `config.vendor-dir`, default `vendor`.
pub fn vendor_dir(workspace_root: &Path) -> String {
    read_composer_json(workspace_root)
        .and_then(|json| {
            json.get("config")
                .and_then(|c| c.get("vendor-dir"))
                .and_then(|v| v.as_str())
                .map(|s| s.trim_end_matches('/').to_string())
        })
        .unwrap_or_else(|| "vendor".to_string())
}

/// Directories to scan when indexing the workspace.
///
/// Only directories that exist are returned, without duplicates.  Nested
/// roots (`src/` and `src/Legacy/`) are collapsed into the outer one.
pub fn index_roots(workspace_root: &Path) -> Vec<PathBuf> {
    if !workspace_root.join("composer.json").is_file() {
        return vec![workspace_root.to_path_buf()];
    }

    let mut candidates: Vec<PathBuf> = parse_composer_json(workspace_root)
        .iter()
        .map(|m| {
            if m.base_path.is_empty() {
                workspace_root.to_path_buf()
            } else {
                workspace_root.join(&m.base_path)
            }
        })
        .collect();
    candidates.push(workspace_root.join(vendor_dir(workspace_root)));

    let mut existing: Vec<PathBuf> = candidates.into_iter().filter(|p| p.is_dir()).collect();
    existing.sort();
    existing.dedup();

    let mut roots: Vec<PathBuf> = Vec::new();
    for path in existing {
        if !roots.iter().any(|r| path.starts_with(r)) {
            roots.push(path);
        }
    }
    roots
}

// ─── Tests ──────────────────────────────────────────────────────────────────
