//! Inspector configuration.
//!
//! The set of "annotation-bearing" namespaces bounds the heuristic
//! candidate search: only classes declared in (or below) one of these
//! roots are ever offered as imports.  Settings come from three layers,
//! each overriding the previous one:
//!
//!   1. Built-in defaults covering the common annotation libraries.
//!   2. An `[annotations]` table in `.phpantom-annotations.toml` at the
//!      workspace root.
//!   3. The `annotations` key of the LSP `initializationOptions`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::NamespacePath;

/// File name of the per-workspace configuration file.
pub const CONFIG_FILE_NAME: &str = ".phpantom-annotations.toml";

/// Default recursion ceiling for the namespace walker.
pub const DEFAULT_MAX_NAMESPACE_DEPTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnnotationConfig {
    /// Ordered allow-list of namespace roots searched for import candidates.
    #[serde(default = "default_namespaces")]
    pub namespaces: Vec<String>,

    /// How many namespace levels (root included) the walker descends.
    #[serde(default = "default_max_namespace_depth")]
    pub max_namespace_depth: usize,

    /// Extra tag names never treated as annotations (with or without `@`).
    #[serde(default)]
    pub ignored_tags: Vec<String>,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        AnnotationConfig {
            namespaces: default_namespaces(),
            max_namespace_depth: DEFAULT_MAX_NAMESPACE_DEPTH,
            ignored_tags: Vec::new(),
        }
    }
}

fn default_namespaces() -> Vec<String> {
    [
        "\\Doctrine\\ORM\\Mapping",
        "\\Doctrine\\ODM\\MongoDB\\Mapping\\Annotations",
        "\\Symfony\\Component\\Validator\\Constraints",
        "\\Symfony\\Component\\Routing\\Annotation",
        "\\Symfony\\Component\\Serializer\\Annotation",
        "\\Sensio\\Bundle\\FrameworkExtraBundle\\Configuration",
        "\\JMS\\Serializer\\Annotation",
        "\\OpenApi\\Annotations",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_namespace_depth() -> usize {
    DEFAULT_MAX_NAMESPACE_DEPTH
}

/// The on-disk file layout: settings live under `[annotations]`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    annotations: Option<AnnotationConfig>,
}

impl AnnotationConfig {
    /// The allow-listed roots, normalized and deduplicated (first wins).
    pub fn namespace_roots(&self) -> Vec<NamespacePath> {
        let mut roots: Vec<NamespacePath> = Vec::new();
        for raw in &self.namespaces {
            let path = NamespacePath::parse(raw);
            if !roots.iter().any(|r| r.key() == path.key()) {
                roots.push(path);
            }
        }
        roots
    }

    /// Parse the `[annotations]` table of a TOML document.
    ///
    /// A document without the table yields the defaults.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(file.annotations.unwrap_or_default())
    }

    /// Load `.phpantom-annotations.toml` from the workspace root.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn load_from_workspace(root: &Path) -> Result<Option<Self>, ConfigError> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&content, &path).map(Some)
    }

    /// Read the `annotations` key of the LSP initialization options.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn from_initialization_options(
        options: &serde_json::Value,
    ) -> Result<Option<Self>, ConfigError> {
        match options.get("annotations") {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_include_doctrine_mapping() {
        let config = AnnotationConfig::default();
        assert_eq!(config.max_namespace_depth, 10);
        assert!(
            config
                .namespace_roots()
                .iter()
                .any(|r| r.as_str() == "\\Doctrine\\ORM\\Mapping")
        );
    }

    #[test]
    fn namespace_roots_are_normalized_and_deduplicated() {
        let config = AnnotationConfig {
            namespaces: vec![
                "App\\Annotation\\".to_string(),
                "\\app\\annotation".to_string(),
                "Lib".to_string(),
            ],
            ..AnnotationConfig::default()
        };
        let roots: Vec<String> = config
            .namespace_roots()
            .iter()
            .map(|r| r.to_string())
            .collect();
        assert_eq!(roots, vec!["\\App\\Annotation", "\\Lib"]);
    }

    #[test]
    fn toml_table_overrides_defaults() {
        let content = r#"
[annotations]
namespaces = ["App\\Annotation"]
max-namespace-depth = 3
ignored-tags = ["@Internal"]
"#;
        let config = AnnotationConfig::from_toml_str(content, Path::new("x.toml")).unwrap();
        assert_eq!(config.namespaces, vec!["App\\Annotation".to_string()]);
        assert_eq!(config.max_namespace_depth, 3);
        assert_eq!(config.ignored_tags, vec!["@Internal".to_string()]);
    }

    #[test]
    fn toml_without_table_gives_defaults() {
        let config = AnnotationConfig::from_toml_str("", Path::new("x.toml")).unwrap();
        assert_eq!(config, AnnotationConfig::default());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let result = AnnotationConfig::from_toml_str("[annotations\n", Path::new("x.toml"));
        assert!(matches!(result, Err(ConfigError::Toml { .. })));
    }

    #[test]
    fn load_from_workspace_reads_the_file() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        assert!(
            AnnotationConfig::load_from_workspace(dir.path())
                .unwrap()
                .is_none()
        );

        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[annotations]\nnamespaces = [\"Lib\"]\n",
        )
        .expect("failed to write config");
        let config = AnnotationConfig::load_from_workspace(dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(config.namespaces, vec!["Lib".to_string()]);
    }

    #[test]
    fn initialization_options_are_parsed() {
        let options = serde_json::json!({
            "annotations": { "namespaces": ["\\Lib\\Annotations"], "max-namespace-depth": 2 }
        });
        let config = AnnotationConfig::from_initialization_options(&options)
            .unwrap()
            .unwrap();
        assert_eq!(config.namespaces, vec!["\\Lib\\Annotations".to_string()]);
        assert_eq!(config.max_namespace_depth, 2);
        assert!(config.ignored_tags.is_empty());

        let empty = serde_json::json!({});
        assert!(
            AnnotationConfig::from_initialization_options(&empty)
                .unwrap()
                .is_none()
        );
    }
}
