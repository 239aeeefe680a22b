use paren_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "paren.config.json";

/// Paren configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Session and transform settings
    #[serde(default)]
    pub editor: EditorConfig,

    /// File extensions picked up when a directory is given
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    ["clj", "cljs", "cljc", "edn"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

impl Config {
    /// Load `explicit` if given, else the config in `cwd` if one exists
    pub fn load(cwd: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => cwd.join(DEFAULT_CONFIG_NAME),
        };

        if explicit.is_some() || config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", config_path.display(), e))?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Whether `path` has one of the configured source extensions
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            extensions: default_extensions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "editor": { "bindingForms": ["let", "binding"], "summaryWidth": 40 },
            "extensions": ["clj"]
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.editor.binding_forms, vec!["let", "binding"]);
        assert_eq!(config.editor.summary_width, 40);
        assert_eq!(config.editor.history_limit, 100);
        assert_eq!(config.extensions, vec!["clj"]);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.is_source_file(Path::new("src/app/core.cljc")));
        assert!(!config.is_source_file(Path::new("README.md")));
        assert!(config.editor.is_binding_form("let"));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path(), None).unwrap().extensions.len(), 4);

        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{"extensions": ["edn"]}"#).unwrap();
        assert_eq!(Config::load(dir.path(), None).unwrap().extensions, vec!["edn"]);

        let missing = dir.path().join("other.json");
        assert!(Config::load(dir.path(), Some(&missing)).is_err());
    }
}
