//! Engine configuration.
//!
//! Every field has a default, so an empty YAML or JSON document is a valid
//! configuration.
//!
//! ```yaml
//! prefix: recursica
//! themes: [light, dark]
//! default_theme: auto
//! layer_count: 4
//! max_reference_depth: 32
//! batch_debounce_ms: 16
//! ```

use std::ops::Range;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::theme::{select_theme, AUTO_THEME};

/// Settings shared by the export path and the reactive store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Prefix placed before every variable name.
    pub prefix: String,
    /// The closed set of themes, in emission order.
    pub themes: Vec<String>,
    /// Theme for unthemed contexts and the store's starting theme.
    pub default_theme: String,
    /// Number of elevation layers (`layer-0` up to `layer-(n-1)`).
    pub layer_count: u32,
    /// Maximum reference hops before a chain is treated as a cycle.
    pub max_reference_depth: usize,
    /// Coalescing window for batch notifications.
    pub batch_debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: "recursica".to_string(),
            themes: vec!["light".to_string(), "dark".to_string()],
            default_theme: "light".to_string(),
            layer_count: 4,
            max_reference_depth: 32,
            batch_debounce_ms: 16,
        }
    }
}

impl Config {
    pub fn from_yaml_str(source: &str) -> Result<Self, Error> {
        let config: Config = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(source: &str) -> Result<Self, Error> {
        let config: Config =
            serde_json::from_str(source).map_err(|e| Error::json("configuration", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file, choosing the parser by extension.
    ///
    /// `.json` files are parsed as JSON, everything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_yaml_str(&source),
        }
    }

    /// Checks the settings for internal consistency.
    pub fn validate(&self) -> Result<(), Error> {
        if self.prefix.is_empty() || self.prefix.contains(['_', '.', ' ']) {
            return Err(Error::Config(format!(
                "prefix '{}' must be non-empty and contain no '_', '.', or spaces",
                self.prefix
            )));
        }
        if self.themes.is_empty() {
            return Err(Error::Config("at least one theme is required".into()));
        }
        if self.default_theme != AUTO_THEME && !self.themes.contains(&self.default_theme) {
            return Err(Error::Config(format!(
                "default theme '{}' is not one of: {}",
                self.default_theme,
                self.themes.join(", ")
            )));
        }
        if self.layer_count == 0 {
            return Err(Error::Config("layer_count must be at least 1".into()));
        }
        if self.max_reference_depth == 0 {
            return Err(Error::Config("max_reference_depth must be at least 1".into()));
        }
        Ok(())
    }

    /// Resolves `default_theme` to a concrete theme, consulting the OS for `auto`.
    pub fn initial_theme(&self) -> String {
        select_theme(&self.default_theme, &self.themes).unwrap_or_else(|| "light".to_string())
    }

    /// Theme used by the export path where no theme is implied by the path.
    ///
    /// Unlike [`initial_theme`](Self::initial_theme), this never consults
    /// the OS, so exports stay reproducible.
    pub fn export_theme(&self) -> &str {
        if self.default_theme == AUTO_THEME {
            self.themes.first().map(String::as_str).unwrap_or("light")
        } else {
            &self.default_theme
        }
    }

    pub fn layers(&self) -> Range<u32> {
        0..self.layer_count
    }

    pub fn batch_debounce(&self) -> Duration {
        Duration::from_millis(self.batch_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.layers(), 0..4);
        assert_eq!(config.export_theme(), "light");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml_str("prefix: acme\nlayer_count: 2\n").unwrap();
        assert_eq!(config.prefix, "acme");
        assert_eq!(config.layer_count, 2);
        assert_eq!(config.themes, vec!["light", "dark"]);
    }

    #[test]
    fn test_json_config() {
        let config =
            Config::from_json_str(r#"{"themes": ["day", "night"], "default_theme": "night"}"#)
                .unwrap();
        assert_eq!(config.initial_theme(), "night");
        assert_eq!(config.export_theme(), "night");
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Config::from_yaml_str("colour: red\n").is_err());
    }

    #[test]
    fn test_default_theme_must_be_known() {
        let err = Config::from_yaml_str("default_theme: sepia\n").unwrap_err();
        assert!(err.to_string().contains("sepia"));
    }

    #[test]
    fn test_prefix_with_underscore_rejected() {
        assert!(Config::from_yaml_str("prefix: my_brand\n").is_err());
    }

    #[test]
    fn test_auto_export_theme_is_first() {
        let config = Config::from_yaml_str("default_theme: auto\n").unwrap();
        assert_eq!(config.export_theme(), "light");
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("vars.yaml");
        std::fs::write(&yaml, "layer_count: 3\n").unwrap();
        assert_eq!(Config::load(&yaml).unwrap().layer_count, 3);

        let json = dir.path().join("vars.json");
        std::fs::write(&json, r#"{"batch_debounce_ms": 0}"#).unwrap();
        assert_eq!(Config::load(&json).unwrap().batch_debounce_ms, 0);

        assert!(Config::load(dir.path().join("missing.yaml")).is_err());
    }
}
