//! Configuration for a framework instance.
//!
//! Kept deliberately small: the interesting knobs live on the collaborators,
//! not here. The config is serde-derived so embedders can load it from JSON
//! alongside their own settings.

use serde::{Deserialize, Serialize};

/// Reserved key of the implicit fallback page model.
pub const DEFAULT_MODEL_KEY: &str = "default";

/// Default selector of the application root node that page content is
/// grafted into.
pub const DEFAULT_APP_ROOT: &str = "#app";

/// Framework configuration, owned by the [`App`](crate::app::App).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// When set, staged actions are tagged with their originating
    /// notification key and the drain loop logs each pass.
    pub debug: bool,

    /// Key under which the implicit fallback model is registered.
    pub default_model_key: String,

    /// Selector of the node fetched page content is grafted into.
    pub app_root: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debug: false,
            default_model_key: DEFAULT_MODEL_KEY.to_string(),
            app_root: DEFAULT_APP_ROOT.to_string(),
        }
    }
}

impl AppConfig {
    /// Parse a config from a JSON document; absent fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_should_use_reserved_keys() {
        let config = AppConfig::default();
        assert!(!config.debug);
        assert_eq!(config.default_model_key, DEFAULT_MODEL_KEY);
        assert_eq!(config.app_root, DEFAULT_APP_ROOT);
    }

    #[test]
    fn from_json_should_keep_defaults_for_absent_fields() {
        let config = AppConfig::from_json(r#"{"debug": true}"#).unwrap();
        assert!(config.debug);
        assert_eq!(config.app_root, DEFAULT_APP_ROOT);
    }
}
