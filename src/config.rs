//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/typequiz/typequiz.toml`
//! 3. Local config: `<dir>/.typequiz.toml` (usually the working directory)
//! 4. Environment variables: `TYPEQUIZ_*` prefix
//!
//! CLI flags are applied on top by the caller.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::negotiate_locale;

/// Unified configuration for typequiz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Locale used for display unless overridden (default: "en")
    pub locale: String,
    /// Fallback locale for missing translations (default: "en")
    pub default_locale: String,
    /// Locales a host may request
    pub locales: Vec<String>,
    /// Tree document to load; the bundled tree is used when unset
    pub tree_path: Option<PathBuf>,
    /// Refuse trees that fail validation
    pub strict: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locale: "en".into(),
            default_locale: "en".into(),
            locales: vec!["en".into(), "es".into(), "zh-TW".into()],
            tree_path: None,
            strict: true,
        }
    }
}

/// Raw settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub locale: Option<String>,
    pub default_locale: Option<String>,
    pub locales: Option<Vec<String>>,
    pub tree_path: Option<PathBuf>,
    pub strict: Option<bool>,
}

/// Get the XDG config directory for typequiz.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "typequiz").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("typequiz.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".typequiz.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Base order is kept, new items are appended in overlay order
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let removed: HashSet<&str> = overlay
            .iter()
            .filter_map(|item| item.strip_prefix('!'))
            .collect();

        let mut result: Vec<String> = Vec::new();
        for item in base.iter().chain(overlay.iter().filter(|i| !i.starts_with('!'))) {
            if !removed.contains(item.as_str()) && !result.contains(item) {
                result.push(item.clone());
            }
        }
        result
    }

    /// Merge overlay config onto self (base).
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - `locales`: union merge with negation support
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            locale: overlay.locale.clone().unwrap_or_else(|| self.locale.clone()),
            default_locale: overlay
                .default_locale
                .clone()
                .unwrap_or_else(|| self.default_locale.clone()),
            locales: overlay
                .locales
                .as_ref()
                .map(|o| Self::merge_array(&self.locales, o))
                .unwrap_or_else(|| self.locales.clone()),
            tree_path: overlay.tree_path.clone().or_else(|| self.tree_path.clone()),
            strict: overlay.strict.unwrap_or(self.strict),
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            locales: global.locales.clone().unwrap_or_else(|| self.locales.clone()),
            ..self.merge_with(&RawSettings {
                locales: None,
                ..global.clone()
            })
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.typequiz.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.normalize();

        Ok(current)
    }

    /// Apply TYPEQUIZ_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("TYPEQUIZ").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("locale") {
            settings.locale = val;
        }
        if let Ok(val) = config.get_string("default_locale") {
            settings.default_locale = val;
        }
        if let Ok(val) = config.get_string("locales") {
            settings.locales = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Ok(val) = config.get_string("tree_path") {
            settings.tree_path = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("strict") {
            settings.strict = val;
        }

        Ok(settings)
    }

    /// Expand path variables and keep the default locale in the supported set.
    fn normalize(&mut self) {
        if let Some(path) = &self.tree_path {
            self.tree_path = Some(PathBuf::from(expand_env_vars(&path.to_string_lossy())));
        }
        if !self.locales.contains(&self.default_locale) {
            self.locales.push(self.default_locale.clone());
        }
    }

    /// Locale to display: `requested` (or the configured locale), negotiated
    /// against the supported set.
    pub fn effective_locale(&self, requested: Option<&str>) -> String {
        let wanted = requested.unwrap_or(self.locale.as_str());
        negotiate_locale(wanted, &self.locales, &self.default_locale).to_string()
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# typequiz configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/typequiz/typequiz.toml
#   Local:  ./.typequiz.toml
#   Env:    TYPEQUIZ_* environment variables (TYPEQUIZ_LOCALES is comma separated)
#
# Global `locales` REPLACES the compiled default list.
# Local `locales` UNIONS with it; "!xx" removes an inherited locale:
#   locales = ["fr", "!zh-TW"]

# Display locale
# locale = "en"

# Fallback when a text has no entry for the display locale
# default_locale = "en"

# Supported locales
# locales = ["en", "es", "zh-TW"]

# Decision tree document (JSON); the bundled tree is used when unset
# tree_path = "~/quiz/decision_tree.json"

# Refuse to run trees with validation errors
# strict = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn given_defaults_when_created_then_english_with_three_locales() {
        let settings = Settings::default();
        assert_eq!(settings.locale, "en");
        assert_eq!(settings.default_locale, "en");
        assert_eq!(settings.locales, strings(&["en", "es", "zh-TW"]));
        assert!(settings.strict);
        assert!(settings.tree_path.is_none());
    }

    #[test]
    fn test_merge_array_union_keeps_order() {
        let result = Settings::merge_array(&strings(&["en", "es"]), &strings(&["fr", "en"]));
        assert_eq!(result, strings(&["en", "es", "fr"]));
    }

    #[test]
    fn test_merge_array_negation() {
        let result = Settings::merge_array(&strings(&["en", "es", "zh-TW"]), &strings(&["!zh-TW", "fr"]));
        assert_eq!(result, strings(&["en", "es", "fr"]));
    }

    #[test]
    fn test_merge_array_negation_nonexistent() {
        let result = Settings::merge_array(&strings(&["en"]), &strings(&["!xx"]));
        assert_eq!(result, strings(&["en"]));
    }

    #[test]
    fn test_apply_global_replaces_locales() {
        let base = Settings::default();
        let global = RawSettings {
            locale: Some("es".into()),
            locales: Some(strings(&["es", "pt"])),
            ..RawSettings::default()
        };

        let result = base.apply_global(&global);

        assert_eq!(result.locale, "es");
        assert_eq!(result.locales, strings(&["es", "pt"]));
        assert_eq!(result.default_locale, "en");
    }

    #[test]
    fn test_merge_with_unions_locales_and_overrides_scalars() {
        let base = Settings::default();
        let local = RawSettings {
            strict: Some(false),
            tree_path: Some(PathBuf::from("tree.json")),
            locales: Some(strings(&["!es", "fr"])),
            ..RawSettings::default()
        };

        let result = base.merge_with(&local);

        assert!(!result.strict);
        assert_eq!(result.tree_path, Some(PathBuf::from("tree.json")));
        assert_eq!(result.locales, strings(&["en", "zh-TW", "fr"]));
    }

    #[test]
    fn given_default_locale_not_listed_when_normalizing_then_added() {
        let mut settings = Settings {
            default_locale: "de".into(),
            locales: strings(&["en"]),
            ..Settings::default()
        };
        settings.normalize();
        assert_eq!(settings.locales, strings(&["en", "de"]));
    }

    #[test]
    fn given_tilde_in_tree_path_when_normalizing_then_expands_to_home() {
        let mut settings = Settings {
            tree_path: Some(PathBuf::from("~/quiz/tree.json")),
            ..Settings::default()
        };

        settings.normalize();

        let home = std::env::var("HOME").expect("HOME should be set");
        let path = settings.tree_path.unwrap();
        assert!(path.to_string_lossy().starts_with(&home), "{}", path.display());
    }

    #[test]
    fn given_unsupported_locale_when_resolving_effective_then_default() {
        let settings = Settings::default();
        assert_eq!(settings.effective_locale(Some("fr")), "en");
        assert_eq!(settings.effective_locale(Some("es-AR")), "es");
        assert_eq!(settings.effective_locale(None), "en");
    }

    #[test]
    fn given_template_when_parsed_then_yields_defaults() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.locale.is_none());
        assert!(raw.locales.is_none());
    }
}
