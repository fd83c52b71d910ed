//! Inspector configuration.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! yields a working configuration:
//!
//! ```toml
//! [fold]
//! duration_ms = 150
//! easing = "ease-out-cubic"
//!
//! [filter]
//! case_sensitive = false
//! force_build_folded = true
//!
//! [navigation]
//! wrap_rows = false
//! remember_column = true
//!
//! [pool]
//! max_free_per_kind = 256
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use horizon_inspector_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::easing::Easing;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("invalid inspector configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be written as TOML.
    #[error("failed to serialize inspector configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The file could not be read.
    #[error("failed to read inspector configuration '{path}': {source}")]
    Io {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Fold animation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FoldConfig {
    /// Time for a full fold or unfold. Zero switches instantly.
    pub duration_ms: u64,
    /// Curve used for drawing.
    pub easing: Easing,
}

impl Default for FoldConfig {
    fn default() -> Self {
        Self {
            duration_ms: 150,
            easing: Easing::default(),
        }
    }
}

impl FoldConfig {
    /// The configured duration.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Filter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Match search terms case-sensitively.
    pub case_sensitive: bool,
    /// Construct the members of folded parents so that matches inside them
    /// surface. When off, folded parents that were never opened are judged
    /// by their own label only.
    pub force_build_folded: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            force_build_folded: true,
        }
    }
}

/// Keyboard navigation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    /// Whether Left/Right at a row boundary continue into the adjacent row
    /// when the caller does not say otherwise.
    pub wrap_rows: bool,
    /// Keep the column of the last horizontal move while passing through
    /// narrower rows.
    pub remember_column: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            wrap_rows: false,
            remember_column: true,
        }
    }
}

/// Pool settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Largest free-list per drawer kind. Unbounded when absent.
    pub max_free_per_kind: Option<usize>,
}

/// Complete inspector configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InspectorConfig {
    /// Fold animation.
    pub fold: FoldConfig,
    /// Filtering.
    pub filter: FilterConfig,
    /// Keyboard navigation.
    pub navigation: NavigationConfig,
    /// Drawer pooling.
    pub pool: PoolConfig,
}

impl InspectorConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(target: targets::CONFIG, path = %path.display(), "loaded inspector configuration");
        Ok(config)
    }

    /// Serialize to TOML text.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_is_default() {
        let config = InspectorConfig::from_toml_str("").unwrap();
        assert_eq!(config, InspectorConfig::default());
        assert!(config.filter.force_build_folded);
        assert_eq!(config.pool.max_free_per_kind, None);
    }

    #[test]
    fn test_partial_document() {
        let config = InspectorConfig::from_toml_str(
            r#"
            [fold]
            duration_ms = 0
            easing = "linear"

            [pool]
            max_free_per_kind = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.fold.duration(), Duration::ZERO);
        assert_eq!(config.fold.easing, Easing::Linear);
        assert_eq!(config.pool.max_free_per_kind, Some(8));
        assert!(config.navigation.remember_column);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = InspectorConfig::from_toml_str("[filter]\nfuzzy = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_serialize_then_parse() {
        let mut config = InspectorConfig::default();
        config.fold.easing = Easing::EaseInOutSine;
        config.navigation.wrap_rows = true;
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("ease-in-out-sine"));
        assert_eq!(InspectorConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[filter]\ncase_sensitive = true").unwrap();
        let config = InspectorConfig::load(file.path()).unwrap();
        assert!(config.filter.case_sensitive);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = InspectorConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
