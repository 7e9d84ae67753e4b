//! Engine configuration
//!
//! Sources are layered in the order they are added, later ones winning:
//!
//! ```text
//! defaults/idlweave.default.toml (compiled in)
//!   → project or user files
//!   → TOML text from the host document
//!   → single-key overrides
//! ```
//!
//! Every key has a default, so [`load_defaults`] always succeeds on a valid build.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/idlweave.default.toml");

/// Top-level configuration consumed by the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct IdlweaveConfig {
    pub webidl: WebIdlConfig,
    pub xref: XrefConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebIdlConfig {
    pub base_url: String,
}

/// Controls the external cross-reference lookups.
#[derive(Debug, Clone, Deserialize)]
pub struct XrefConfig {
    pub enabled: bool,
    pub timeout_ms: u64,
}

impl XrefConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Validation rule toggles. Syntax errors are always reported.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    pub require_exposed: bool,
    pub dict_arg_default: bool,
    pub duplicate_member: bool,
    pub duplicate_definition: bool,
    pub orphan_partial: bool,
}

/// Builds an [`IdlweaveConfig`] from the compiled-in defaults plus extra sources.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Begin from the compiled-in defaults.
    pub fn new() -> Self {
        Self {
            builder: Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    /// Add a TOML file that must exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.toml_file(path.as_ref(), true)
    }

    /// Add a TOML file if it exists.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.toml_file(path.as_ref(), false)
    }

    fn toml_file(mut self, path: &Path, required: bool) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path).format(FileFormat::Toml).required(required));
        self
    }

    /// Layer configuration given as TOML text, e.g. embedded in a host document.
    pub fn with_toml_str(mut self, toml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(toml, FileFormat::Toml));
        self
    }

    /// Override one dotted key, e.g. `validation.require_exposed`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<IdlweaveConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The compiled-in defaults alone.
pub fn load_defaults() -> Result<IdlweaveConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = load_defaults().unwrap();
        assert_eq!(config.webidl.base_url, "https://heycam.github.io/webidl/");
        assert!(config.xref.enabled);
        assert_eq!(config.xref.timeout(), Duration::from_millis(5000));
        assert!(config.validation.require_exposed);
        assert!(config.validation.dict_arg_default);
    }

    #[test]
    fn test_overrides_win() {
        let config = Loader::new()
            .set_override("validation.require_exposed", false)
            .unwrap()
            .set_override("xref.timeout_ms", 250_i64)
            .unwrap()
            .build()
            .unwrap();
        assert!(!config.validation.require_exposed);
        assert_eq!(config.xref.timeout_ms, 250);
    }

    #[test]
    fn test_toml_text_layers_over_defaults() {
        let config = Loader::new()
            .with_toml_str("[webidl]\nbase_url = \"https://webidl.spec.whatwg.org/\"\n")
            .build()
            .unwrap();
        assert_eq!(config.webidl.base_url, "https://webidl.spec.whatwg.org/");
        assert!(config.xref.enabled);
    }

    #[test]
    fn test_missing_required_file() {
        let result = Loader::new()
            .with_file("/nonexistent/idlweave.toml")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_optional_file() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/idlweave.toml")
            .build()
            .unwrap();
        assert!(config.validation.orphan_partial);
    }
}
