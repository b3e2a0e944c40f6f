use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Loader settings, usually read from a TOML file.
///
/// ```toml
/// [loader]
/// supported_version = "1.2"
/// use_cache = true
/// allow_flipped_hexagonal = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// The only map version accepted
    pub supported_version: String,
    /// Route external tilesets and images through the loader caches
    pub use_cache: bool,
    /// Accept flip bits on hexagonal maps instead of failing
    pub allow_flipped_hexagonal: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            supported_version: "1.2".to_string(),
            use_cache: true,
            allow_flipped_hexagonal: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    loader: LoaderConfig,
}

impl LoaderConfig {
    /// Parse the `[loader]` table of a TOML document. Missing keys keep their
    /// defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, LoadError> {
        let file: ConfigFile = toml::from_str(source)?;
        Ok(file.loader)
    }

    /// Read and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            file: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config = LoaderConfig::from_toml_str("").unwrap();
        assert_eq!(config, LoaderConfig::default());
        assert_eq!(config.supported_version, "1.2");
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[loader]
supported_version = "1.3"
use_cache = false
allow_flipped_hexagonal = true
"#;
        let config = LoaderConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.supported_version, "1.3");
        assert!(!config.use_cache);
        assert!(config.allow_flipped_hexagonal);
    }

    #[test]
    fn parse_partial_config() {
        let config = LoaderConfig::from_toml_str("[loader]\nuse_cache = false\n").unwrap();
        assert_eq!(config.supported_version, "1.2");
        assert!(!config.use_cache);
    }

    #[test]
    fn parse_invalid_config() {
        let err = LoaderConfig::from_toml_str("[loader]\nuse_cache = \"yes\"\n").unwrap_err();
        assert!(matches!(err, LoadError::Config(_)));
    }

    #[test]
    fn load_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("loader.toml");
        std::fs::write(&path, "[loader]\nsupported_version = \"1.2\"\n").unwrap();
        assert_eq!(LoaderConfig::load(&path).unwrap(), LoaderConfig::default());
        assert!(LoaderConfig::load(&tmp.path().join("missing.toml")).is_err());
    }
}
