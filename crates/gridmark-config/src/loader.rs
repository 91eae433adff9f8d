//! Config file loading

use std::path::Path;

use crate::config::RenderConfig;
use crate::error::{ConfigError, ConfigResult};

/// Serialization format of a config source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML
    Toml,
    /// YAML
    Yaml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Pick a format from a file extension
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Loads and validates [`RenderConfig`] values
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read a config file, choosing the format from its extension
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<RenderConfig> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), ?format, "loading render config");
        Self::load_from_str(&text, format)
    }

    /// Parse config text in the given format
    pub fn load_from_str(text: &str, format: ConfigFormat) -> ConfigResult<RenderConfig> {
        let config: RenderConfig = match format {
            #[cfg(feature = "toml")]
            ConfigFormat::Toml => toml::from_str(text)?,
            #[cfg(feature = "yaml")]
            ConfigFormat::Yaml => serde_yaml::from_str(text)?,
            ConfigFormat::Json => serde_json::from_str(text)?,
            #[allow(unreachable_patterns)]
            other => {
                return Err(ConfigError::UnsupportedFormat(format!(
                    "{:?} support not compiled in",
                    other
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use test_case::test_case;

    #[test_case("page.toml", ConfigFormat::Toml ; "toml")]
    #[test_case("page.yaml", ConfigFormat::Yaml ; "yaml")]
    #[test_case("page.YML", ConfigFormat::Yaml ; "uppercase yml")]
    #[test_case("page.json", ConfigFormat::Json ; "json")]
    fn format_from_extension(name: &str, expected: ConfigFormat) {
        let format = ConfigFormat::from_path(&PathBuf::from(name)).unwrap();
        assert_eq!(format, expected);
    }

    #[test]
    fn unknown_extension_rejected() {
        let err = ConfigFormat::from_path(&PathBuf::from("page.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "ini"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            ConfigLoader::load_from_str(r#"{"palette": {"foreground": "lime"}}"#, ConfigFormat::Json)
                .unwrap();
        assert_eq!(config.palette.foreground, "lime");
        assert_eq!(config.palette.background, "black");
        assert_eq!(config.widgets.checkbox_unchecked, "[ ] ");
    }

    #[test]
    fn yaml_aliases_parse() {
        let yaml = "palette:\n  aliases:\n    danger: red\n";
        let config = ConfigLoader::load_from_str(yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.palette.aliases.get("danger").map(String::as_str), Some("red"));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let text = "[widgets]\ntextbox_width = 0\n";
        let err = ConfigLoader::load_from_str(text, ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ConfigLoader::load_from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
