//! Optional TOML configuration for output destinations.

use std::fs;
use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub models: Option<String>,
    pub diagram: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_paths() {
        let config: Config = toml::from_str(
            "[output]\nmodels = \"app/models.py\"\ndiagram = \"docs/schema.md\"\n",
        )
        .unwrap();
        assert_eq!(config.output.models.as_deref(), Some("app/models.py"));
        assert_eq!(config.output.diagram.as_deref(), Some("docs/schema.md"));
    }

    #[test]
    fn test_empty_config_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.output.models.is_none());
        assert!(config.output.diagram.is_none());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load(Path::new("no/such/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { path, .. } if path.contains("config.toml")));
    }
}
