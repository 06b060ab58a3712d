// Configuration file loaders

use crate::{ConfigError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }

    /// Detect the format of `path`. A bare `.env` file counts as `Env`.
    pub fn detect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.file_name().and_then(|n| n.to_str()) == Some(".env") {
            return Ok(FileFormat::Env);
        }

        let ext = path.extension().and_then(|s| s.to_str()).ok_or_else(|| {
            ConfigError::LoadError(format!("No file extension found: {}", path.display()))
        })?;

        Self::from_extension(ext)
            .ok_or_else(|| ConfigError::LoadError(format!("Unsupported format: {}", ext)))
    }
}

/// Configuration file loader
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(FileFormat::detect(path)?))
    }

    /// Load configuration from file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        self.parse(&content)
    }

    /// Parse configuration from string
    pub fn parse(&self, content: &str) -> Result<Value> {
        match self.format {
            FileFormat::Json => self.parse_json(content),
            FileFormat::Toml => self.parse_toml(content),
            FileFormat::Env => self.parse_env(content),
        }
    }

    fn parse_json(&self, content: &str) -> Result<Value> {
        serde_json::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))
    }

    fn parse_toml(&self, content: &str) -> Result<Value> {
        let table: toml::Table = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        serde_json::to_value(table)
            .map_err(|e| ConfigError::ParseError(format!("TOML to JSON conversion error: {}", e)))
    }

    fn parse_env(&self, content: &str) -> Result<Value> {
        let mut map = serde_json::Map::new();

        for item in dotenvy::from_read_iter(content.as_bytes()) {
            let (key, value) =
                item.map_err(|e| ConfigError::ParseError(format!("dotenv parse error: {}", e)))?;
            map.insert(key.to_lowercase(), Value::String(value));
        }

        Ok(Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let loader = ConfigLoader::new(FileFormat::Json);
        let result = loader
            .parse(r#"{"key_name": "my-key", "default_ttl_secs": 60}"#)
            .unwrap();

        assert_eq!(result["key_name"], "my-key");
        assert_eq!(result["default_ttl_secs"], 60);
    }

    #[test]
    fn test_parse_toml_with_table() {
        let loader = ConfigLoader::new(FileFormat::Toml);
        let toml = r#"
            key_name = "my-key"

            [keys]
            my-key = "nZtRohdNF9m3cKM24IcK4w=="
        "#;

        let result = loader.parse(toml).unwrap();
        assert_eq!(result["keys"]["my-key"], "nZtRohdNF9m3cKM24IcK4w==");
    }

    #[test]
    fn test_parse_env() {
        let loader = ConfigLoader::new(FileFormat::Env);
        let env = "# signing key\nKEY_NAME=my-key\nKEY=\"nZtRohdNF9m3cKM24IcK4w==\"\n";

        let result = loader.parse(env).unwrap();
        assert_eq!(result["key_name"], "my-key");
        assert_eq!(result["key"], "nZtRohdNF9m3cKM24IcK4w==");
    }

    #[test]
    fn test_parse_invalid_toml() {
        let loader = ConfigLoader::new(FileFormat::Toml);
        assert!(matches!(
            loader.parse("key_name = "),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("json"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("yaml"), None);
        assert_eq!(FileFormat::detect("conf/.env").unwrap(), FileFormat::Env);
        assert_eq!(FileFormat::detect("signer.toml").unwrap(), FileFormat::Toml);
        assert!(FileFormat::detect("signer").is_err());
    }
}
