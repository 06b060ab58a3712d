// ConfigManagerBuilder - layered loading

use crate::{ConfigManager, Result};
use std::path::PathBuf;

/// Builds a [`ConfigManager`] from several sources.
///
/// Sources are applied in a fixed order, later ones overriding earlier ones:
/// configuration files (in the order added), then the `.env` file, then the
/// process environment.
pub struct ConfigManagerBuilder {
    prefix: Option<String>,
    load_env: bool,
    load_dotenv: bool,
    dotenv_path: Option<PathBuf>,
    config_files: Vec<PathBuf>,
}

impl ConfigManagerBuilder {
    pub fn new() -> Self {
        Self {
            prefix: None,
            load_env: false,
            load_dotenv: false,
            dotenv_path: None,
            config_files: Vec::new(),
        }
    }

    /// Set environment variable prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Enable loading from environment variables
    pub fn load_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Enable loading from a `.env` file (the current directory's by default)
    pub fn load_dotenv(mut self, path: Option<PathBuf>) -> Self {
        self.load_dotenv = true;
        self.dotenv_path = path;
        self
    }

    /// Add a configuration file; its format is detected from the name
    pub fn add_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_files.push(path.into());
        self
    }

    /// Build the configuration manager
    pub fn build(self) -> Result<ConfigManager> {
        let manager = match self.prefix {
            Some(prefix) => ConfigManager::with_prefix(prefix),
            None => ConfigManager::new(),
        };

        for path in &self.config_files {
            manager.load_file(path)?;
        }

        if self.load_dotenv {
            manager.load_dotenv(self.dotenv_path.as_deref())?;
        } else if self.load_env {
            manager.load_env()?;
        }

        Ok(manager)
    }
}

impl Default for ConfigManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use std::io::Write;

    #[test]
    fn test_later_files_override_earlier() {
        let mut first = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(first, r#"{{"key_name": "old", "key": "abc"}}"#).unwrap();
        let mut second = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(second, "key_name = \"new\"").unwrap();

        let manager = ConfigManagerBuilder::new()
            .add_file(first.path())
            .add_file(second.path())
            .build()
            .unwrap();

        assert_eq!(manager.get_string("key_name").unwrap(), "new");
        assert_eq!(manager.get_string("key").unwrap(), "abc");
    }

    #[test]
    fn test_missing_file_fails() {
        let result = ConfigManagerBuilder::new()
            .add_file("/nonexistent/cloudsign.toml")
            .build();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_empty_builder() {
        let manager = ConfigManagerBuilder::default().build().unwrap();
        assert!(manager.keys().is_empty());
    }
}
