// Configuration validation

use crate::{ConfigError, Result};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::invalid(field, "cannot be empty"));
        }
        Ok(())
    }

    /// Validate that a number is within `min..=max`
    pub fn in_range<T: PartialOrd + std::fmt::Display>(
        value: T,
        min: T,
        max: T,
        field: &str,
    ) -> Result<()> {
        if value < min || value > max {
            return Err(ConfigError::invalid(
                field,
                format!("must be between {} and {}", min, max),
            ));
        }
        Ok(())
    }

    /// Validate a value against an RFC 1035 style name: lower-case letter
    /// first, then letters, digits or `-`, not ending in `-`.
    pub fn is_resource_name(value: &str, max_len: usize, field: &str) -> Result<()> {
        let bytes = value.as_bytes();
        let valid = !bytes.is_empty()
            && bytes.len() <= max_len
            && bytes[0].is_ascii_lowercase()
            && bytes[bytes.len() - 1] != b'-'
            && bytes
                .iter()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-');

        if !valid {
            return Err(ConfigError::invalid(
                field,
                format!(
                    "must be 1-{} lower-case letters, digits or '-', starting with a letter",
                    max_len
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty_validation() {
        assert!(ConfigValidator::not_empty("value", "field").is_ok());
        assert!(ConfigValidator::not_empty("", "field").is_err());
        assert!(ConfigValidator::not_empty("   ", "field").is_err());
    }

    #[test]
    fn test_range_validation() {
        assert!(ConfigValidator::in_range(5, 1, 10, "field").is_ok());
        assert!(ConfigValidator::in_range(1, 1, 10, "field").is_ok());
        assert!(ConfigValidator::in_range(0, 1, 10, "field").is_err());

        let err = ConfigValidator::in_range(11, 1, 10, "ttl").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: ttl must be between 1 and 10");
    }

    #[test]
    fn test_resource_name_validation() {
        assert!(ConfigValidator::is_resource_name("my-key", 63, "key_name").is_ok());
        assert!(ConfigValidator::is_resource_name("k1", 63, "key_name").is_ok());
        assert!(ConfigValidator::is_resource_name("", 63, "key_name").is_err());
        assert!(ConfigValidator::is_resource_name("1key", 63, "key_name").is_err());
        assert!(ConfigValidator::is_resource_name("key-", 63, "key_name").is_err());
        assert!(ConfigValidator::is_resource_name("My-Key", 63, "key_name").is_err());
        assert!(ConfigValidator::is_resource_name("abcd", 3, "key_name").is_err());
    }
}
