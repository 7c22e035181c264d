//! Error types for walletweb-config

use std::path::PathBuf;
use thiserror::Error;

/// Config file section a validation failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Server,
    Export,
    Search,
    Pagination,
    TimeRange,
    Currency,
}

impl ConfigSection {
    /// Key of the section in the YAML file
    pub fn key(&self) -> &'static str {
        match self {
            ConfigSection::Server => "server",
            ConfigSection::Export => "export",
            ConfigSection::Search => "search",
            ConfigSection::Pagination => "pagination",
            ConfigSection::TimeRange => "time_range",
            ConfigSection::Currency => "currency",
        }
    }
}

impl std::fmt::Display for ConfigSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A numeric setting outside the range walletweb can work with
    #[error("{section}.{field} = {value} is out of range (expected {expected})")]
    OutOfRange {
        section: ConfigSection,
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// `custom` needs explicit dates and cannot be the startup range
    #[error("time_range.default_range cannot be '{range}'")]
    UnsupportedDefaultRange { range: crate::DateRange },
}

impl ConfigError {
    pub(crate) fn out_of_range(
        section: ConfigSection,
        field: &'static str,
        value: impl ToString,
        expected: &'static str,
    ) -> Self {
        ConfigError::OutOfRange {
            section,
            field,
            value: value.to_string(),
            expected,
        }
    }

    /// Stable code for logs and API payloads
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::NotFound { .. } => "CONFIG_NOT_FOUND",
            ConfigError::Read { .. } => "CONFIG_READ_FAILED",
            ConfigError::Yaml(_) => "CONFIG_INVALID_YAML",
            ConfigError::OutOfRange { .. } => "CONFIG_OUT_OF_RANGE",
            ConfigError::UnsupportedDefaultRange { .. } => "CONFIG_UNSUPPORTED_RANGE",
        }
    }

    /// Dotted path of the offending setting, when there is one
    pub fn field_path(&self) -> Option<String> {
        match self {
            ConfigError::OutOfRange { section, field, .. } => Some(format!("{}.{}", section, field)),
            ConfigError::UnsupportedDefaultRange { .. } => Some("time_range.default_range".to_string()),
            _ => None,
        }
    }

    /// `(line, column)` of a YAML syntax error, 1-based
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            ConfigError::Yaml(e) => e.location().map(|l| (l.line(), l.column())),
            _ => None,
        }
    }

    /// One-line hint shown next to the error at startup
    pub fn hint(&self) -> String {
        match self {
            ConfigError::NotFound { .. } => {
                "Pass --config <path>, or run without a file to use the defaults.".to_string()
            }
            ConfigError::Read { .. } => "Check the file permissions.".to_string(),
            ConfigError::Yaml(_) => "Run with --print-default-config to see a valid file.".to_string(),
            ConfigError::OutOfRange { section, field, expected, .. } => {
                format!("Set {}.{} to {}.", section, field, expected)
            }
            ConfigError::UnsupportedDefaultRange { .. } => {
                "Use one of: all, current-year, last-3-months, last-month.".to_string()
            }
        }
    }
}

/// Result type with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_names_the_setting() {
        let err = ConfigError::out_of_range(ConfigSection::Export, "history_capacity", 0, "at least 1");
        assert_eq!(err.code(), "CONFIG_OUT_OF_RANGE");
        assert_eq!(err.field_path().as_deref(), Some("export.history_capacity"));
        assert_eq!(err.to_string(), "export.history_capacity = 0 is out of range (expected at least 1)");
        assert_eq!(err.hint(), "Set export.history_capacity to at least 1.");
    }

    #[test]
    fn test_yaml_error_location() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("server: [unclosed").unwrap_err();
        let err = ConfigError::from(yaml_err);
        assert_eq!(err.code(), "CONFIG_INVALID_YAML");
        if let Some((line, _)) = err.location() {
            assert_eq!(line, 1);
        }
        assert!(err.field_path().is_none());
    }

    #[test]
    fn test_not_found_message() {
        let err = ConfigError::NotFound { path: PathBuf::from("/etc/walletweb.yaml") };
        assert_eq!(err.to_string(), "Config file not found: /etc/walletweb.yaml");
        assert!(err.hint().contains("--config"));
    }
}
