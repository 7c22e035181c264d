//! Configuration management for walletweb
//!
//! This module handles loading, validation, and management of
//! walletweb configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult, ConfigSection};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8082
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the data directory
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Dataset file or glob pattern (relative to data path)
    #[serde(default = "default_dataset")]
    pub dataset: String,
    /// Key-value state file holding recent searches (relative to data path)
    #[serde(default = "default_state_file")]
    pub state_file: String,
    /// Seed the built-in demo transactions when no dataset matches
    #[serde(default = "default_true")]
    pub demo_when_empty: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            dataset: default_dataset(),
            state_file: default_state_file(),
            demo_when_empty: true,
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_dataset() -> String {
    "transactions.json".to_string()
}

fn default_state_file() -> String {
    "state.json".to_string()
}

fn default_true() -> bool {
    true
}

/// Export dialog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Simulated report generation latency in milliseconds
    #[serde(default = "default_generation_delay")]
    pub generation_delay_ms: u64,
    /// Number of generated reports kept in the history
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Base URL used for share links
    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            generation_delay_ms: default_generation_delay(),
            history_capacity: default_history_capacity(),
            share_base_url: default_share_base_url(),
        }
    }
}

fn default_generation_delay() -> u64 {
    2000
}

fn default_history_capacity() -> usize {
    20
}

fn default_share_base_url() -> String {
    "http://127.0.0.1:8082".to_string()
}

/// Search box settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of recent search terms remembered
    #[serde(default = "default_recent_capacity")]
    pub recent_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            recent_capacity: default_recent_capacity(),
        }
    }
}

fn default_recent_capacity() -> usize {
    5
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Records per page for lists
    #[serde(default = "default_records_per_page")]
    pub records_per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            records_per_page: default_records_per_page(),
        }
    }
}

fn default_records_per_page() -> usize {
    25
}

/// Time range configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimeRangeConfig {
    /// Range preselected in filters and the export dialog
    #[serde(default)]
    pub default_range: DateRange,
}

/// Named date range selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateRange {
    /// No date filtering
    All,
    /// January 1 of the current year onwards
    CurrentYear,
    /// Three calendar months back from today onwards
    #[serde(rename = "last-3-months")]
    LastThreeMonths,
    /// One calendar month back from today onwards
    LastMonth,
    /// Explicit start and end dates
    Custom,
}

impl Default for DateRange {
    fn default() -> Self {
        DateRange::All
    }
}

impl DateRange {
    /// All selectable ranges, in display order
    pub const ALL: [DateRange; 5] = [
        DateRange::All,
        DateRange::CurrentYear,
        DateRange::LastThreeMonths,
        DateRange::LastMonth,
        DateRange::Custom,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            DateRange::All => "All Time",
            DateRange::CurrentYear => "Current Year",
            DateRange::LastThreeMonths => "Last 3 Months",
            DateRange::LastMonth => "Last Month",
            DateRange::Custom => "Custom Range",
        }
    }
}

impl std::str::FromStr for DateRange {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(DateRange::All),
            "current-year" | "year" => Ok(DateRange::CurrentYear),
            "last-3-months" | "quarter" => Ok(DateRange::LastThreeMonths),
            "last-month" | "month" => Ok(DateRange::LastMonth),
            "custom" => Ok(DateRange::Custom),
            _ => Err(format!("Invalid date range: {}", s)),
        }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateRange::All => write!(f, "all"),
            DateRange::CurrentYear => write!(f, "current-year"),
            DateRange::LastThreeMonths => write!(f, "last-3-months"),
            DateRange::LastMonth => write!(f, "last-month"),
            DateRange::Custom => write!(f, "custom"),
        }
    }
}

/// Chart and visualization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Number of top categories to show
    #[serde(default = "default_top_items")]
    pub top_items_count: usize,
    /// Show chart legends
    #[serde(default = "default_true")]
    pub show_legend: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            top_items_count: 8,
            show_legend: true,
        }
    }
}

fn default_top_items() -> usize {
    8
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency code
    #[serde(default = "default_currency")]
    pub code: String,
    /// Currency symbol
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Thousands separator
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
    /// Currency symbol position ("before" or "after")
    #[serde(default)]
    pub symbol_position: SymbolPosition,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            code: default_currency(),
            symbol: default_symbol(),
            decimal_places: 2,
            thousands_separator: ",".to_string(),
            symbol_position: SymbolPosition::Before,
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_symbol() -> String {
    "$".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

fn default_thousands_sep() -> String {
    ",".to_string()
}

/// Currency symbol position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    Before,
    After,
}

impl Default for SymbolPosition {
    fn default() -> Self {
        SymbolPosition::Before
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Data directory settings
    #[serde(default)]
    pub data: DataConfig,
    /// Export dialog settings
    #[serde(default)]
    pub export: ExportConfig,
    /// Search settings
    #[serde(default)]
    pub search: SearchConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Time range settings
    #[serde(default)]
    pub time_range: TimeRangeConfig,
    /// Chart settings
    #[serde(default)]
    pub charts: ChartConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        use ConfigSection::*;

        if self.server.port == 0 {
            return Err(ConfigError::out_of_range(Server, "port", self.server.port, "1-65535"));
        }
        if self.export.history_capacity == 0 {
            return Err(ConfigError::out_of_range(
                Export,
                "history_capacity",
                self.export.history_capacity,
                "at least 1",
            ));
        }
        if self.search.recent_capacity == 0 {
            return Err(ConfigError::out_of_range(
                Search,
                "recent_capacity",
                self.search.recent_capacity,
                "at least 1",
            ));
        }
        if self.pagination.records_per_page == 0 {
            return Err(ConfigError::out_of_range(
                Pagination,
                "records_per_page",
                self.pagination.records_per_page,
                "at least 1",
            ));
        }
        if self.currency.decimal_places > 10 {
            return Err(ConfigError::out_of_range(
                Currency,
                "decimal_places",
                self.currency.decimal_places,
                "0-10",
            ));
        }
        if self.time_range.default_range == DateRange::Custom {
            return Err(ConfigError::UnsupportedDefaultRange {
                range: self.time_range.default_range,
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Get the full dataset path or pattern
    pub fn dataset_path(&self) -> PathBuf {
        self.data.path.join(&self.data.dataset)
    }

    /// Get the full path to the state file
    pub fn state_path(&self) -> PathBuf {
        resolve(&self.data.path, &self.data.state_file)
    }
}

fn resolve(base: &Path, file: &str) -> PathBuf {
    let candidate = Path::new(file);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.server.port, 8082);
        assert_eq!(config.search.recent_capacity, 5);
        assert_eq!(config.export.history_capacity, 20);
        assert_eq!(config.export.generation_delay_ms, 2000);
        assert_eq!(config.time_range.default_range, DateRange::All);
        assert!(config.data.demo_when_empty);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
server:
  port: 9000
time_range:
  default_range: last-3-months
currency:
  code: EUR
  symbol: "€"
  symbol_position: after
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.time_range.default_range, DateRange::LastThreeMonths);
        assert_eq!(config.currency.symbol_position, SymbolPosition::After);
        assert_eq!(config.currency.decimal_places, 2);
    }

    #[test]
    fn test_default_template_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.search.recent_capacity, 5);
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let err = Config::from_yaml("server:\n  port: 0\n").unwrap_err();
        assert_eq!(err.field_path().as_deref(), Some("server.port"));
        assert!(matches!(err, ConfigError::OutOfRange { section: ConfigSection::Server, .. }));
    }

    #[test]
    fn test_validate_names_each_section() {
        let cases = [
            ("export:\n  history_capacity: 0\n", "export.history_capacity"),
            ("search:\n  recent_capacity: 0\n", "search.recent_capacity"),
            ("pagination:\n  records_per_page: 0\n", "pagination.records_per_page"),
            ("currency:\n  decimal_places: 11\n", "currency.decimal_places"),
        ];
        for (yaml, path) in cases {
            let err = Config::from_yaml(yaml).unwrap_err();
            assert_eq!(err.field_path().as_deref(), Some(path), "{}", yaml);
            assert_eq!(err.code(), "CONFIG_OUT_OF_RANGE");
        }
    }

    #[test]
    fn test_validate_rejects_custom_default_range() {
        let err = Config::from_yaml("time_range:\n  default_range: custom\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedDefaultRange { range: DateRange::Custom }));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(PathBuf::from("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data:\n  path: /tmp/wallet\n  state_file: searches.json").unwrap();
        let config = Config::load(file.path().to_path_buf()).unwrap();
        assert_eq!(config.state_path(), PathBuf::from("/tmp/wallet/searches.json"));
        assert_eq!(config.dataset_path(), PathBuf::from("/tmp/wallet/transactions.json"));
    }

    #[test]
    fn test_date_range_from_str() {
        assert_eq!("all".parse::<DateRange>().unwrap(), DateRange::All);
        assert_eq!("current-year".parse::<DateRange>().unwrap(), DateRange::CurrentYear);
        assert_eq!("last-3-months".parse::<DateRange>().unwrap(), DateRange::LastThreeMonths);
        assert_eq!("LAST-MONTH".parse::<DateRange>().unwrap(), DateRange::LastMonth);
        assert_eq!("custom".parse::<DateRange>().unwrap(), DateRange::Custom);
        assert!("fortnight".parse::<DateRange>().is_err());
    }

    #[test]
    fn test_date_range_display_matches_serde() {
        for range in DateRange::ALL {
            let yaml = serde_yaml::to_string(&range).unwrap();
            assert_eq!(yaml.trim(), range.to_string());
        }
    }
}
