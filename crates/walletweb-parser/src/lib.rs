//! Transaction dataset parser implementation
//!
//! Loads transaction records from JSON, YAML or CSV files.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod error;
pub mod types;
pub mod parser;

pub use error::ParseError;
pub use parser::{normalize_date, SimpleDatasetParser};
pub use types::{DatasetFormat, RawRecord, SpannedRecord};

// ==================== Parser Trait ====================

/// Parser reference type
pub type ParserRef = Arc<dyn DatasetParserTrait>;

/// Trait for dataset parsers
#[async_trait]
pub trait DatasetParserTrait: Send + Sync {
    /// Parse dataset content in the given format
    async fn parse(&self, content: &str, format: DatasetFormat) -> Result<Vec<SpannedRecord>, ParseError>;

    /// Parse a single dataset file, detecting the format from its extension
    async fn parse_file(&self, path: PathBuf) -> Result<Vec<SpannedRecord>, ParseError>;

    /// Parse every file matching a path or glob pattern, in path order.
    /// Nothing matching yields an empty list.
    async fn parse_pattern(&self, pattern: PathBuf) -> Result<Vec<SpannedRecord>, ParseError>;
}

/// Default parser implementation
#[derive(Debug, Default)]
pub struct DefaultDatasetParser;

#[async_trait]
impl DatasetParserTrait for DefaultDatasetParser {
    async fn parse(&self, content: &str, format: DatasetFormat) -> Result<Vec<SpannedRecord>, ParseError> {
        SimpleDatasetParser::parse(content, format)
    }

    async fn parse_file(&self, path: PathBuf) -> Result<Vec<SpannedRecord>, ParseError> {
        let format = DatasetFormat::from_path(&path).ok_or_else(|| ParseError::UnsupportedFormat {
            path: path.to_string_lossy().to_string(),
        })?;

        let content = tokio::fs::read_to_string(&path).await?;
        let source_path = path.to_string_lossy().to_string();

        SimpleDatasetParser::parse_with_source(&content, format, Some(&source_path))
    }

    async fn parse_pattern(&self, pattern: PathBuf) -> Result<Vec<SpannedRecord>, ParseError> {
        let mut records = Vec::new();
        for path in expand_pattern(&pattern)? {
            records.extend(self.parse_file(path).await?);
        }
        Ok(records)
    }
}

/// Expand a path that may contain `*` or `?` into the existing files it names
pub fn expand_pattern(pattern: &Path) -> Result<Vec<PathBuf>, ParseError> {
    let pattern_str = pattern.to_string_lossy();

    if pattern_str.contains('*') || pattern_str.contains('?') {
        let paths = glob::glob(&pattern_str).map_err(|e| ParseError::SyntaxError {
            location: pattern_str.to_string(),
            message: e.to_string(),
        })?;
        let mut files: Vec<PathBuf> = paths.flatten().filter(|p| p.is_file()).collect();
        files.sort();
        Ok(files)
    } else if pattern.is_file() {
        Ok(vec![pattern.to_path_buf()])
    } else {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_parse_file_detects_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("march.csv");
        std::fs::write(&path, "type,amount,date\nexpense,9.99,2024-03-04\n").unwrap();

        let parser = DefaultDatasetParser;
        let records = parser.parse_file(path.clone()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source.as_deref(), Some(path.to_string_lossy().as_ref()));
    }

    #[tokio::test]
    async fn test_parse_file_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.bean");
        std::fs::write(&path, "2024-01-01 open Assets:Cash").unwrap();

        let err = DefaultDatasetParser.parse_file(path).await.unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFormat { .. }));
    }

    #[tokio::test]
    async fn test_parse_pattern_merges_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("b.json"),
            r#"[{"id": "b1", "type": "expense", "amount": 2, "date": "2024-02-01"}]"#,
        ).unwrap();
        std::fs::write(
            dir.path().join("a.yaml"),
            "- id: a1\n  type: income\n  amount: 1\n  date: 2024-01-01\n",
        ).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let pattern = dir.path().join("*.*");
        let parser = DefaultDatasetParser;
        let err = parser.parse_pattern(pattern).await.unwrap_err();
        // notes.txt matches the glob but has no loader
        assert!(matches!(err, ParseError::UnsupportedFormat { .. }));

        std::fs::remove_file(dir.path().join("notes.txt")).unwrap();
        let records = parser.parse_pattern(dir.path().join("*.*")).await.unwrap();
        let ids: Vec<_> = records.iter().filter_map(|r| r.data.id.clone()).collect();
        assert_eq!(ids, vec!["a1", "b1"]);
    }

    #[tokio::test]
    async fn test_parse_pattern_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let records = DefaultDatasetParser
            .parse_pattern(dir.path().join("transactions.json"))
            .await
            .unwrap();
        assert!(records.is_empty());
    }
}
