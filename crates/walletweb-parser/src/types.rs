//! Common types for dataset parsing

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Dataset file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    Json,
    Yaml,
    Csv,
}

impl DatasetFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "json" => Some(DatasetFormat::Json),
            "yaml" | "yml" => Some(DatasetFormat::Yaml),
            "csv" => Some(DatasetFormat::Csv),
            _ => None,
        }
    }
}

impl fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetFormat::Json => write!(f, "json"),
            DatasetFormat::Yaml => write!(f, "yaml"),
            DatasetFormat::Csv => write!(f, "csv"),
        }
    }
}

/// A transaction record as written in a dataset file.
///
/// Categorical fields stay as text here; the core crate turns them into
/// typed values and enforces the amount invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    pub amount: rust_decimal::Decimal,
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub account: String,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default, rename = "isAutoCategorized", alias = "is_auto_categorized")]
    pub is_auto_categorized: bool,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "completed".to_string()
}

/// Record with its normalized date and source position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpannedRecord {
    pub data: RawRecord,
    pub date: chrono::NaiveDate,
    /// Record number for JSON/YAML, line number for CSV (1-indexed)
    pub line: usize,
    /// Source file path
    pub source: Option<String>,
}

impl SpannedRecord {
    /// `file:line` style location for error messages
    pub fn location(&self) -> String {
        format!("{}:{}", self.source.as_deref().unwrap_or("<input>"), self.line)
    }
}

/// Tags may be a list, or a single string joined by `;` or `,` (CSV)
fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TagsVisitor;

    impl<'de> Visitor<'de> for TagsVisitor {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a list of tags or a delimited string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(split_tags(v))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(split_tags(&v))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(TagsVisitor)
        }

        // CSV infers numeric-looking fields
        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut tags = Vec::new();
            while let Some(tag) = seq.next_element::<String>()? {
                let tag = tag.trim().to_string();
                if !tag.is_empty() {
                    tags.push(tag);
                }
            }
            Ok(tags)
        }
    }

    deserializer.deserialize_any(TagsVisitor)
}

fn split_tags(joined: &str) -> Vec<String> {
    joined
        .split(|c| c == ';' || c == ',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(DatasetFormat::from_path(Path::new("a/tx.JSON")), Some(DatasetFormat::Json));
        assert_eq!(DatasetFormat::from_path(Path::new("tx.yml")), Some(DatasetFormat::Yaml));
        assert_eq!(DatasetFormat::from_path(Path::new("tx.csv")), Some(DatasetFormat::Csv));
        assert_eq!(DatasetFormat::from_path(Path::new("tx.bean")), None);
        assert_eq!(DatasetFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags("food; weekly,,groceries "), vec!["food", "weekly", "groceries"]);
        assert!(split_tags("  ").is_empty());
    }
}
