//! Dataset parser implementation

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParseError;
use crate::types::{DatasetFormat, RawRecord, SpannedRecord};

/// Leading `YYYY-MM-DD` (or `/` separated) date, optionally followed by a time part
static DATE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{4})[-/](\d{1,2})[-/](\d{1,2})(?:[T ][0-9:.]+(?:Z|[+-]\d{2}:?\d{2})?)?\s*$")
        .expect("date regex is valid")
});

/// Parses dataset documents into spanned records
pub struct SimpleDatasetParser;

impl SimpleDatasetParser {
    /// Parse dataset content
    pub fn parse(content: &str, format: DatasetFormat) -> Result<Vec<SpannedRecord>, ParseError> {
        Self::parse_with_source(content, format, None)
    }

    /// Parse dataset content with source file path
    pub fn parse_with_source(
        content: &str,
        format: DatasetFormat,
        source: Option<&str>,
    ) -> Result<Vec<SpannedRecord>, ParseError> {
        let location = source.unwrap_or("<input>").to_string();

        let records: Vec<(usize, RawRecord)> = match format {
            DatasetFormat::Json => {
                if content.trim().is_empty() {
                    return Ok(Vec::new());
                }
                let raw: Vec<RawRecord> = serde_json::from_str(content)
                    .map_err(|e| ParseError::SyntaxError {
                        location: format!("{}:{}", location, e.line()),
                        message: e.to_string(),
                    })?;
                raw.into_iter().enumerate().map(|(i, r)| (i + 1, r)).collect()
            }
            DatasetFormat::Yaml => {
                if content.trim().is_empty() {
                    return Ok(Vec::new());
                }
                let raw: Vec<RawRecord> = serde_yaml::from_str(content)
                    .map_err(|e| ParseError::SyntaxError {
                        location: match e.location() {
                            Some(loc) => format!("{}:{}", location, loc.line()),
                            None => location.clone(),
                        },
                        message: e.to_string(),
                    })?;
                raw.into_iter().enumerate().map(|(i, r)| (i + 1, r)).collect()
            }
            DatasetFormat::Csv => Self::parse_csv(content, &location)?,
        };

        records
            .into_iter()
            .map(|(line, data)| {
                let date = normalize_date(&data.date).ok_or_else(|| ParseError::InvalidRecord {
                    location: format!("{}:{}", location, line),
                    message: format!("unparseable date '{}'", data.date),
                })?;
                Ok(SpannedRecord {
                    data,
                    date,
                    line,
                    source: source.map(str::to_string),
                })
            })
            .collect()
    }

    fn parse_csv(content: &str, location: &str) -> Result<Vec<(usize, RawRecord)>, ParseError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut records = Vec::new();
        for row in reader.deserialize::<RawRecord>() {
            let record = row.map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                ParseError::SyntaxError {
                    location: format!("{}:{}", location, line),
                    message: e.to_string(),
                }
            })?;
            records.push(record);
        }

        // The header occupies line 1
        Ok(records.into_iter().enumerate().map(|(i, r)| (i + 2, r)).collect())
    }
}

/// Normalize an ISO-like date string (`2024-01-05`, `2024/1/5`,
/// `2024-01-05T10:30:00Z`) to a calendar date
pub fn normalize_date(value: &str) -> Option<NaiveDate> {
    let caps = DATE_PREFIX.captures(value)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2024-01-05"), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(normalize_date("2024/1/5"), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(normalize_date("2024-03-10T08:15:00Z"), NaiveDate::from_ymd_opt(2024, 3, 10));
        assert_eq!(normalize_date("2024-03-10 08:15:00"), NaiveDate::from_ymd_opt(2024, 3, 10));
        assert_eq!(normalize_date("2024-02-30"), None);
        assert_eq!(normalize_date("yesterday"), None);
        assert_eq!(normalize_date(""), None);
    }

    #[test]
    fn test_parse_json() {
        let input = r#"[
            {"id": "t1", "type": "income", "amount": 100, "date": "2024-01-05",
             "description": "Salary", "category": "Salary", "account": "Checking",
             "tags": ["work"], "isAutoCategorized": true, "status": "completed"},
            {"type": "expense", "amount": "40.25", "date": "2024-01-20", "category": "Food"}
        ]"#;
        let records = SimpleDatasetParser::parse(input, DatasetFormat::Json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data.id.as_deref(), Some("t1"));
        assert!(records[0].data.is_auto_categorized);
        assert_eq!(records[0].data.tags, vec!["work"]);
        assert_eq!(records[1].data.amount, Decimal::from_str("40.25").unwrap());
        assert_eq!(records[1].data.status, "completed");
        assert_eq!(records[1].line, 2);
        assert!(records[1].data.tags.is_empty());
    }

    #[test]
    fn test_parse_yaml() {
        let input = r#"
- type: expense
  amount: 12.5
  date: 2024-02-01
  category: Transport
  tags: commute; metro
- type: transfer
  amount: 300
  date: "2024-02-03"
  account: Savings
"#;
        let records = SimpleDatasetParser::parse(input, DatasetFormat::Yaml).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data.tags, vec!["commute", "metro"]);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(records[1].data.kind, "transfer");
    }

    #[test]
    fn test_parse_csv() {
        let input = "id,type,amount,date,description,category,account,tags,isAutoCategorized,status\n\
                     t1,income,2500.00,2024-03-01,Paycheck,Salary,Checking,work;monthly,false,completed\n\
                     ,expense,18.40,2024-03-02,Lunch,Food,Credit Card,,true,pending\n";
        let records = SimpleDatasetParser::parse_with_source(input, DatasetFormat::Csv, Some("tx.csv")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data.tags, vec!["work", "monthly"]);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[1].data.id, None);
        assert!(records[1].data.tags.is_empty());
        assert!(records[1].data.is_auto_categorized);
        assert_eq!(records[1].location(), "tx.csv:3");
    }

    #[test]
    fn test_parse_invalid_date_is_error() {
        let input = r#"[{"type": "expense", "amount": 5, "date": "not-a-date"}]"#;
        let err = SimpleDatasetParser::parse(input, DatasetFormat::Json).unwrap_err();
        match err {
            ParseError::InvalidRecord { location, message } => {
                assert_eq!(location, "<input>:1");
                assert!(message.contains("not-a-date"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_syntax_error() {
        let err = SimpleDatasetParser::parse("[{", DatasetFormat::Json).unwrap_err();
        assert!(matches!(err, ParseError::SyntaxError { .. }));
    }

    #[test]
    fn test_parse_empty_content() {
        assert!(SimpleDatasetParser::parse("", DatasetFormat::Json).unwrap().is_empty());
        assert!(SimpleDatasetParser::parse("  \n", DatasetFormat::Yaml).unwrap().is_empty());
    }
}
