//! Help center content and the support contact form

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Contact form submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl SupportRequest {
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("name is required"));
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(CoreError::validation("a valid email address is required"));
        }
        if self.message.trim().is_empty() {
            return Err(CoreError::validation("message is required"));
        }
        Ok(())
    }

    /// Subject line, falling back to a generic one
    pub fn subject_line(&self) -> &str {
        match self.subject.trim() {
            "" => "General question",
            s => s,
        }
    }
}

/// Frequently asked question
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const FAQ: &[FaqEntry] = &[
    FaqEntry {
        question: "Where does my data come from?",
        answer: "Transactions are read from the dataset files in the configured data directory when the server starts. Without any, a demo dataset is shown.",
    },
    FaqEntry {
        question: "Why do new transactions disappear after a restart?",
        answer: "Transactions added through the form are kept in memory only. Add them to a dataset file to keep them.",
    },
    FaqEntry {
        question: "How are transfers counted?",
        answer: "Transfers move money between your own accounts, so they appear in the list but never in income, expense or net totals.",
    },
    FaqEntry {
        question: "Which export formats can I download?",
        answer: "CSV reports can be downloaded directly. PDF and Excel reports are listed in the history with their size estimate.",
    },
    FaqEntry {
        question: "How does the date filter work?",
        answer: "Preset ranges include everything from their start date onwards. A custom range includes both the start and the end date.",
    },
];

/// FAQ entries whose question or answer contains `query` (case-insensitive)
pub fn search_faq(query: &str) -> Vec<FaqEntry> {
    let needle = query.trim().to_lowercase();
    FAQ.iter()
        .filter(|f| {
            needle.is_empty()
                || f.question.to_lowercase().contains(&needle)
                || f.answer.to_lowercase().contains(&needle)
        })
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SupportRequest {
        SupportRequest {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            subject: String::new(),
            message: "Export is stuck".to_string(),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
        assert_eq!(request().subject_line(), "General question");
    }

    #[test]
    fn test_invalid_requests() {
        let mut r = request();
        r.name = "  ".to_string();
        assert!(r.validate().unwrap_err().to_string().contains("name"));

        let mut r = request();
        r.email = "sam.example.com".to_string();
        assert!(r.validate().unwrap_err().to_string().contains("email"));

        let mut r = request();
        r.message.clear();
        assert!(r.validate().unwrap_err().to_string().contains("message"));
    }

    #[test]
    fn test_search_faq() {
        assert_eq!(search_faq("").len(), FAQ.len());
        let hits = search_faq("TRANSFERS");
        assert_eq!(hits.len(), 1);
        assert!(search_faq("zzz").is_empty());
    }
}
