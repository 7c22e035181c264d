//! Recent search terms, persisted to the local state file

use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{CoreError, CoreResult};

/// Key the list is stored under in the state file
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";

/// Most-recent-first list of distinct search terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentSearches {
    terms: Vec<String>,
    capacity: usize,
}

impl RecentSearches {
    pub fn new(capacity: usize) -> Self {
        Self {
            terms: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Build from stored terms, keeping the cap and dropping blanks
    pub fn with_terms<I, S>(capacity: usize, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new(capacity);
        for term in terms {
            let term = term.into();
            let term = term.trim();
            if !term.is_empty() && !list.terms.iter().any(|t| t == term) && list.terms.len() < list.capacity {
                list.terms.push(term.to_string());
            }
        }
        list
    }

    /// Move `term` to the front. Blank terms are ignored; returns whether the
    /// list changed.
    pub fn record(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }
        if self.terms.first().map(String::as_str) == Some(term) {
            return false;
        }
        self.terms.retain(|t| t != term);
        self.terms.insert(0, term.to_string());
        self.terms.truncate(self.capacity);
        true
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Load from the state file. A missing file yields an empty list.
    pub async fn load(path: &Path, capacity: usize) -> CoreResult<Self> {
        let state = match read_state(path).await? {
            Some(state) => state,
            None => return Ok(Self::new(capacity)),
        };

        match state.get(RECENT_SEARCHES_KEY) {
            None | Some(Value::Null) => Ok(Self::new(capacity)),
            Some(Value::Array(items)) => {
                let terms = items
                    .iter()
                    .map(|v| {
                        v.as_str().map(str::to_string).ok_or_else(|| CoreError::InvalidFormat {
                            message: format!("{}: '{}' must hold strings", path.display(), RECENT_SEARCHES_KEY),
                        })
                    })
                    .collect::<CoreResult<Vec<_>>>()?;
                Ok(Self::with_terms(capacity, terms))
            }
            Some(_) => Err(CoreError::InvalidFormat {
                message: format!("{}: '{}' must be a list", path.display(), RECENT_SEARCHES_KEY),
            }),
        }
    }

    /// Write the list into the state file, keeping any other keys
    pub async fn save(&self, path: &Path) -> CoreResult<()> {
        // an unreadable file is replaced rather than blocking the save
        let mut state = read_state(path).await.ok().flatten().unwrap_or_default();
        state.insert(
            RECENT_SEARCHES_KEY.to_string(),
            Value::Array(self.terms.iter().cloned().map(Value::String).collect()),
        );

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_string_pretty(&Value::Object(state)).map_err(|e| CoreError::InternalError {
            message: e.to_string(),
        })?;
        tokio::fs::write(path, body).await?;
        Ok(())
    }
}

async fn read_state(path: &Path) -> CoreResult<Option<Map<String, Value>>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if content.trim().is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Err(CoreError::InvalidFormat {
            message: format!("{}: state file must be a JSON object", path.display()),
        }),
        Err(e) => Err(CoreError::InvalidFormat {
            message: format!("{}: {}", path.display(), e),
        }),
    }
}
