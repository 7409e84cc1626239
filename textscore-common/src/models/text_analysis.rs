use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::Error;

/// Width of the `input_text` column.
pub const MAX_INPUT_CHARS: usize = 1000;

pub const DEFAULT_PAGE_LIMIT: i64 = 100;
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// One persisted analysis, as stored in `text_analyses` and returned to clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TextAnalysis {
    pub id: i64,
    pub input_text: String,
    pub toxicity_score: f64,
    pub gibberish_score: f64,
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /analyze/`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextAnalysisCreate {
    pub input_text: String,
}

impl TextAnalysisCreate {
    pub fn validate(&self) -> Result<(), Error> {
        let len = self.input_text.chars().count();
        if len > MAX_INPUT_CHARS {
            return Err(Error::Validation(format!(
                "input_text is {} characters; at most {} are allowed",
                len, MAX_INPUT_CHARS
            )));
        }
        Ok(())
    }
}

/// Insert payload. Both scores are required, so a row is never written half-scored.
#[derive(Clone, Debug, PartialEq)]
pub struct NewTextAnalysis {
    pub input_text: String,
    pub toxicity_score: f64,
    pub gibberish_score: f64,
}

impl NewTextAnalysis {
    pub fn new(input_text: impl Into<String>, toxicity_score: f64, gibberish_score: f64) -> Self {
        Self {
            input_text: input_text.into(),
            toxicity_score,
            gibberish_score,
        }
    }
}

/// A validated `skip`/`limit` window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, limit: DEFAULT_PAGE_LIMIT }
    }
}

impl Page {
    /// Applies defaults for missing values and rejects negative or oversized windows.
    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Result<Self, Error> {
        let skip = skip.unwrap_or(0);
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);

        if skip < 0 {
            return Err(Error::Validation(format!("skip must be >= 0, got {}", skip)));
        }
        if !(0..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(Error::Validation(format!(
                "limit must be between 0 and {}, got {}",
                MAX_PAGE_LIMIT, limit
            )));
        }
        Ok(Self { skip, limit })
    }
}
