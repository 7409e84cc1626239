use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use textscore_common::models::{NewTextAnalysis, Page, TextAnalysis};
use textscore_common::traits::TextAnalysisRepo;
use crate::Error;

/// In-process stand-in for the Postgres repository, with the same id and
/// timestamp assignment rules.
#[derive(Default)]
pub struct MemoryTextAnalysisRepository {
    rows: Mutex<Vec<TextAnalysis>>,
}

impl MemoryTextAnalysisRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

#[async_trait]
impl TextAnalysisRepo for MemoryTextAnalysisRepository {
    async fn create_analysis(&self, analysis: &NewTextAnalysis) -> Result<TextAnalysis, Error> {
        let mut rows = self.rows.lock().await;
        let id = rows.last().map(|r| r.id + 1).unwrap_or(1);
        let row = TextAnalysis {
            id,
            input_text: analysis.input_text.clone(),
            toxicity_score: analysis.toxicity_score,
            gibberish_score: analysis.gibberish_score,
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn list_analyses(&self, page: Page) -> Result<Vec<TextAnalysis>, Error> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .skip(page.skip.max(0) as usize)
            .take(page.limit.max(0) as usize)
            .cloned()
            .collect())
    }
}
