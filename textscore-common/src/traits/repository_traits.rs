use async_trait::async_trait;
use crate::error::Error;
use crate::models::{NewTextAnalysis, Page, TextAnalysis};

/// Persistence for analysis records. Records are only ever inserted and read.
#[async_trait]
pub trait TextAnalysisRepo: Send + Sync {
    /// Inserts one record and returns it with the server-assigned `id` and `created_at`.
    async fn create_analysis(&self, analysis: &NewTextAnalysis) -> Result<TextAnalysis, Error>;

    /// Returns at most `page.limit` records after skipping `page.skip`, in insertion order.
    async fn list_analyses(&self, page: Page) -> Result<Vec<TextAnalysis>, Error>;
}
