// src/repositories/postgres/text_analysis.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use textscore_common::models::{NewTextAnalysis, Page, TextAnalysis};
use textscore_common::traits::TextAnalysisRepo;
use crate::Error;

#[derive(Clone)]
pub struct PostgresTextAnalysisRepository {
    pool: Pool<Postgres>,
}

impl PostgresTextAnalysisRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TextAnalysisRepo for PostgresTextAnalysisRepository {
    async fn create_analysis(&self, analysis: &NewTextAnalysis) -> Result<TextAnalysis, Error> {
        // Connection goes back to the pool when `conn` drops, on success or error.
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query_as::<_, TextAnalysis>(
            r#"
            INSERT INTO text_analyses (
                input_text,
                toxicity_score,
                gibberish_score
            )
            VALUES ($1, $2, $3)
            RETURNING id,
                      input_text,
                      toxicity_score,
                      gibberish_score,
                      created_at
            "#
        )
            .bind(&analysis.input_text)
            .bind(analysis.toxicity_score)
            .bind(analysis.gibberish_score)
            .fetch_one(&mut *conn)
            .await?;

        Ok(row)
    }

    async fn list_analyses(&self, page: Page) -> Result<Vec<TextAnalysis>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, TextAnalysis>(
            r#"
            SELECT id,
                   input_text,
                   toxicity_score,
                   gibberish_score,
                   created_at
            FROM text_analyses
            ORDER BY id ASC
            OFFSET $1
            LIMIT $2
            "#
        )
            .bind(page.skip)
            .bind(page.limit)
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows)
    }
}
