use std::sync::Arc;

use tracing::{debug, info};

use textscore_common::models::{NewTextAnalysis, Page, TextAnalysis, TextAnalysisCreate};
use textscore_common::traits::{TextAnalysisRepo, TextScorer};
use crate::Error;

/// Scores submitted text and records the result.
pub struct AnalysisService {
    scorer: Arc<dyn TextScorer>,
    repo: Arc<dyn TextAnalysisRepo>,
}

impl AnalysisService {
    pub fn new(scorer: Arc<dyn TextScorer>, repo: Arc<dyn TextAnalysisRepo>) -> Self {
        Self { scorer, repo }
    }

    /// Runs both classifiers, then inserts one fully scored record.
    pub async fn analyze(&self, request: TextAnalysisCreate) -> Result<TextAnalysis, Error> {
        request.validate()?;

        let scorer = self.scorer.clone();
        let text = request.input_text.clone();
        let (toxicity_score, gibberish_score) = tokio::task::spawn_blocking(move || {
            let toxicity = scorer.score_toxicity(&text)?;
            let gibberish = scorer.score_gibberish(&text)?;
            Ok::<_, Error>((toxicity, gibberish))
        })
        .await??;

        check_probability("toxicity", toxicity_score)?;
        check_probability("gibberish", gibberish_score)?;
        debug!("scored {} chars: toxicity={:.4} gibberish={:.4}",
               request.input_text.chars().count(), toxicity_score, gibberish_score);

        let new = NewTextAnalysis::new(request.input_text, toxicity_score, gibberish_score);
        let saved = self.repo.create_analysis(&new).await?;
        info!("Stored analysis id={} toxicity={:.4} gibberish={:.4}",
              saved.id, saved.toxicity_score, saved.gibberish_score);
        Ok(saved)
    }

    pub async fn list(&self, page: Page) -> Result<Vec<TextAnalysis>, Error> {
        self.repo.list_analyses(page).await
    }
}

fn check_probability(which: &str, value: f64) -> Result<(), Error> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::Inference(format!("{} score {} is outside [0, 1]", which, value)))
    }
}
