use candle_core::Device;
use tracing::info;

use textscore_common::traits::TextScorer;
use textscore_common::Error;

use crate::classifier::TextClassifier;
use crate::models::ModelSpec;

/// The two pretrained classifiers behind the analysis endpoint.
pub struct InferenceService {
    toxicity: TextClassifier,
    gibberish: TextClassifier,
}

impl InferenceService {
    /// Loads both models. Blocking: downloads on first run, then reads from the hub cache.
    pub fn load(toxicity: &ModelSpec, gibberish: &ModelSpec) -> Result<Self, Error> {
        let device = Device::cuda_if_available(0)?;
        info!("Loading classifiers on {:?}", device);

        let toxicity = TextClassifier::load(toxicity, &device)?;
        let gibberish = TextClassifier::load(gibberish, &device)?;
        info!("Classifiers ready: toxicity='{}', gibberish='{}'", toxicity.name(), gibberish.name());
        Ok(Self::new(toxicity, gibberish))
    }

    pub fn new(toxicity: TextClassifier, gibberish: TextClassifier) -> Self {
        Self { toxicity, gibberish }
    }
}

impl TextScorer for InferenceService {
    fn score_toxicity(&self, text: &str) -> Result<f64, Error> {
        self.toxicity.probability(text)
    }

    fn score_gibberish(&self, text: &str) -> Result<f64, Error> {
        self.gibberish.probability(text)
    }
}
