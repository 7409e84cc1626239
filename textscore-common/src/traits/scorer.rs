use crate::error::Error;

/// Scores text with the two classifiers. Calls are CPU-bound and blocking;
/// async callers should run them on the blocking pool.
pub trait TextScorer: Send + Sync {
    /// Probability in [0, 1] that the text is toxic.
    fn score_toxicity(&self, text: &str) -> Result<f64, Error>;

    /// Probability in [0, 1] that the text is coherent, i.e. not gibberish.
    fn score_gibberish(&self, text: &str) -> Result<f64, Error>;
}
