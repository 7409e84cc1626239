use tracing::debug;

use textscore_common::traits::TextScorer;
use textscore_common::Error;

const TOXIC_WORDS: &[&str] = &[
    "idiot", "stupid", "hate", "dumb", "moron", "kill", "loser", "ugly",
    "trash", "pathetic", "disgusting", "shut",
];

const COMMON_WORDS: &[&str] = &[
    "a", "an", "and", "are", "be", "do", "for", "good", "he", "hello", "hi", "i",
    "in", "is", "it", "love", "me", "my", "no", "not", "of", "on", "or", "she",
    "so", "that", "the", "they", "this", "to", "was", "we", "yes", "you", "your",
];

const FLOOR: f64 = 0.02;
const SPAN: f64 = 0.96;

/// Deterministic stand-in for the two classifiers. Needs no model download,
/// so it backs `--stub-models` and the test suites.
#[derive(Clone, Debug, Default)]
pub struct StubScorer;

impl StubScorer {
    pub fn new() -> Self {
        Self
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Rough English word shape: some vowels, no long vowel or consonant runs.
fn looks_like_a_word(word: &str) -> bool {
    if COMMON_WORDS.contains(&word) {
        return true;
    }
    if !word.chars().all(|c| c.is_ascii_alphabetic()) || word.len() > 20 {
        return false;
    }

    let vowels = word.chars().filter(|c| is_vowel(*c)).count();
    let ratio = vowels as f64 / word.len() as f64;
    if !(0.2..=0.6).contains(&ratio) {
        return false;
    }

    let mut run = 0;
    let mut prev_vowel = None;
    for c in word.chars() {
        let v = is_vowel(c);
        run = if prev_vowel == Some(v) { run + 1 } else { 1 };
        prev_vowel = Some(v);
        if run > 2 {
            return false;
        }
    }
    true
}

impl TextScorer for StubScorer {
    fn score_toxicity(&self, text: &str) -> Result<f64, Error> {
        let words = words(text);
        if words.is_empty() {
            return Ok(FLOOR);
        }
        let hits = words.iter().filter(|w| TOXIC_WORDS.contains(&w.as_str())).count();
        let rate = (3.0 * hits as f64 / words.len() as f64).min(1.0);
        let score = FLOOR + SPAN * rate;
        debug!("stub toxicity: {} hits / {} words => {:.3}", hits, words.len(), score);
        Ok(score)
    }

    fn score_gibberish(&self, text: &str) -> Result<f64, Error> {
        let words = words(text);
        if words.is_empty() {
            return Ok(0.5);
        }
        let plausible = words.iter().filter(|w| looks_like_a_word(w)).count();
        let score = FLOOR + SPAN * plausible as f64 / words.len() as f64;
        debug!("stub clean-text: {} / {} words => {:.3}", plausible, words.len(), score);
        Ok(score)
    }
}
