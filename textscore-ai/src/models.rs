use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use textscore_common::Error;

pub const DEFAULT_TOXICITY_MODEL: &str = "s-nlp/roberta_toxicity_classifier";
pub const DEFAULT_GIBBERISH_MODEL: &str = "wajidlinux99/gibberish-text-detector";
pub const DEFAULT_REVISION: &str = "main";
pub const DEFAULT_MAX_TOKENS: usize = 512;
pub const TOXIC_LABEL: &str = "toxic";
pub const CLEAN_LABEL: &str = "clean";

/// Where a classifier comes from and how its output is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    /// Hub repository id (`org/name`) or a local directory holding the same files.
    pub model_id: String,

    /// Hub revision; ignored for local directories.
    pub revision: String,

    /// Inputs are truncated to this many tokens, special tokens included.
    pub max_tokens: usize,

    /// Name of the label whose probability is reported, matched against
    /// `id2label` case-insensitively.
    pub positive_label: Option<String>,

    /// Used when the checkpoint has no usable `id2label`.
    pub positive_index: usize,
}

impl ModelSpec {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            revision: DEFAULT_REVISION.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            positive_label: None,
            positive_index: 1,
        }
    }

    pub fn toxicity() -> Self {
        Self::new(DEFAULT_TOXICITY_MODEL).with_positive_label(TOXIC_LABEL)
    }

    /// Reports the mass of the clean-text class.
    pub fn gibberish() -> Self {
        Self::new(DEFAULT_GIBBERISH_MODEL).with_positive_label(CLEAN_LABEL)
    }

    pub fn with_positive_label(mut self, label: impl Into<String>) -> Self {
        self.positive_label = Some(label.into());
        self
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// The handful of `config.json` fields needed before picking a backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelHeader {
    pub model_type: String,

    #[serde(default)]
    pub id2label: HashMap<String, String>,

    /// BERT and RoBERTa style width.
    #[serde(default)]
    pub hidden_size: Option<usize>,

    /// DistilBERT style width.
    #[serde(default)]
    pub dim: Option<usize>,
}

impl ModelHeader {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Number of output logits; checkpoints without `id2label` are binary.
    pub fn num_labels(&self) -> usize {
        if self.id2label.is_empty() { 2 } else { self.id2label.len() }
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.id2label.get(&index.to_string()).map(String::as_str)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.id2label
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(label))
            .and_then(|(idx, _)| idx.parse().ok())
    }

    /// True when `id2label` only holds transformers' placeholder `LABEL_<n>` names.
    fn has_placeholder_labels(&self) -> bool {
        self.id2label.values().all(|name| {
            name.strip_prefix("LABEL_")
                .is_some_and(|n| n.parse::<usize>().is_ok())
        })
    }

    /// Index of the class whose probability `spec` asks for.
    ///
    /// A named label must exist in `id2label`; the numeric fallback is used only
    /// when the checkpoint carries no real label names.
    pub fn positive_index(&self, spec: &ModelSpec) -> Result<usize, Error> {
        let index = match spec.positive_label.as_deref() {
            Some(label) if !self.has_placeholder_labels() => {
                self.index_of(label).ok_or_else(|| {
                    let mut known: Vec<&str> = self.id2label.values().map(String::as_str).collect();
                    known.sort_unstable();
                    Error::Config(format!(
                        "{}: no label '{}' in id2label (labels: {})",
                        spec.model_id, label, known.join(", ")
                    ))
                })?
            }
            _ => spec.positive_index,
        };

        if index >= self.num_labels() {
            return Err(Error::Config(format!(
                "{}: positive index {} but the model has {} labels",
                spec.model_id, index, self.num_labels()
            )));
        }
        Ok(index)
    }

    pub fn width(&self) -> Result<usize, Error> {
        self.hidden_size
            .or(self.dim)
            .ok_or_else(|| Error::Inference(format!(
                "config.json for model_type '{}' has neither hidden_size nor dim",
                self.model_type
            )))
    }
}

/// Inserts `defaults` into a `config.json` object where the key is absent.
/// Older checkpoints omit fields that candle's config structs require.
pub fn fill_defaults(config: &mut Value, defaults: &[(&str, Value)]) {
    if let Some(obj) = config.as_object_mut() {
        for (key, value) in defaults {
            obj.entry(key.to_string()).or_insert_with(|| value.clone());
        }
    }
}
