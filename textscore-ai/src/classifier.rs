use std::time::Instant;

use candle_core::{DType, Device, IndexOp, Module, Tensor, D};
use candle_nn::{linear, Linear, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use candle_transformers::models::xlm_roberta::{
    Config as RobertaConfig, XLMRobertaForSequenceClassification,
};
use serde_json::{json, Value};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use textscore_common::Error;
use crate::hub::{self, ModelFiles, WeightsFile};
use crate::models::{fill_defaults, ModelHeader, ModelSpec};
use crate::tokenizer;

/// Softmax over the last dimension of a `[1, num_labels]` logits tensor,
/// returning the probability of class `index`.
pub fn class_probability(logits: &Tensor, index: usize) -> Result<f64, Error> {
    let probs = candle_nn::ops::softmax(&logits.to_dtype(DType::F32)?, D::Minus1)?;
    let probs = probs.squeeze(0)?.to_vec1::<f32>()?;
    probs
        .get(index)
        .map(|p| f64::from(*p))
        .ok_or_else(|| Error::Inference(format!(
            "label index {} out of range for {} logits", index, probs.len()
        )))
}

enum Backend {
    Roberta(XLMRobertaForSequenceClassification),
    Bert {
        model: BertModel,
        pooler: Linear,
        classifier: Linear,
    },
    DistilBert {
        model: DistilBertModel,
        pre_classifier: Linear,
        classifier: Linear,
    },
}

impl Backend {
    fn load(header: &ModelHeader, raw_config: &str, vb: VarBuilder) -> Result<Self, Error> {
        let mut config: Value = serde_json::from_str(raw_config)?;
        let num_labels = header.num_labels();

        match header.model_type.as_str() {
            "roberta" | "xlm-roberta" => {
                fill_defaults(&mut config, &[
                    ("position_embedding_type", json!("absolute")),
                    ("type_vocab_size", json!(1)),
                    ("pad_token_id", json!(1)),
                    ("layer_norm_eps", json!(1e-5)),
                    ("hidden_dropout_prob", json!(0.1)),
                    ("attention_probs_dropout_prob", json!(0.1)),
                ]);
                let cfg: RobertaConfig = serde_json::from_value(config)?;
                let model = XLMRobertaForSequenceClassification::new(num_labels, &cfg, vb)?;
                Ok(Backend::Roberta(model))
            }
            "bert" => {
                fill_defaults(&mut config, &[
                    ("position_embedding_type", json!("absolute")),
                    ("type_vocab_size", json!(2)),
                    ("pad_token_id", json!(0)),
                    ("layer_norm_eps", json!(1e-12)),
                ]);
                let cfg: BertConfig = serde_json::from_value(config)?;
                let width = header.width()?;
                let model = BertModel::load(vb.pp("bert"), &cfg)?;
                let pooler = linear(width, width, vb.pp("bert").pp("pooler").pp("dense"))?;
                let classifier = linear(width, num_labels, vb.pp("classifier"))?;
                Ok(Backend::Bert { model, pooler, classifier })
            }
            "distilbert" => {
                let cfg: DistilBertConfig = serde_json::from_value(config)?;
                let width = header.width()?;
                let model = DistilBertModel::load(vb.pp("distilbert"), &cfg)?;
                let pre_classifier = linear(width, width, vb.pp("pre_classifier"))?;
                let classifier = linear(width, num_labels, vb.pp("classifier"))?;
                Ok(Backend::DistilBert { model, pre_classifier, classifier })
            }
            other => Err(Error::Inference(format!("unsupported model_type '{}'", other))),
        }
    }

    /// Logits of shape `[1, num_labels]` for one unpadded sequence.
    fn logits(&self, ids: &[u32], device: &Device) -> Result<Tensor, Error> {
        let input_ids = Tensor::new(ids, device)?.unsqueeze(0)?;
        let seq_len = ids.len();

        let logits = match self {
            Backend::Roberta(model) => {
                let attention_mask = Tensor::ones((1, seq_len), DType::U32, device)?;
                let token_type_ids = Tensor::zeros((1, seq_len), DType::U32, device)?;
                model.forward(&input_ids, &attention_mask, &token_type_ids)?
            }
            Backend::Bert { model, pooler, classifier } => {
                let attention_mask = Tensor::ones((1, seq_len), DType::U32, device)?;
                let token_type_ids = Tensor::zeros((1, seq_len), DType::U32, device)?;
                let hidden = model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
                let cls = hidden.i((.., 0))?;
                let pooled = pooler.forward(&cls)?.tanh()?;
                classifier.forward(&pooled)?
            }
            Backend::DistilBert { model, pre_classifier, classifier } => {
                // 1 marks a masked position; nothing is masked in a single unpadded sequence.
                let mask = Tensor::zeros((seq_len, seq_len), DType::U8, device)?;
                let hidden = model.forward(&input_ids, &mask)?;
                let cls = hidden.i((.., 0))?;
                let pooled = pre_classifier.forward(&cls)?.relu()?;
                classifier.forward(&pooled)?
            }
        };
        Ok(logits)
    }
}

/// A pretrained sequence classifier with its tokenizer, loaded once and read-only after.
pub struct TextClassifier {
    name: String,
    backend: Backend,
    tokenizer: Tokenizer,
    device: Device,
    positive_index: usize,
}

impl TextClassifier {
    /// Resolves the model files for `spec` (downloading on first use) and loads them.
    pub fn load(spec: &ModelSpec, device: &Device) -> Result<Self, Error> {
        let files = hub::resolve(spec)?;
        Self::from_files(spec, &files, device)
    }

    pub fn from_files(spec: &ModelSpec, files: &ModelFiles, device: &Device) -> Result<Self, Error> {
        let started = Instant::now();
        let raw_config = std::fs::read_to_string(&files.config)?;
        let header = ModelHeader::parse(&raw_config)?;

        let positive_index = header.positive_index(spec)?;

        let vb = match &files.weights {
            WeightsFile::Safetensors(path) => unsafe {
                VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device)?
            },
            WeightsFile::Pytorch(path) => VarBuilder::from_pth(path, DType::F32, device)?,
        };

        let backend = Backend::load(&header, &raw_config, vb)?;
        let tokenizer = tokenizer::load(&files.tokenizer, spec.max_tokens)?;

        info!(
            "Loaded classifier '{}' (model_type={}, labels={}, positive={:?}) in {:?}",
            spec.model_id,
            header.model_type,
            header.num_labels(),
            header.label(positive_index).unwrap_or("?"),
            started.elapsed()
        );

        Ok(Self {
            name: spec.model_id.clone(),
            backend,
            tokenizer,
            device: device.clone(),
            positive_index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Probability of the configured positive label for `text`.
    pub fn probability(&self, text: &str) -> Result<f64, Error> {
        let ids = tokenizer::encode_ids(&self.tokenizer, text)?;
        let logits = self.backend.logits(&ids, &self.device)?;
        let p = class_probability(&logits, self.positive_index)?;
        debug!("{}: {} tokens => p={:.4}", self.name, ids.len(), p);
        Ok(p)
    }
}
