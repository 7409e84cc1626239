//! Resolves the files of a pretrained classifier, either from a local directory
//! or from the Hugging Face hub cache.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use hf_hub::api::sync::{ApiBuilder, ApiRepo};
use hf_hub::{Repo, RepoType};
use tracing::{debug, info};

use textscore_common::Error;
use crate::models::ModelSpec;

/// Checkpoint weights, in the formats candle can read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightsFile {
    Safetensors(PathBuf),
    Pytorch(PathBuf),
}

/// Tokenizer definition. Older checkpoints ship only the raw vocabulary files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizerFiles {
    Json(PathBuf),
    ByteLevelBpe { vocab: PathBuf, merges: PathBuf },
    WordPiece { vocab: PathBuf, lowercase: bool },
}

#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub weights: WeightsFile,
    pub tokenizer: TokenizerFiles,
}

enum ModelSource {
    Local(PathBuf),
    /// A hub repo plus the file names its listing reported.
    Hub { repo: ApiRepo, files: HashSet<String> },
}

impl ModelSource {
    fn open(spec: &ModelSpec) -> Result<Self, Error> {
        let local = Path::new(&spec.model_id);
        if local.is_dir() {
            debug!("Reading model files from local directory {}", local.display());
            return Ok(ModelSource::Local(local.to_path_buf()));
        }

        let api = ApiBuilder::new().with_progress(false).build()?;
        let repo = api.repo(Repo::with_revision(
            spec.model_id.clone(),
            RepoType::Model,
            spec.revision.clone(),
        ));
        let files = repo
            .info()?
            .siblings
            .into_iter()
            .map(|s| s.rfilename)
            .collect();
        Ok(ModelSource::Hub { repo, files })
    }

    fn describe(&self) -> String {
        match self {
            ModelSource::Local(dir) => dir.display().to_string(),
            ModelSource::Hub { repo, .. } => repo.url(""),
        }
    }

    /// `Ok(None)` only when the file is absent; failures reading a file that
    /// does exist are returned as errors.
    fn get(&self, name: &str) -> Result<Option<PathBuf>, Error> {
        match self {
            ModelSource::Local(dir) => {
                let path = dir.join(name);
                if !path.exists() {
                    return Ok(None);
                }
                if !path.is_file() {
                    return Err(Error::ModelHub(format!("{} is not a regular file", path.display())));
                }
                Ok(Some(path))
            }
            ModelSource::Hub { repo, files } => {
                if !files.contains(name) {
                    return Ok(None);
                }
                Ok(Some(repo.get(name)?))
            }
        }
    }

    fn require(&self, name: &str) -> Result<PathBuf, Error> {
        self.get(name)?
            .ok_or_else(|| Error::ModelHub(format!("{} not found in {}", name, self.describe())))
    }

    /// The first of `names` that exists, with its position in `names`.
    fn first_of(&self, names: &[&str]) -> Result<(usize, PathBuf), Error> {
        for (idx, name) in names.iter().enumerate() {
            match self.get(name)? {
                Some(path) => return Ok((idx, path)),
                None => debug!("{} not present", name),
            }
        }
        Err(Error::ModelHub(format!(
            "none of {} found in {}",
            names.join(", "),
            self.describe()
        )))
    }
}

/// Fetches (or locates) config, weights and tokenizer for `spec`.
pub fn resolve(spec: &ModelSpec) -> Result<ModelFiles, Error> {
    let source = ModelSource::open(spec)?;

    let config = source.require("config.json")?;

    let weights = match source.first_of(&["model.safetensors", "pytorch_model.bin"])? {
        (0, path) => WeightsFile::Safetensors(path),
        (_, path) => WeightsFile::Pytorch(path),
    };

    let tokenizer = resolve_tokenizer(&source)?;

    info!("Resolved model files for '{}' ({:?})", spec.model_id, weights);
    Ok(ModelFiles { config, weights, tokenizer })
}

fn resolve_tokenizer(source: &ModelSource) -> Result<TokenizerFiles, Error> {
    if let Some(path) = source.get("tokenizer.json")? {
        return Ok(TokenizerFiles::Json(path));
    }

    if let Some(vocab) = source.get("vocab.json")? {
        let merges = source.require("merges.txt")?;
        return Ok(TokenizerFiles::ByteLevelBpe { vocab, merges });
    }

    let vocab = source.require("vocab.txt")?;
    let lowercase = match source.get("tokenizer_config.json")? {
        Some(path) => lowercase_from_tokenizer_config(&std::fs::read_to_string(path)?),
        None => true,
    };
    Ok(TokenizerFiles::WordPiece { vocab, lowercase })
}

fn lowercase_from_tokenizer_config(raw: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(|v| v.get("do_lower_case").and_then(|b| b.as_bool()))
        .unwrap_or(true)
}
