use tokenizers::decoders::byte_level::ByteLevel as ByteLevelDecoder;
use tokenizers::decoders::wordpiece::WordPiece as WordPieceDecoder;
use tokenizers::decoders::DecoderWrapper;
use tokenizers::models::bpe::BPE;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::models::ModelWrapper;
use tokenizers::normalizers::bert::BertNormalizer;
use tokenizers::normalizers::NormalizerWrapper;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::pre_tokenizers::byte_level::ByteLevel;
use tokenizers::pre_tokenizers::PreTokenizerWrapper;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::processors::roberta::RobertaProcessing;
use tokenizers::processors::PostProcessorWrapper;
use tokenizers::{Model, Tokenizer, TokenizerBuilder, TruncationParams};

use textscore_common::Error;
use crate::hub::TokenizerFiles;

type Builder = TokenizerBuilder<
    ModelWrapper,
    NormalizerWrapper,
    PreTokenizerWrapper,
    PostProcessorWrapper,
    DecoderWrapper,
>;

fn tok_err(e: impl std::fmt::Display) -> Error {
    Error::Tokenizer(e.to_string())
}

/// Loads the tokenizer and configures it to truncate to `max_tokens` without padding.
pub fn load(files: &TokenizerFiles, max_tokens: usize) -> Result<Tokenizer, Error> {
    let mut tokenizer = match files {
        TokenizerFiles::Json(path) => Tokenizer::from_file(path).map_err(tok_err)?,
        TokenizerFiles::ByteLevelBpe { vocab, merges } => {
            byte_level_bpe(path_str(vocab)?, path_str(merges)?)?
        }
        TokenizerFiles::WordPiece { vocab, lowercase } => {
            wordpiece(path_str(vocab)?, *lowercase)?
        }
    };

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_tokens,
            ..Default::default()
        }))
        .map_err(tok_err)?;
    tokenizer.with_padding(None);
    Ok(tokenizer)
}

/// Token ids for `text`, special tokens included.
pub fn encode_ids(tokenizer: &Tokenizer, text: &str) -> Result<Vec<u32>, Error> {
    let encoding = tokenizer.encode(text, true).map_err(tok_err)?;
    let ids = encoding.get_ids().to_vec();
    if ids.is_empty() {
        return Err(Error::Inference("input encoded to zero tokens".into()));
    }
    Ok(ids)
}

fn path_str(path: &std::path::Path) -> Result<&str, Error> {
    path.to_str()
        .ok_or_else(|| Error::Tokenizer(format!("non UTF-8 path {}", path.display())))
}

fn special_id(model: &impl Model, token: &str) -> Result<u32, Error> {
    model
        .token_to_id(token)
        .ok_or_else(|| Error::Tokenizer(format!("vocabulary has no '{}' token", token)))
}

/// RoBERTa-style tokenizer from `vocab.json` + `merges.txt`.
fn byte_level_bpe(vocab: &str, merges: &str) -> Result<Tokenizer, Error> {
    let bpe = BPE::from_file(vocab, merges).build().map_err(tok_err)?;
    let cls = special_id(&bpe, "<s>")?;
    let sep = special_id(&bpe, "</s>")?;

    let built = Builder::new()
        .with_model(bpe.into())
        .with_normalizer(None)
        .with_pre_tokenizer(Some(ByteLevel::default().add_prefix_space(false).into()))
        .with_post_processor(Some(
            RobertaProcessing::new(("</s>".to_string(), sep), ("<s>".to_string(), cls))
                .add_prefix_space(false)
                .into(),
        ))
        .with_decoder(Some(ByteLevelDecoder::default().into()))
        .build()
        .map_err(tok_err)?;
    Ok(Tokenizer::from(built))
}

/// BERT-style tokenizer from `vocab.txt`.
fn wordpiece(vocab: &str, lowercase: bool) -> Result<Tokenizer, Error> {
    let wp = WordPiece::from_file(vocab).build().map_err(tok_err)?;
    let cls = special_id(&wp, "[CLS]")?;
    let sep = special_id(&wp, "[SEP]")?;

    let built = Builder::new()
        .with_model(wp.into())
        .with_normalizer(Some(BertNormalizer::new(true, true, None, lowercase).into()))
        .with_pre_tokenizer(Some(BertPreTokenizer.into()))
        .with_post_processor(Some(
            BertProcessing::new(("[SEP]".to_string(), sep), ("[CLS]".to_string(), cls)).into(),
        ))
        .with_decoder(Some(WordPieceDecoder::default().into()))
        .build()
        .map_err(tok_err)?;
    Ok(Tokenizer::from(built))
}
