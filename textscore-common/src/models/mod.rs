// File: textscore-common/src/models/mod.rs
pub mod text_analysis;

pub use text_analysis::{
    NewTextAnalysis, Page, TextAnalysis, TextAnalysisCreate,
    DEFAULT_PAGE_LIMIT, MAX_INPUT_CHARS, MAX_PAGE_LIMIT,
};
