// src/repositories/mod.rs

pub mod postgres;

pub use postgres::PostgresTextAnalysisRepository;
pub use textscore_common::traits::TextAnalysisRepo;
