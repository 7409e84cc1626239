// src/repositories/postgres/mod.rs

pub mod text_analysis;

pub use text_analysis::PostgresTextAnalysisRepository;
