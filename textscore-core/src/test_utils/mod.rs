pub mod helpers;
pub mod memory_repo;

pub use memory_repo::MemoryTextAnalysisRepository;
