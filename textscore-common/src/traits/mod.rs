pub mod repository_traits;
pub mod scorer;

pub use repository_traits::TextAnalysisRepo;
pub use scorer::TextScorer;
