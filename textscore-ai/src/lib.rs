pub mod classifier;
pub mod hub;
pub mod models;
pub mod services;
pub mod tokenizer;

// Re-export public APIs
pub use classifier::{class_probability, TextClassifier};
pub use models::{ModelHeader, ModelSpec};
pub use services::inference_service::InferenceService;
pub use services::scorer_stub::StubScorer;
