pub mod inference_service;
pub mod scorer_stub;
