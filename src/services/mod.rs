//! Services module.

pub mod normalizer;
pub mod orchestrator;
pub mod validator;

pub use normalizer::parse_candidates;
pub use orchestrator::RecognitionOrchestrator;
pub use validator::{InputValidator, RecognizeOptions};
