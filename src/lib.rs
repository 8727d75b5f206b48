//! Wine Recognition Service - Library Entry Point
//!
//! Accepts a wine-bottle image (upload or URL), forwards it to the RapidAPI
//! wine-recognition provider and returns a ranked list of label candidates.

pub mod clients;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod server;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use clients::RapidApiClient;
pub use config::{Config, UpstreamCredentials};
pub use error::{RecognitionError, ValidationError};
pub use models::{Candidate, RecognitionResult};
pub use services::RecognitionOrchestrator;
pub use traits::{ImageSource, ImageUpload, RecognitionClient};
