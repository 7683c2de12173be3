pub mod config;
pub mod error;
pub mod gemini;
pub mod traits;

pub use config::GeminiConfig;
pub use error::ModelError;
pub use gemini::GeminiClient;
pub use traits::{GenerateRequest, GenerativeClient, InlineImage};
