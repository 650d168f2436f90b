//! Backend implementations for the supported language-model providers.

pub mod google;
pub mod openai;

pub use google::Google;
pub use openai::OpenAi;
