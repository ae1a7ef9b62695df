//! Provider-specific implementations

pub mod openai;
pub mod provider_trait;

#[cfg(test)]
mod openai_tests;

pub use openai::OpenAiProvider;
pub use provider_trait::CompletionService;
