//! Completion service client and conversation types

pub mod converters;
pub mod messages;
pub mod parsers;
pub mod provider_types;
pub mod providers;

pub use messages::{
    CompletionResponse, ConversationTurn, MessageRole, TokenUsage, ToolCallRequest, ToolChoice,
};
pub use provider_types::ModelParameters;
pub use providers::{CompletionService, OpenAiProvider};
