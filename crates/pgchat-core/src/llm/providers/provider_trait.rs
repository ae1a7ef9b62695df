//! Completion service trait

use crate::error::BridgeResult;
use crate::llm::messages::{CompletionResponse, ConversationTurn, ToolChoice};
use crate::tools::FunctionSchema;
use async_trait::async_trait;

/// A chat-completion service with function calling
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send the turns and the offered tools, get one response back
    async fn complete(
        &self,
        turns: &[ConversationTurn],
        tools: &[FunctionSchema],
        tool_choice: ToolChoice,
    ) -> BridgeResult<CompletionResponse>;

    /// Model identifier, for logging
    fn model(&self) -> &str;
}
