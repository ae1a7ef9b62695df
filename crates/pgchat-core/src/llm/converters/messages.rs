//! Turn conversion to the chat-completions wire format

use crate::llm::messages::ConversationTurn;
use serde_json::{Value, json};

/// Message format converter
pub struct MessageConverter;

impl MessageConverter {
    /// Convert turns for the OpenAI chat-completions API
    pub fn to_openai(turns: &[ConversationTurn]) -> Vec<Value> {
        turns.iter().map(Self::turn_to_openai).collect()
    }

    fn turn_to_openai(turn: &ConversationTurn) -> Value {
        match turn {
            ConversationTurn::System { content } => json!({
                "role": "system",
                "content": content
            }),
            ConversationTurn::User { content } => json!({
                "role": "user",
                "content": content
            }),
            ConversationTurn::Assistant {
                content,
                tool_calls,
            } => {
                let mut msg = json!({
                    "role": "assistant",
                    "content": content
                });

                if !tool_calls.is_empty() {
                    let openai_tool_calls: Vec<Value> = tool_calls
                        .iter()
                        .map(|tc| {
                            json!({
                                "id": tc.id,
                                "type": "function",
                                "function": {
                                    "name": tc.name,
                                    "arguments": tc.arguments
                                }
                            })
                        })
                        .collect();
                    msg["tool_calls"] = json!(openai_tool_calls);
                }

                msg
            }
            ConversationTurn::ToolResult {
                call_id, content, ..
            } => json!({
                "role": "tool",
                "tool_call_id": call_id,
                "content": content
            }),
        }
    }
}
