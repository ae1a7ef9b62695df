//! Conversation orchestrator
//!
//! One exchange per user message:
//!
//! ```text
//! AwaitingInitialResponse -> Finished
//! AwaitingInitialResponse -> ToolRequested -> ExecutingTools
//!     -> AwaitingFollowupResponse -> Finished
//! ```
//!
//! All tool calls from the first response run in the order the model
//! returned them, then a single follow-up request produces the answer.

use crate::error::{BridgeError, BridgeResult};
use crate::llm::{CompletionService, ConversationTurn, ToolCallRequest, ToolChoice};
use crate::session::Session;
use crate::tools::FunctionSchema;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Default upper bound on one exchange
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(300);

/// System prompt used unless the caller supplies one
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a helpful assistant with access to a PostgreSQL database through the PG-MCP server.
Your task is to help the user interact with their database by:
1. Understanding their questions about the database
2. Converting natural language to SQL when appropriate
3. Using the available database tools to explore and query the database
4. Explaining query results in a clear, helpful manner

Available tools:
- connect: Register a database connection string and get a connection ID
- disconnect: Close a database connection
- pg_query: Execute SQL queries using a connection ID
- pg_explain: Get query execution plans

Always think step by step about what the user is asking, and use the appropriate tools to help them.";

/// Where an exchange currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    AwaitingInitialResponse,
    ToolRequested,
    ExecutingTools,
    AwaitingFollowupResponse,
    Finished,
}

impl fmt::Display for ExchangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingInitialResponse => "awaiting_initial_response",
            Self::ToolRequested => "tool_requested",
            Self::ExecutingTools => "executing_tools",
            Self::AwaitingFollowupResponse => "awaiting_followup_response",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Outcome of one exchange
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    /// Text returned to the user
    pub answer: String,
    /// Every turn sent or received, in order
    pub turns: Vec<ConversationTurn>,
    /// Number of tool calls executed
    pub tool_invocations: usize,
}

/// Drives the completion service and the session for each user message
pub struct Orchestrator {
    session: Session,
    provider: Arc<dyn CompletionService>,
    system_prompt: String,
    exchange_timeout: Duration,
}

impl Orchestrator {
    pub fn new(session: Session, provider: Arc<dyn CompletionService>) -> Self {
        Self {
            session,
            provider,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            exchange_timeout: DEFAULT_EXCHANGE_TIMEOUT,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_exchange_timeout(mut self, timeout: Duration) -> Self {
        self.exchange_timeout = timeout;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Answer one user message. Failures come back as an `Error: ...`
    /// string; the session stays usable.
    pub async fn chat(&mut self, user_message: &str) -> String {
        match self.chat_exchange(user_message).await {
            Ok(exchange) => exchange.answer,
            Err(e) => {
                error!("Chat exchange failed: {}", e);
                format!("Error: {}", e)
            }
        }
    }

    /// Answer one user message and return the full transcript
    pub async fn chat_exchange(&mut self, user_message: &str) -> BridgeResult<Exchange> {
        let timeout = self.exchange_timeout;
        tokio::time::timeout(timeout, self.run_exchange(user_message))
            .await
            .map_err(|_| BridgeError::Timeout {
                seconds: timeout.as_secs(),
            })?
    }

    #[instrument(skip(self, user_message), fields(model = %self.provider.model()))]
    async fn run_exchange(&mut self, user_message: &str) -> BridgeResult<Exchange> {
        let mut state = ExchangeState::AwaitingInitialResponse;
        debug!("exchange state: {}", state);

        let tools: Vec<FunctionSchema> = self.session.registry().schemas().to_vec();
        let mut turns = vec![
            ConversationTurn::system(self.system_prompt.clone()),
            ConversationTurn::user(user_message),
        ];

        let response = self
            .provider
            .complete(&turns, &tools, ToolChoice::Auto)
            .await?;

        if !response.has_tool_calls() {
            state = ExchangeState::Finished;
            debug!("exchange state: {}", state);
            let answer = response.content.unwrap_or_default();
            turns.push(ConversationTurn::Assistant {
                content: Some(answer.clone()),
                tool_calls: Vec::new(),
            });
            return Ok(Exchange {
                answer,
                turns,
                tool_invocations: 0,
            });
        }

        state = ExchangeState::ToolRequested;
        debug!(
            "exchange state: {} ({} calls)",
            state,
            response.tool_calls.len()
        );

        let calls = response.tool_calls;
        turns.push(ConversationTurn::assistant_tool_calls(
            response.content,
            calls.clone(),
        ));

        state = ExchangeState::ExecutingTools;
        debug!("exchange state: {}", state);
        for call in &calls {
            let content = self.invoke(call).await?;
            turns.push(ConversationTurn::tool_result(
                call.id.clone(),
                call.name.clone(),
                content,
            ));
        }

        state = ExchangeState::AwaitingFollowupResponse;
        debug!("exchange state: {}", state);
        let followup = self
            .provider
            .complete(&turns, &tools, ToolChoice::Auto)
            .await?;

        if followup.has_tool_calls() {
            warn!(
                "Ignoring {} tool calls requested in the follow-up response",
                followup.tool_calls.len()
            );
        }

        state = ExchangeState::Finished;
        debug!("exchange state: {}", state);
        let answer = followup.content.unwrap_or_default();
        turns.push(ConversationTurn::Assistant {
            content: Some(answer.clone()),
            tool_calls: Vec::new(),
        });

        Ok(Exchange {
            answer,
            turns,
            tool_invocations: calls.len(),
        })
    }

    /// Run one requested call and return the serialized result for the
    /// `tool_result` turn. Tool-level failures become an error payload;
    /// transport failures end the exchange.
    async fn invoke(&mut self, call: &ToolCallRequest) -> BridgeResult<String> {
        info!("Calling tool {} with args: {}", call.name, call.arguments);

        let outcome = match decode_arguments(call) {
            Ok(arguments) => self.session.execute_tool(&call.name, arguments).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result) => {
                if result.is_error {
                    warn!("Tool {} reported an error", call.name);
                }
                Ok(result.payload().to_string())
            }
            Err(e) if e.is_tool_level() => {
                warn!("Tool {} failed: {}", call.name, e);
                Ok(json!({ "error": e.to_string() }).to_string())
            }
            Err(e) => Err(e),
        }
    }
}

fn decode_arguments(call: &ToolCallRequest) -> BridgeResult<Value> {
    if call.arguments.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(&call.arguments).map_err(|e| {
        BridgeError::invalid_arguments(&call.name, format!("arguments are not valid JSON: {}", e))
    })
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
