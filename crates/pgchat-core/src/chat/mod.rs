//! Tool-calling conversation loop

pub mod orchestrator;

pub use orchestrator::{
    DEFAULT_EXCHANGE_TIMEOUT, DEFAULT_SYSTEM_PROMPT, Exchange, ExchangeState, Orchestrator,
};
