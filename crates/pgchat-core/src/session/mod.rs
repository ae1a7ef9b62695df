//! Session management

pub mod manager;

#[cfg(test)]
pub(crate) mod fake_service;

pub use manager::{CONNECT_TOOL, DISCONNECT_TOOL, EXPLAIN_TOOL, QUERY_TOOL, Session};
