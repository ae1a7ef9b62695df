//! Environment variable-based configuration loading

use super::model::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use std::env;
use std::str::FromStr;

/// Load configuration from the process environment.
///
/// `OPENAI_API_KEY` and `DATABASE_URL` are required. `OPENAI_MODEL`,
/// `OPENAI_BASE_URL`, `PG_MCP_URL`, `OPENAI_MAX_TOKENS`,
/// `OPENAI_TEMPERATURE`, `PGCHAT_REQUEST_TIMEOUT_SECS` and
/// `PGCHAT_EXCHANGE_TIMEOUT_SECS` are optional.
pub fn load_from_env() -> BridgeResult<BridgeConfig> {
    load_from_source(|key| env::var(key).ok())
}

/// Load configuration through an arbitrary key lookup
pub fn load_from_source<F>(lookup: F) -> BridgeResult<BridgeConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    let api_key =
        get("OPENAI_API_KEY").ok_or_else(|| BridgeError::config("OPENAI_API_KEY is not set"))?;
    let database_url = get("DATABASE_URL")
        .ok_or_else(|| BridgeError::config("DATABASE_URL environment variable not set"))?;

    let mut config = BridgeConfig::new(api_key, database_url);

    if let Some(model) = get("OPENAI_MODEL") {
        config.model = model;
    }
    if let Some(base_url) = get("OPENAI_BASE_URL") {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(mcp_url) = get("PG_MCP_URL") {
        config.mcp_url = mcp_url;
    }

    config.max_tokens = parse_optional(&get, "OPENAI_MAX_TOKENS")?;
    config.temperature = parse_optional(&get, "OPENAI_TEMPERATURE")?;

    if let Some(secs) = parse_optional(&get, "PGCHAT_REQUEST_TIMEOUT_SECS")? {
        config.request_timeout_secs = secs;
    }
    if let Some(secs) = parse_optional(&get, "PGCHAT_EXCHANGE_TIMEOUT_SECS")? {
        config.exchange_timeout_secs = secs;
    }

    config.validate()?;
    Ok(config)
}

fn parse_optional<T, G>(get: &G, key: &str) -> BridgeResult<Option<T>>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| BridgeError::config(format!("Invalid {} value: '{}'", key, raw))),
    }
}
