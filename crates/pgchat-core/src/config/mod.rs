//! Configuration

pub mod env_loader;
pub mod model;

pub use env_loader::{load_from_env, load_from_source};
pub use model::BridgeConfig;
