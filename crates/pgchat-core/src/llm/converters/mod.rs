//! Message and tool format converters

pub mod messages;
pub mod tools;

pub use messages::MessageConverter;
pub use tools::ToolConverter;
