//! Response parsers

pub mod responses;


pub use responses::ResponseParser;
