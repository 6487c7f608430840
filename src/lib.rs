pub mod config;
pub mod error;
pub mod extract;
pub mod rpc;
pub mod scan;
pub mod util;
pub mod workspace;

pub use config::MatcherConfig;
pub use scan::{
    Matcher, MessageReference, Position, Span, locate_message_references,
    locate_message_references_in_bytes,
};
