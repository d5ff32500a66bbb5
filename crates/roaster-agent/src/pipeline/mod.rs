//! Channel-agnostic reply pipeline.
//!
//! Channel adapters call `process_message` and only add their own delivery
//! (chunking, parse mode, fallbacks) on top.

pub mod context;
pub mod process;

pub use context::MessageContext;
pub use process::{process_message, ProcessedReply, EMPTY_QUESTION};
