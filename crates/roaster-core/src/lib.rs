pub mod config;
pub mod error;
pub mod types;

pub use config::RoasterConfig;
pub use error::{Result, RoasterError};
pub use types::{ConversationId, ConversationTurn, InboundMessage, TurnLabels};
