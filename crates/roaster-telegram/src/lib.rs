pub mod adapter;
pub mod address;
pub mod commands;
pub mod error;
pub mod handler;
pub mod send;
pub mod typing;

pub use adapter::TelegramAdapter;
pub use error::TelegramError;
