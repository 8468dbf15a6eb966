//! Request-scoped credential handling.

pub mod token_bridge;

pub use token_bridge::{Secret, TokenBridge};
