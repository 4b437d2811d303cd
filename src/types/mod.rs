//! Type definitions shared across the agent.

mod message;

pub use message::*;
