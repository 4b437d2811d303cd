//! Tool-invocation support for personas that use tools.

mod tools;

pub use tools::{Tool, ToolAgent};
