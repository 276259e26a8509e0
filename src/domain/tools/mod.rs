//! Tool calling value objects.
//!
//! - `ToolDefinition` - a callable function advertised to the model
//! - `ToolCall` - the model's request to call one

mod tool_call;
mod tool_definition;

pub use tool_call::ToolCall;
pub use tool_definition::ToolDefinition;
