//! Tool registry and dispatch

mod registry;
mod router;

pub use registry::create_tool_list;
pub use router::{route_tool_call, ToolHandlers};
