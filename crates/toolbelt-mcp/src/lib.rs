//! MCP (Model Context Protocol) server runtime for toolbelt adapters.
//!
//! An adapter builds a [`ToolRegistry`] over its API client, a
//! [`ResourceRegistry`] with its config resource, and hands both to an
//! [`McpServer`] which speaks JSON-RPC over stdio.

pub mod protocol;
pub mod registry;
pub mod resources;
pub mod server;
pub mod tool;
pub mod transport;

pub use registry::{ToolDispatch, ToolRegistry};
pub use resources::{ResourceDescriptor, ResourceRegistry};
pub use server::McpServer;
pub use tool::{NoArgs, ToolContext, ToolDescriptor, ToolInput, ToolOutput};
pub use transport::StdioTransport;
