//! Tool registry: enablement filtering and call-by-name dispatch.
//!
//! Every failure inside a tool call (bad arguments, remote API errors,
//! spill file errors) is turned into an `isError` result here, so a single
//! failed call never ends the session.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use toolbelt_core::{Session, ToolFilter};
use toolbelt_pipeline::Pipeline;

use crate::protocol::{ToolCallResult, ToolDefinition};
use crate::tool::{ToolContext, ToolDescriptor, ToolOutput};

/// Object-safe view of a registry, used by the server.
#[async_trait]
pub trait ToolDispatch: Send + Sync {
    /// Definitions of the enabled tools, in registration order.
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Call a tool by name.
    async fn call(&self, name: &str, arguments: Option<Value>) -> ToolCallResult;
}

/// Tools of one adapter, bound to its client and session.
pub struct ToolRegistry<C: ?Sized> {
    tools: Vec<ToolDescriptor<C>>,
    filter: ToolFilter,
    context: ToolContext<C>,
    pipeline: Pipeline,
}

impl<C: ?Sized + Send + Sync + 'static> ToolRegistry<C> {
    /// Create an empty registry that allows every tool.
    pub fn new(client: Arc<C>, session: Arc<Session>) -> Self {
        Self {
            tools: Vec::new(),
            filter: ToolFilter::all(),
            context: ToolContext { client, session },
            pipeline: Pipeline::new(),
        }
    }

    /// Apply an enablement filter, dropping tools already registered that fail it.
    pub fn with_filter(mut self, filter: ToolFilter) -> Self {
        self.tools.retain(|t| filter.allows(t.group(), t.name()));
        self.filter = filter;
        self
    }

    /// Pipeline used to render JSON tool output.
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Register a tool unless the filter disables it.
    ///
    /// A tool with an existing name replaces the earlier one.
    pub fn register(&mut self, tool: ToolDescriptor<C>) -> &mut Self {
        if !self.filter.allows(tool.group(), tool.name()) {
            tracing::debug!(tool = tool.name(), group = tool.group(), "Tool disabled");
            return self;
        }

        if let Some(pos) = self.tools.iter().position(|t| t.name() == tool.name()) {
            tracing::warn!(tool = tool.name(), "Tool registered twice, replacing");
            self.tools[pos] = tool;
        } else {
            self.tools.push(tool);
        }
        self
    }

    /// Register several tools.
    pub fn register_all(mut self, tools: impl IntoIterator<Item = ToolDescriptor<C>>) -> Self {
        for tool in tools {
            self.register(tool);
        }
        self
    }

    /// Names of the enabled tools.
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Enabled tools.
    pub fn tools(&self) -> &[ToolDescriptor<C>] {
        &self.tools
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.context.session
    }

    fn find(&self, name: &str) -> Option<&ToolDescriptor<C>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    fn render(&self, output: ToolOutput) -> ToolCallResult {
        match output {
            ToolOutput::Text(text) => ToolCallResult::text(text),
            ToolOutput::Json { value, hint } => match self.pipeline.transform(value) {
                Ok(out) => ToolCallResult::text(out.with_hint(hint).to_string_with_hints()),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to render tool output");
                    ToolCallResult::error(format!("Failed to render output: {}", e))
                }
            },
        }
    }
}

#[async_trait]
impl<C: ?Sized + Send + Sync + 'static> ToolDispatch for ToolRegistry<C> {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema().clone(),
            })
            .collect()
    }

    async fn call(&self, name: &str, arguments: Option<Value>) -> ToolCallResult {
        let Some(tool) = self.find(name) else {
            tracing::warn!(tool = name, "Unknown tool");
            return ToolCallResult::error(format!("Unknown tool: {}", name));
        };

        let args = arguments.unwrap_or(Value::Null);
        match tool.invoke(self.context.clone(), args).await {
            Ok(output) => {
                tracing::debug!(tool = name, "Tool call succeeded");
                self.render(output)
            }
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "Tool call failed");
                ToolCallResult::error(e.to_string())
            }
        }
    }
}
