//! Tool trait and registry: the abstraction over agent capabilities.
//!
//! Tools give a runner the ability to act: look up a price, fetch news,
//! write a file. The registry maps a tool name to its implementation and
//! declared input schema, and turns every call into an observation string.

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::error::ToolError;
use crate::gateway::{ToolCallRequest, ToolDeclaration};

/// The core Tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "get_stock_price").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's arguments.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments, returning the observation.
    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError>;

    /// Convert this tool into a ToolDeclaration for sending to the LLM.
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

type ToolFuture = Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send>>;

/// A tool built from a declaration and a closure.
pub struct FnTool {
    declaration: ToolDeclaration,
    handler: Box<dyn Fn(serde_json::Value) -> ToolFuture + Send + Sync>,
}

impl FnTool {
    pub fn new<F, Fut>(declaration: ToolDeclaration, handler: F) -> Self
    where
        F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
    {
        Self {
            declaration,
            handler: Box::new(move |args| Box::pin(handler(args))),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.declaration.name
    }

    fn description(&self) -> &str {
        &self.declaration.description
    }

    fn input_schema(&self) -> serde_json::Value {
        self.declaration.input_schema.clone()
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        (self.handler)(arguments).await
    }

    fn declaration(&self) -> ToolDeclaration {
        self.declaration.clone()
    }
}

/// The string fed back to the model for one tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// The call ID this observation answers
    pub call_id: String,
    /// The tool that was requested
    pub tool_name: String,
    /// The observation text (tool output, or the error message)
    pub output: String,
    /// Whether the call failed
    pub is_error: bool,
}

/// A registry of available tools, in registration order.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool. Names are unique: a second registration fails.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolError::DuplicateTool(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Register a declaration together with its implementation.
    pub fn register_fn<F, Fut>(&mut self, declaration: ToolDeclaration, handler: F) -> Result<(), ToolError>
    where
        F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
    {
        self.register(Box::new(FnTool::new(declaration, handler)))
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.index.get(name).map(|&i| self.tools[i].as_ref())
    }

    /// All tool declarations (for sending to the LLM).
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.tools.iter().map(|t| t.declaration()).collect()
    }

    /// Execute a tool call.
    ///
    /// Fails with [`ToolError::UnknownTool`] for an unregistered name and with
    /// [`ToolError::Execution`] when the implementation fails.
    pub async fn invoke(&self, call: &ToolCallRequest) -> Result<String, ToolError> {
        let tool = self
            .get(&call.tool_name)
            .ok_or_else(|| ToolError::UnknownTool(call.tool_name.clone()))?;

        tool.execute(call.arguments.clone()).await.map_err(|e| match e {
            ToolError::Execution { .. } => e,
            other => ToolError::Execution {
                tool_name: call.tool_name.clone(),
                reason: other.to_string(),
            },
        })
    }

    /// Execute a tool call and never fail: errors become the observation.
    pub async fn observe(&self, call: &ToolCallRequest) -> Observation {
        let (output, is_error) = match self.invoke(call).await {
            Ok(output) => (output, false),
            Err(e) => {
                tracing::warn!(tool = %call.tool_name, error = %e, "Tool call failed");
                (format!("Error: {e}"), true)
            }
        };
        Observation {
            call_id: call.id.clone(),
            tool_name: call.tool_name.clone(),
            output,
            is_error,
        }
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
