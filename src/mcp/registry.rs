//! Tool registry
//!
//! Tools are registered through [`ToolRegistryBuilder`] while the server
//! starts; the built [`ToolRegistry`] is immutable.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ToolkitError};

/// Callable behind a tool. Receives the call arguments and returns a record;
/// a record with an `error` field is an application-level failure.
pub type ToolHandlerFn = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// Public description of a tool, as listed by `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// A tool: its descriptor plus the handler that runs it
#[derive(Clone)]
pub struct ToolDefinition {
    descriptor: ToolDescriptor,
    handler: ToolHandlerFn,
}

impl ToolDefinition {
    pub fn new<F>(
        name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: F,
    ) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            descriptor: ToolDescriptor {
                name: name.into(),
                title: title.into(),
                description: description.into(),
                input_schema,
            },
            handler: Arc::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    /// Run the handler
    pub fn invoke(&self, arguments: &Value) -> Result<Value> {
        (self.handler)(arguments)
    }
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.descriptor.name)
            .finish_non_exhaustive()
    }
}

/// Immutable name → tool mapping that preserves registration order
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Find a tool by exact name
    pub fn lookup(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Descriptors in registration order
    pub fn list(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor.clone()).collect()
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(ToolDefinition::name).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Collects tool definitions during startup
#[derive(Debug, Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolRegistryBuilder {
    /// Add a tool. A second tool with the same name is a configuration error.
    pub fn register(mut self, definition: ToolDefinition) -> Result<Self> {
        if self.index.contains_key(definition.name()) {
            return Err(ToolkitError::Config(format!(
                "Duplicate tool name: {}",
                definition.name()
            )));
        }
        self.index
            .insert(definition.name().to_string(), self.tools.len());
        self.tools.push(definition);
        Ok(self)
    }

    pub fn build(self) -> ToolRegistry {
        ToolRegistry {
            tools: self.tools,
            index: self.index,
        }
    }
}
