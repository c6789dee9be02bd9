//! Callable tools offered to the model, and dispatch of the calls it requests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::{collections::HashMap, fmt, sync::Arc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::provider::{WeatherProvider, fetch_weather};

pub const WEATHER_FUNCTION: &str = "get_current_weather";

/// Function-call schema in the shape the model runtime expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    /// JSON Schema object describing the arguments.
    pub parameters: Value,
}

impl ToolDescriptor {
    pub fn function(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionSchema {
                name: name.to_string(),
                description: description.to_string(),
                parameters,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

pub fn weather_tool() -> ToolDescriptor {
    ToolDescriptor::function(
        WEATHER_FUNCTION,
        "Get the current weather for a city",
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "The name of the city",
                },
            },
            "required": ["city"],
        }),
    )
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Unknown function requested - {0}")]
    UnknownFunction(String),
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;

    async fn call(&self, arguments: &Map<String, Value>) -> Result<String, ToolError>;
}

/// Lookup table from function name to handler.
#[derive(Default)]
pub struct ToolRegistry {
    handlers: HashMap<String, Box<dyn ToolHandler>>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under its function name; a later registration replaces an earlier one.
    pub fn with_tool<T: ToolHandler + 'static>(mut self, handler: T) -> Self {
        let name = handler.descriptor().function.name;
        if self.handlers.contains_key(&name) {
            warn!(function = %name, "Replacing tool already registered under this name");
        }
        self.handlers.insert(name, Box::new(handler));
        self
    }

    /// Schemas of every registered tool, ordered by name.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let mut all: Vec<ToolDescriptor> = self.handlers.values().map(|h| h.descriptor()).collect();
        all.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        all
    }

    pub async fn dispatch(&self, invocation: &ToolInvocation) -> Result<String, ToolError> {
        let handler = self
            .handlers
            .get(&invocation.name)
            .ok_or_else(|| ToolError::UnknownFunction(invocation.name.clone()))?;

        let arguments = Value::Object(invocation.arguments.clone());
        debug!(function = %invocation.name, arguments = %arguments, "Executing function");
        handler.call(&invocation.arguments).await
    }
}

/// `get_current_weather`: looks the city up with the configured provider.
#[derive(Debug, Clone)]
pub struct WeatherTool {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherTool {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ToolHandler for WeatherTool {
    fn descriptor(&self) -> ToolDescriptor {
        weather_tool()
    }

    /// A call without `city` is treated as a request for an unknown function.
    /// Non-string values are looked up by their JSON text (`75001` → `"75001"`).
    async fn call(&self, arguments: &Map<String, Value>) -> Result<String, ToolError> {
        let city = match arguments.get("city") {
            Some(Value::String(city)) => city.clone(),
            Some(other) => other.to_string(),
            None => return Err(ToolError::UnknownFunction(WEATHER_FUNCTION.to_string())),
        };

        // Both the summary and the "Sorry" message go back verbatim.
        let (Ok(text) | Err(text)) = fetch_weather(self.provider.as_ref(), &city).await;
        Ok(text)
    }
}
