//! Core library for the `outfit` CLI.
//!
//! This crate defines:
//! - Configuration loading (config file, `.env`, environment)
//! - The weather provider client
//! - The tool schema offered to the model and dispatch of its tool calls
//! - The chat client for the local model runtime and the orchestration on top
//!
//! It is used by `outfit-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod flow;
pub mod llm;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod tools;

pub use config::{Config, ModelSettings, WeatherSettings};
pub use flow::{FlowOutcome, run_flow};
pub use llm::{ChatModel, ChatRequest, ModelError, ModelReply, OllamaClient};
pub use model::{ChatMessage, Role, WeatherQuery, WeatherReport};
pub use orchestrator::Orchestrator;
pub use provider::{WeatherError, WeatherProvider, fetch_weather, weatherapi::WeatherApiProvider};
pub use tools::{ToolDescriptor, ToolInvocation, ToolRegistry, WeatherTool};
