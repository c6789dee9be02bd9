use tracing::{debug, error, instrument};

use crate::{
    Config,
    llm::{ChatModel, ChatRequest, ModelError},
    model::ChatMessage,
    tools::ToolRegistry,
};

pub const NO_TOOL_CALL: &str = "Error: No tool call received.";

const FASHION_PERSONA: &str = "You are a helpful fashion consultant.";

/// Drives the model: lets it pick a tool for the weather lookup, then asks
/// it for clothing advice.
#[derive(Debug)]
pub struct Orchestrator {
    model: Box<dyn ChatModel>,
    model_name: String,
    tools: ToolRegistry,
}

impl Orchestrator {
    pub fn new(config: &Config, model: Box<dyn ChatModel>, tools: ToolRegistry) -> Self {
        Self { model, model_name: config.model.name.clone(), tools }
    }

    /// Ask the model about the weather in `city` and run the tool it requests.
    ///
    /// The returned text is one of: the weather summary, the provider's
    /// `"Sorry, ..."` message, or an `"Error: ..."` line when the model did
    /// not request a usable tool. Only transport failures are `Err`.
    #[instrument(skip(self))]
    pub async fn resolve_weather(&self, city: &str) -> Result<String, ModelError> {
        let request = ChatRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage::user(format!("What is the weather in {city}?"))],
            tools: self.tools.descriptors(),
        };

        let reply = self.model.chat(request).await?;

        let Some(call) = reply.tool_calls().first() else {
            error!("No tool call received from the model.");
            return Ok(NO_TOOL_CALL.to_string());
        };
        debug!(calls = ?reply.tool_calls(), "Tool calls received");

        match self.tools.dispatch(call).await {
            Ok(text) => Ok(text),
            Err(err) => {
                error!(function = %call.name, error = %err, "Tool call rejected");
                Ok(format!("Error: {err}"))
            }
        }
    }

    /// Ask the model for family-friendly, work-appropriate attire given a weather report.
    #[instrument(skip(self, weather_report))]
    pub async fn recommend_attire(&self, weather_report: &str) -> Result<String, ModelError> {
        let prompt = format!(
            "The following is the weather report:\n\n{weather_report}\n\n\
             Based on this, please recommend appropriate, family-friendly attire for men and women \
             to wear today. Ensure the recommendations are safe for work and appropriate for all ages."
        );

        let request = ChatRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage::system(FASHION_PERSONA), ChatMessage::user(prompt)],
            tools: Vec::new(),
        };

        Ok(self.model.chat(request).await?.into_text())
    }
}
