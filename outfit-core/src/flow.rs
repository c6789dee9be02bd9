use crate::{llm::ModelError, orchestrator::Orchestrator, provider::UNAVAILABLE_PREFIX};

/// Result of one run, ready for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// The weather lookup failed; no recommendation was requested.
    Halted(String),
    Completed { weather: String, recommendation: String },
}

/// Resolve the weather for `city`, then ask for attire unless the lookup failed.
///
/// Only the `"Sorry"` prefix stops the run. An `"Error: ..."` line from the
/// model protocol is passed on to the recommendation step like any report.
pub async fn run_flow(orchestrator: &Orchestrator, city: &str) -> Result<FlowOutcome, ModelError> {
    let weather = orchestrator.resolve_weather(city).await?;

    if weather.starts_with(UNAVAILABLE_PREFIX) {
        return Ok(FlowOutcome::Halted(weather));
    }

    let recommendation = orchestrator.recommend_attire(&weather).await?;
    Ok(FlowOutcome::Completed { weather, recommendation })
}
