use std::sync::Arc;

use clap::{ArgAction, Parser};
use inquire::{Text, validator::Validation};
use outfit_core::{
    Config, FlowOutcome, OllamaClient, Orchestrator, ToolRegistry, WeatherApiProvider,
    WeatherProvider, WeatherTool, run_flow,
};

const CITY_PROMPT: &str = "Enter the name of the city to check the weather:";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "outfit",
    version,
    about = "Look up the weather through a local model and get clothing advice"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter used when RUST_LOG is not set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        let provider: Arc<dyn WeatherProvider> = Arc::new(WeatherApiProvider::new(&config));
        let tools = ToolRegistry::new().with_tool(WeatherTool::new(provider));
        let orchestrator =
            Orchestrator::new(&config, Box::new(OllamaClient::new(&config)), tools);

        let city = prompt_city()?;
        let outcome = run_flow(&orchestrator, &city).await?;

        print!("{}", render(&outcome));

        Ok(())
    }
}

fn prompt_city() -> anyhow::Result<String> {
    let city = Text::new(CITY_PROMPT)
        .with_validator(|input: &str| {
            if input.trim().is_empty() {
                Ok(Validation::Invalid("Please enter a city name.".into()))
            } else {
                Ok(Validation::Valid)
            }
        })
        .prompt()?;

    Ok(city.trim().to_string())
}

/// Console text for a finished run.
pub fn render(outcome: &FlowOutcome) -> String {
    match outcome {
        FlowOutcome::Halted(message) => format!("{message}\n"),
        FlowOutcome::Completed { weather, recommendation } => {
            format!("Weather result: {weather}\n\nFashion Recommendation:\n{recommendation}\n")
        }
    }
}
