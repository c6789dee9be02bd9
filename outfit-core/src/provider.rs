use crate::model::{WeatherQuery, WeatherReport};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt::Debug;
use thiserror::Error;
use tracing::{debug, error};

pub mod weatherapi;

/// Prefix shared by every weather lookup failure shown to the user.
pub const UNAVAILABLE_PREFIX: &str = "Sorry";

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("invalid weather endpoint: {0}")]
    InvalidUrl(String),

    #[error("request to weather provider failed: {0}")]
    Request(reqwest::Error),

    #[error("weather provider responded with status {0}")]
    Status(StatusCode),

    #[error("unexpected weather response: {0}")]
    Parse(#[from] serde_json::Error),
}

// reqwest errors carry the request URL, and ours embeds the API key.
impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.without_url())
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError>;
}

pub fn unavailable_message(city: &str) -> String {
    format!("{UNAVAILABLE_PREFIX}, couldn't fetch weather data for {city}. Please check the city name.")
}

/// Look up current weather and render it as a single summary line.
///
/// Never fails with a structured error: any provider problem becomes the
/// `"Sorry, ..."` message naming the city.
pub async fn fetch_weather(provider: &dyn WeatherProvider, city: &str) -> Result<String, String> {
    match provider.current(&WeatherQuery::new(city)).await {
        Ok(report) => {
            let line = report.to_string();
            debug!(report = %line, "Weather report");
            Ok(line)
        }
        Err(err) => {
            error!(city, error = %err, "Error fetching weather data");
            Err(unavailable_message(city))
        }
    }
}
