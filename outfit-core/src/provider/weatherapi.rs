use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Number;
use tracing::{debug, instrument};

use crate::{
    Config,
    model::{WeatherQuery, WeatherReport},
};

use super::{WeatherError, WeatherProvider};

/// WeatherAPI.com `current.json` client.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.weather.api_key.clone(),
            base_url: config.weather.base_url.clone(),
            http: Client::new(),
        }
    }

    /// Full request URL, including the API key and the air-quality flag.
    pub fn request_url(&self, city: &str) -> Result<Url, WeatherError> {
        Url::parse_with_params(
            &self.base_url,
            &[("key", self.api_key.as_str()), ("q", city), ("aqi", "yes")],
        )
        .map_err(|e| WeatherError::InvalidUrl(format!("{}: {e}", self.base_url)))
    }
}

/// Copy of `url` safe for logs: the `key` query value is masked.
pub fn redact_url(url: &Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaAirQuality {
    #[serde(rename = "us-epa-index")]
    us_epa_index: Number,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_f: Number,
    wind_mph: Number,
    humidity: Number,
    condition: WaCondition,
    air_quality: WaAirQuality,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

impl From<WaResponse> for WeatherReport {
    fn from(res: WaResponse) -> Self {
        WeatherReport {
            location_name: res.location.name,
            country: res.location.country,
            condition: res.current.condition.text,
            temperature_f: res.current.temp_f,
            wind_mph: res.current.wind_mph,
            humidity_pct: res.current.humidity,
            aqi_us_epa: res.current.air_quality.us_epa_index,
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    #[instrument(skip(self, query), fields(city = %query.city))]
    async fn current(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError> {
        let url = self.request_url(&query.city)?;
        debug!(url = %redact_url(&url), "Requesting weather for {}", query.city);

        let res = self.http.get(url).send().await?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(WeatherError::Status(status));
        }

        let body = res.text().await?;
        let parsed: WaResponse = serde_json::from_str(&body)?;

        Ok(parsed.into())
    }
}
