use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub city: String,
}

impl WeatherQuery {
    pub fn new(city: impl Into<String>) -> Self {
        Self { city: city.into() }
    }
}

/// Current conditions as reported by the weather provider.
///
/// Numeric readings keep the provider's own JSON representation so the
/// summary line prints them exactly as received (`68` vs `68.0`).
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub location_name: String,
    pub country: String,
    pub condition: String,
    pub temperature_f: Number,
    pub wind_mph: Number,
    pub humidity_pct: Number,
    /// US EPA air quality category, 1 (good) to 6 (hazardous).
    pub aqi_us_epa: Number,
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Weather in {}, {}: {}, {}°F, wind: {} mph, humidity: {}%, AQI (US EPA): {}",
            self.location_name,
            self.country,
            self.condition,
            self.temperature_f,
            self.wind_mph,
            self.humidity_pct,
            self.aqi_us_epa,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}
