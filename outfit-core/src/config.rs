use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::PathBuf};

pub const WEATHER_API_KEY_VAR: &str = "WEATHER_API_KEY";
pub const WEATHER_BASE_URL_VAR: &str = "WEATHER_BASE_URL";
pub const MODEL_HOST_VAR: &str = "OLLAMA_HOST";
pub const MODEL_NAME_VAR: &str = "OLLAMA_MODEL";

pub const DEFAULT_MODEL_HOST: &str = "http://localhost:11434";
pub const DEFAULT_MODEL_NAME: &str = "llama3.1";

/// Weather provider endpoint and credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct WeatherSettings {
    pub api_key: String,
    /// Full endpoint, e.g. `http://api.weatherapi.com/v1/current.json`.
    pub base_url: String,
}

impl fmt::Debug for WeatherSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherSettings")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Local model runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    pub host: String,
    pub name: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self { host: DEFAULT_MODEL_HOST.to_string(), name: DEFAULT_MODEL_NAME.to_string() }
    }
}

/// Resolved configuration, built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub weather: WeatherSettings,
    pub model: ModelSettings,
}

/// Optional on-disk layer. Every key may be omitted.
///
/// Example TOML:
/// [weather]
/// base_url = "http://api.weatherapi.com/v1/current.json"
///
/// [model]
/// name = "llama3.1"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub weather: FileWeather,
    #[serde(default)]
    pub model: FileModel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileWeather {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileModel {
    pub host: Option<String>,
    pub name: Option<String>,
}

impl FileConfig {
    /// Load config from disk, or return an empty default if it doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "outfit", "outfit")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

impl Config {
    /// Resolve configuration from the config file, `.env` and the process environment.
    pub fn load() -> Result<Self> {
        let file = FileConfig::load()?;

        if let Err(err) = dotenv::dotenv() {
            if !err.not_found() {
                return Err(err).context("Failed to load .env file");
            }
        }

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Layer environment values (via `lookup`) over the file config and defaults.
    pub fn from_sources<F>(file: FileConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| non_blank(lookup(key));

        let api_key = env(WEATHER_API_KEY_VAR)
            .or(non_blank(file.weather.api_key))
            .ok_or_else(|| missing_setting(WEATHER_API_KEY_VAR, "api_key"))?;

        let base_url = env(WEATHER_BASE_URL_VAR)
            .or(non_blank(file.weather.base_url))
            .ok_or_else(|| missing_setting(WEATHER_BASE_URL_VAR, "base_url"))?;

        let defaults = ModelSettings::default();
        let model = ModelSettings {
            host: env(MODEL_HOST_VAR).or(non_blank(file.model.host)).unwrap_or(defaults.host),
            name: env(MODEL_NAME_VAR).or(non_blank(file.model.name)).unwrap_or(defaults.name),
        };

        Ok(Self { weather: WeatherSettings { api_key, base_url }, model })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn missing_setting(var: &str, key: &str) -> anyhow::Error {
    anyhow!(
        "{var} is not set.\n\
         Hint: export {var}, add it to a .env file, or set `{key}` in the [weather] table of config.toml."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_only_uses_model_defaults() {
        let cfg = Config::from_sources(
            FileConfig::default(),
            lookup_from(&[
                (WEATHER_API_KEY_VAR, "KEY"),
                (WEATHER_BASE_URL_VAR, "http://api.weatherapi.com/v1/current.json"),
            ]),
        )
        .expect("config should resolve");

        assert_eq!(cfg.weather.api_key, "KEY");
        assert_eq!(cfg.weather.base_url, "http://api.weatherapi.com/v1/current.json");
        assert_eq!(cfg.model, ModelSettings::default());
    }

    #[test]
    fn missing_api_key_names_the_variable() {
        let err = Config::from_sources(
            FileConfig::default(),
            lookup_from(&[(WEATHER_BASE_URL_VAR, "http://example.test")]),
        )
        .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("WEATHER_API_KEY is not set"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn blank_base_url_counts_as_missing() {
        let err = Config::from_sources(
            FileConfig::default(),
            lookup_from(&[(WEATHER_API_KEY_VAR, "KEY"), (WEATHER_BASE_URL_VAR, "   ")]),
        )
        .unwrap_err();

        assert!(err.to_string().contains("WEATHER_BASE_URL is not set"));
    }

    #[test]
    fn environment_overrides_file() {
        let file = FileConfig::parse(
            r#"
            [weather]
            api_key = "FILE_KEY"
            base_url = "http://file.test"

            [model]
            host = "http://gpu-box:11434"
            name = "qwen3"
            "#,
        )
        .expect("valid toml");

        let cfg = Config::from_sources(
            file,
            lookup_from(&[(WEATHER_API_KEY_VAR, "ENV_KEY"), (MODEL_NAME_VAR, "llama3.2")]),
        )
        .expect("config should resolve");

        assert_eq!(cfg.weather.api_key, "ENV_KEY");
        assert_eq!(cfg.weather.base_url, "http://file.test");
        assert_eq!(cfg.model.host, "http://gpu-box:11434");
        assert_eq!(cfg.model.name, "llama3.2");
    }

    #[test]
    fn partial_file_parses() {
        let file = FileConfig::parse("[model]\nname = \"mistral\"\n").expect("valid toml");
        assert!(file.weather.api_key.is_none());
        assert_eq!(file.model.name.as_deref(), Some("mistral"));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let settings = WeatherSettings {
            api_key: "super-secret".into(),
            base_url: "http://example.test".into(),
        };

        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("***"));
    }
}
