use serde::Deserialize;
use std::env;
use std::time::Duration;
use wayfare_core::LocaleSettings;
use wayfare_shared::Masked;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub aggregator: AggregatorConfig,
    pub storage: StorageConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AggregatorConfig {
    pub host: String,
    /// Sent as `X-RapidAPI-Key`; never printed
    pub api_key: Masked<String>,
    pub timeout_seconds: u64,
    pub currency: String,
    pub market: String,
    pub locale: String,
}

impl AggregatorConfig {
    pub fn base_url(&self) -> String {
        format!("https://{}", self.host)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn locale_settings(&self) -> LocaleSettings {
        LocaleSettings {
            currency: self.currency.clone(),
            market: self.market.clone(),
            locale: self.locale.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub min_airport_query_len: usize,
    pub recent_search_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_airport_query_len: 2,
            recent_search_limit: 10,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::builder(&run_mode)?.build()?.try_deserialize()
    }

    fn builder(
        run_mode: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        Ok(config::Config::builder()
            .set_default("aggregator.host", "sky-scrapper.p.rapidapi.com")?
            .set_default("aggregator.api_key", "")?
            .set_default("aggregator.timeout_seconds", 30_i64)?
            .set_default("aggregator.currency", "USD")?
            .set_default("aggregator.market", "en-US")?
            .set_default("aggregator.locale", "en-US")?
            .set_default("storage.path", "data/wayfare.json")?
            .set_default("search.min_airport_query_len", 2_i64)?
            .set_default("search.recent_search_limit", 10_i64)?
            .add_source(config::File::with_name("config/default").required(false))
            // Optional per-environment overrides, 'development' unless RUN_MODE says otherwise
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `WAYFARE__AGGREGATOR__API_KEY=...`
            .add_source(
                config::Environment::with_prefix("WAYFARE")
                    .prefix_separator("__")
                    .separator("__"),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_any_files() {
        let config: Config = Config::builder("unit-test-missing-mode")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.aggregator.timeout(), Duration::from_secs(30));
        assert_eq!(config.aggregator.locale_settings(), LocaleSettings::default());
        assert_eq!(config.search.min_airport_query_len, 2);
        assert_eq!(config.search.recent_search_limit, 10);
        assert!(config.aggregator.base_url().starts_with("https://"));
    }

    #[test]
    fn test_api_key_is_masked_in_debug() {
        let config: Config = config::Config::builder()
            .set_override("aggregator.host", "example.test")
            .unwrap()
            .set_override("aggregator.api_key", "super-secret")
            .unwrap()
            .set_override("aggregator.timeout_seconds", 5_i64)
            .unwrap()
            .set_override("aggregator.currency", "EUR")
            .unwrap()
            .set_override("aggregator.market", "de-DE")
            .unwrap()
            .set_override("aggregator.locale", "de-DE")
            .unwrap()
            .set_override("storage.path", "x.json")
            .unwrap()
            .set_override("search.min_airport_query_len", 3_i64)
            .unwrap()
            .set_override("search.recent_search_limit", 5_i64)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.aggregator.api_key.expose(), "super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
