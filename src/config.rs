use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub base_url: String,
    /// Region path segment of the search URL, e.g. `mazowieckie/warszawa`.
    pub region: String,
    pub max_pages: u32,
    /// Pause after every listing fetch.
    pub delay_ms: u64,
    /// Seconds.
    pub request_timeout: u64,
    pub user_agent: String,
    pub max_urls_per_page: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub file_prefix: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.otodom.pl".to_string(),
            region: "mazowieckie/warszawa".to_string(),
            max_pages: 3,
            delay_ms: 1000,
            request_timeout: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_urls_per_page: 36,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            file_prefix: "otodom".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let defaults = AppConfig::default();

        let s = Config::builder()
            // Built-in defaults so the scraper runs without any config files
            .set_default("scraper.base_url", defaults.scraper.base_url)?
            .set_default("scraper.region", defaults.scraper.region)?
            .set_default("scraper.max_pages", defaults.scraper.max_pages as i64)?
            .set_default("scraper.delay_ms", defaults.scraper.delay_ms as i64)?
            .set_default("scraper.request_timeout", defaults.scraper.request_timeout as i64)?
            .set_default("scraper.user_agent", defaults.scraper.user_agent)?
            .set_default("scraper.max_urls_per_page", defaults.scraper.max_urls_per_page as i64)?
            .set_default("output.raw_dir", defaults.output.raw_dir.to_string_lossy().to_string())?
            .set_default(
                "output.processed_dir",
                defaults.output.processed_dir.to_string_lossy().to_string(),
            )?
            .set_default("output.file_prefix", defaults.output.file_prefix)?
            .add_source(File::with_name("config/default").required(false))
            // Add environment-specific config
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "OTODOM__"
            .add_source(Environment::with_prefix("OTODOM").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if Url::parse(&self.scraper.base_url).is_err() {
            return Err(ConfigError::Message("Invalid base URL format".into()));
        }

        if self.scraper.region.trim().is_empty() {
            return Err(ConfigError::Message("Scraper region must not be empty".into()));
        }

        if self.scraper.max_pages == 0 {
            return Err(ConfigError::Message("Scraper max_pages must be greater than 0".into()));
        }

        if self.scraper.max_urls_per_page == 0 {
            return Err(ConfigError::Message(
                "Scraper max_urls_per_page must be greater than 0".into(),
            ));
        }

        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message(
                "Scraper request_timeout must be greater than 0".into(),
            ));
        }

        if self.output.file_prefix.trim().is_empty() {
            return Err(ConfigError::Message("Output file_prefix must not be empty".into()));
        }

        Ok(())
    }
}
