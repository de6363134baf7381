use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;
use url::Url;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub sources: SourcesConfig,
    pub browser: BrowserConfig,
    pub aggregator: AggregatorConfig,
}

/// Plain HTTP fetch settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sources reject requests without a browser-like client identifier.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Base URL of every rating source
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    #[serde(default = "default_zacks_url")]
    pub zacks_url: String,

    #[serde(default = "default_swingtradebot_url")]
    pub swingtradebot_url: String,

    #[serde(default = "default_tradingview_url")]
    pub tradingview_url: String,

    #[serde(default = "default_thestreet_url")]
    pub thestreet_url: String,

    #[serde(default = "default_wsj_url")]
    pub wsj_url: String,
}

/// WebDriver session settings for script-rendered sources
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserConfig {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Upper bound on waiting for the anchor element to appear.
    #[serde(default = "default_wait_secs")]
    pub wait_secs: u64,

    #[serde(default = "default_browser_args")]
    pub args: Vec<String>,

    /// Chrome content settings: 2 = block, 1 = allow.
    #[serde(default = "default_browser_prefs")]
    pub prefs: BTreeMap<String, u8>,
}

/// Aggregation settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AggregatorConfig {
    /// Run extractors concurrently. The resulting table is identical either way.
    #[serde(default)]
    pub parallel: bool,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/56.0.2924.87 Safari/537.36"
        .to_string()
}
fn default_zacks_url() -> String {
    "https://www.zacks.com".to_string()
}
fn default_swingtradebot_url() -> String {
    "https://swingtradebot.com".to_string()
}
fn default_tradingview_url() -> String {
    "https://www.tradingview.com".to_string()
}
fn default_thestreet_url() -> String {
    "https://www.thestreet.com".to_string()
}
fn default_wsj_url() -> String {
    "https://www.wsj.com".to_string()
}
fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}
fn default_wait_secs() -> u64 {
    2
}
fn default_browser_args() -> Vec<String> {
    [
        "--headless",
        "disable-infobars",
        "--disable-extensions",
        "--no-sandbox",
        "--no-default-browser-check",
        "--disable-gpu",
        "--disable-default-apps",
        "--disable-dev-shm-usage",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_browser_prefs() -> BTreeMap<String, u8> {
    [
        ("profile.managed_default_content_settings.images", 2),
        ("profile.default_content_setting_values.notifications", 2),
        ("profile.managed_default_content_settings.stylesheets", 2),
        ("profile.managed_default_content_settings.cookies", 2),
        ("profile.managed_default_content_settings.javascript", 1),
        ("profile.managed_default_content_settings.plugins", 2),
        ("profile.managed_default_content_settings.popups", 2),
        ("profile.managed_default_content_settings.geolocation", 2),
        ("profile.managed_default_content_settings.media_stream", 2),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            zacks_url: default_zacks_url(),
            swingtradebot_url: default_swingtradebot_url(),
            tradingview_url: default_tradingview_url(),
            thestreet_url: default_thestreet_url(),
            wsj_url: default_wsj_url(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            wait_secs: default_wait_secs(),
            args: default_browser_args(),
            prefs: default_browser_prefs(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("RATINGS").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|e| {
            warn!("Ignoring malformed configuration ({}), using defaults", e);
            AppConfig::default()
        });
        app_cfg.validate()?;
        Ok(app_cfg)
    }

    /// Every URL must parse before any request goes out.
    pub fn validate(&self) -> Result<()> {
        let urls = [
            ("sources.zacks_url", &self.sources.zacks_url),
            ("sources.swingtradebot_url", &self.sources.swingtradebot_url),
            ("sources.tradingview_url", &self.sources.tradingview_url),
            ("sources.thestreet_url", &self.sources.thestreet_url),
            ("sources.wsj_url", &self.sources.wsj_url),
            ("browser.webdriver_url", &self.browser.webdriver_url),
        ];
        for (key, value) in urls {
            Url::parse(value).with_context(|| format!("Invalid URL for {}: {:?}", key, value))?;
        }
        Ok(())
    }
}
