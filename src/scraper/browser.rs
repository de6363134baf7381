//! Browser automation for sources whose ratings only exist after client-side
//! scripts run.
//!
//! Each call opens its own WebDriver session, reads one element, and closes the
//! session again before returning, whether or not the read succeeded.

use crate::config::BrowserConfig;
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::ExtractionFault;

const POLL_PERIOD: Duration = Duration::from_millis(100);

/// Script-capable page reader.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Load `url` and return the visible text of the first element carrying `class`.
    async fn text_by_class(&self, url: &str, class: &str) -> Result<String, ExtractionFault>;
}

/// Chrome driven over WebDriver (chromedriver or a Selenium grid).
#[derive(Debug, Clone)]
pub struct WebDriverBrowser {
    webdriver_url: String,
    wait: Duration,
    capabilities: Capabilities,
}

impl WebDriverBrowser {
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            wait: Duration::from_secs(config.wait_secs),
            capabilities: chrome_capabilities(config),
        }
    }

    async fn read(&self, client: &Client, url: &str, class: &str) -> Result<String, ExtractionFault> {
        client.goto(url).await.map_err(command_fault)?;

        let element = client
            .wait()
            .at_most(self.wait)
            .every(POLL_PERIOD)
            .for_element(Locator::Css(&format!(".{}", class)))
            .await
            .map_err(|e| match e {
                CmdError::WaitTimeout => ExtractionFault::MissingElement {
                    anchor: class.to_string(),
                },
                e if e.is_no_such_element() => ExtractionFault::MissingElement {
                    anchor: class.to_string(),
                },
                e => command_fault(e),
            })?;

        element.text().await.map_err(command_fault)
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn text_by_class(&self, url: &str, class: &str) -> Result<String, ExtractionFault> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities.clone());
        let client = builder
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| ExtractionFault::Session(e.to_string()))?;

        debug!("Browser session open for {}", url);
        let result = self.read(&client, url, class).await;

        if let Err(e) = client.close().await {
            warn!("Failed to close browser session: {}", e);
        }

        result
    }
}

/// `goog:chromeOptions` carrying the efficiency switches and content blocks.
fn chrome_capabilities(config: &BrowserConfig) -> Capabilities {
    let mut caps = Capabilities::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": config.args,
            "prefs": config.prefs,
        }),
    );
    caps
}

fn command_fault(e: CmdError) -> ExtractionFault {
    ExtractionFault::Browser(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_carry_config() {
        let config = BrowserConfig::default();
        let caps = chrome_capabilities(&config);
        let opts = &caps["goog:chromeOptions"];

        assert_eq!(opts["args"][0], "--headless");
        assert_eq!(
            opts["prefs"]["profile.managed_default_content_settings.stylesheets"],
            2
        );
        assert_eq!(
            opts["prefs"]["profile.default_content_setting_values.notifications"],
            2
        );
    }

    #[tokio::test]
    async fn test_unreachable_driver_is_session_fault() {
        let config = BrowserConfig {
            webdriver_url: "http://127.0.0.1:9".to_string(),
            ..BrowserConfig::default()
        };
        let browser = WebDriverBrowser::new(&config);

        let err = browser
            .text_by_class("https://example.com", "grade")
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionFault::Session(_)));
    }

    async fn driver_route(
        server: &mut mockito::ServerGuard,
        method: &str,
        path: &str,
        status: usize,
        body: &str,
    ) -> mockito::Mock {
        server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_missing_element_closes_session() {
        let mut server = mockito::Server::new_async().await;
        let _open = driver_route(
            &mut server,
            "POST",
            "/session",
            200,
            r#"{"value":{"sessionId":"abc","capabilities":{}}}"#,
        )
        .await;
        let _current = driver_route(&mut server, "GET", "/session/abc/url", 200, r#"{"value":"about:blank"}"#).await;
        let _goto = driver_route(&mut server, "POST", "/session/abc/url", 200, r#"{"value":null}"#).await;
        // Polled until the wait runs out.
        let lookup = server
            .mock("POST", "/session/abc/element")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"value":{"error":"no such element","message":"no such element: .grade","stacktrace":""}}"#)
            .expect_at_least(1)
            .create_async()
            .await;
        let teardown = driver_route(&mut server, "DELETE", "/session/abc", 200, r#"{"value":null}"#).await;

        let config = BrowserConfig {
            webdriver_url: server.url(),
            wait_secs: 1,
            ..BrowserConfig::default()
        };
        let err = WebDriverBrowser::new(&config)
            .text_by_class("https://example.com/quote/AAPL", "grade")
            .await
            .unwrap_err();

        assert!(
            matches!(&err, ExtractionFault::MissingElement { anchor } if anchor == "grade"),
            "got {:?}",
            err
        );
        lookup.assert_async().await;
        teardown.assert_async().await;
    }
}
