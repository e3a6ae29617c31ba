//! Browser session with auto-waiting expectations
//!
//! Expectations poll the driver until they hold or the configured expect
//! timeout elapses, so pages that render asynchronously do not need
//! explicit sleeps.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use regex::Regex;
use tokio::time::sleep;
use tracing::debug;

use storefront_common::EnvConfig;

use crate::driver::{Driver, Locator};
use crate::error::{E2eError, E2eResult};

/// A driver bound to one environment
#[derive(Clone)]
pub struct Session {
    driver: Arc<dyn Driver>,
    config: Arc<EnvConfig>,
}

impl Session {
    pub fn new(driver: Arc<dyn Driver>, config: Arc<EnvConfig>) -> Self {
        Self { driver, config }
    }

    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Open a storefront route (or absolute URL)
    pub async fn visit(&self, path: &str) -> E2eResult<()> {
        let url = self.config.url(path);
        debug!("visit {}", url);
        self.driver.goto(&url).await
    }

    pub async fn url(&self) -> E2eResult<String> {
        self.driver.current_url().await
    }

    pub async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        self.driver.count(locator).await
    }

    pub async fn texts(&self, locator: &Locator) -> E2eResult<Vec<String>> {
        self.driver.texts(locator).await
    }

    /// Text of the first match, waiting for it to exist
    pub async fn text(&self, locator: &Locator) -> E2eResult<String> {
        let driver = self.driver();
        self.poll(&format!("text of {}", locator), move || async move {
            driver.texts(locator).await.map(|texts| {
                texts
                    .into_iter()
                    .next()
                    .ok_or_else(|| "no match".to_string())
            })
        })
        .await
    }

    /// Click the first match once it exists
    pub async fn click(&self, locator: &Locator) -> E2eResult<()> {
        self.expect_exists(locator).await?;
        debug!("click {}", locator);
        self.driver.click(locator).await
    }

    /// Type into the first match once it exists
    pub async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.expect_exists(locator).await?;
        debug!("fill {}", locator);
        self.driver.fill(locator, value).await
    }

    pub async fn expect_url_contains(&self, fragment: &str) -> E2eResult<()> {
        let driver = self.driver();
        self.poll(&format!("url contains {:?}", fragment), move || async move {
            driver
                .current_url()
                .await
                .map(|url| if url.contains(fragment) { Ok(()) } else { Err(url) })
        })
        .await
    }

    pub async fn expect_url_matches(&self, pattern: &Regex) -> E2eResult<()> {
        let driver = self.driver();
        self.poll(&format!("url matches /{}/", pattern), move || async move {
            driver
                .current_url()
                .await
                .map(|url| if pattern.is_match(&url) { Ok(()) } else { Err(url) })
        })
        .await
    }

    pub async fn expect_count(&self, locator: &Locator, expected: usize) -> E2eResult<()> {
        let driver = self.driver();
        self.poll(
            &format!("{} to have count {}", locator, expected),
            move || async move {
                driver
                    .count(locator)
                    .await
                    .map(|n| if n == expected { Ok(()) } else { Err(n.to_string()) })
            },
        )
        .await
    }

    /// Wait for at least one match and return how many there are
    pub async fn expect_exists(&self, locator: &Locator) -> E2eResult<usize> {
        let driver = self.driver();
        self.poll(&format!("{} to exist", locator), move || async move {
            driver
                .count(locator)
                .await
                .map(|n| if n > 0 { Ok(n) } else { Err("0 matches".to_string()) })
        })
        .await
    }

    pub async fn expect_visible(&self, locator: &Locator) -> E2eResult<()> {
        let driver = self.driver();
        self.poll(&format!("{} to be visible", locator), move || async move {
            driver.is_visible(locator).await.map(|visible| {
                if visible {
                    Ok(())
                } else {
                    Err("hidden or absent".to_string())
                }
            })
        })
        .await
    }

    /// First match's trimmed text equals `expected`
    pub async fn expect_text(&self, locator: &Locator, expected: &str) -> E2eResult<()> {
        let driver = self.driver();
        self.poll(
            &format!("{} to have text {:?}", locator, expected),
            move || async move {
                driver.texts(locator).await.map(|texts| match texts.first() {
                    Some(t) if t.trim() == expected => Ok(()),
                    Some(t) => Err(format!("{:?}", t.trim())),
                    None => Err("no match".to_string()),
                })
            },
        )
        .await
    }

    /// First match's text contains `needle`
    pub async fn expect_text_contains(&self, locator: &Locator, needle: &str) -> E2eResult<()> {
        let driver = self.driver();
        self.poll(
            &format!("{} to contain text {:?}", locator, needle),
            move || async move {
                driver.texts(locator).await.map(|texts| match texts.first() {
                    Some(t) if t.contains(needle) => Ok(()),
                    Some(t) => Err(format!("{:?}", t)),
                    None => Err("no match".to_string()),
                })
            },
        )
        .await
    }

    /// Index of the first match whose text contains `needle`
    pub async fn expect_any_text_contains(
        &self,
        locator: &Locator,
        needle: &str,
    ) -> E2eResult<usize> {
        let driver = self.driver();
        self.poll(
            &format!("some {} to contain text {:?}", locator, needle),
            move || async move {
                driver.texts(locator).await.map(|texts| {
                    texts
                        .iter()
                        .position(|t| t.contains(needle))
                        .ok_or_else(|| format!("{} candidates", texts.len()))
                })
            },
        )
        .await
    }

    pub async fn expect_attribute(
        &self,
        locator: &Locator,
        name: &str,
        expected: &str,
    ) -> E2eResult<()> {
        let driver = self.driver();
        self.poll(
            &format!("{} to have {}={:?}", locator, name, expected),
            move || async move {
                driver.attribute(locator, name).await.map(|value| match value {
                    Some(v) if v == expected => Ok(()),
                    other => Err(format!("{:?}", other)),
                })
            },
        )
        .await
    }

    /// No element on the page shows `text`
    pub async fn expect_text_absent(&self, text: &str) -> E2eResult<()> {
        let driver = self.driver();
        self.poll(&format!("text {:?} to be absent", text), move || async move {
            driver
                .count_text(text)
                .await
                .map(|n| if n == 0 { Ok(()) } else { Err(format!("{} matches", n)) })
        })
        .await
    }

    /// Re-run `probe` until it yields `Ok(value)` or the expect timeout passes.
    ///
    /// The probe returns `Err(observed)` to keep waiting. Browser errors, such
    /// as an evaluation racing a navigation, also keep waiting; any other
    /// driver error aborts immediately.
    async fn poll<T, F, Fut>(&self, what: &str, mut probe: F) -> E2eResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = E2eResult<Result<T, String>>>,
    {
        let timeout = self.config.timeouts.expect();
        let interval = self.config.timeouts.poll();
        let start = Instant::now();

        loop {
            let observed = match probe().await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(observed)) => observed,
                Err(E2eError::Browser(reason)) => {
                    debug!("retrying {} after browser error: {}", what, reason);
                    format!("browser error: {}", reason)
                }
                Err(e) => return Err(e),
            };

            if start.elapsed() >= timeout {
                return Err(E2eError::AssertionFailed(format!(
                    "expected {} within {} ms, last observed: {}",
                    what,
                    timeout.as_millis(),
                    observed
                )));
            }

            sleep(interval).await;
        }
    }
}
