//! Chrome automation over the DevTools protocol

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::ClearBrowserCookiesParams;
use chromiumoxide::cdp::js_protocol::runtime::EventExceptionThrown;
use chromiumoxide::handler::viewport::Viewport as PageViewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use storefront_common::Viewport;

use crate::driver::{js_string, Driver, Launcher, Locator};
use crate::error::{E2eError, E2eResult};

/// Options for launching Chrome
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Show the browser window
    pub headed: bool,

    pub viewport: Viewport,

    /// Bound on a single navigation
    pub page_load_timeout: Duration,

    /// Chrome binary; auto-detected when unset
    pub chrome_path: Option<PathBuf>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headed: false,
            viewport: Viewport::default(),
            page_load_timeout: Duration::from_secs(5),
            chrome_path: None,
        }
    }
}

/// Chrome launch settings; the page is emulated at the configured viewport
/// instead of chromiumoxide's 800x600 default
pub fn browser_config(options: &BrowserOptions) -> E2eResult<BrowserConfig> {
    let Viewport { width, height } = options.viewport;
    let mut builder = BrowserConfig::builder()
        .window_size(width, height)
        .viewport(PageViewport {
            width,
            height,
            ..PageViewport::default()
        });
    if options.headed {
        builder = builder.with_head();
    }
    if let Some(path) = &options.chrome_path {
        builder = builder.chrome_executable(path);
    }
    builder.build().map_err(E2eError::Browser)
}

/// One Chrome process with a single page
pub struct CdpDriver {
    browser: tokio::sync::Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    page_errors: Arc<Mutex<Vec<String>>>,
    page_load_timeout: Duration,
}

impl CdpDriver {
    /// Launch Chrome and open a blank page
    pub async fn launch(options: &BrowserOptions) -> E2eResult<Self> {
        let config = browser_config(options)?;

        info!("Launching Chrome ({}x{})", options.viewport.width, options.viewport.height);
        let (browser, mut handler) = Browser::launch(config).await?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;

        // Uncaught exceptions from the app are collected, not raised
        let page_errors = Arc::new(Mutex::new(Vec::new()));
        let mut exceptions = page.event_listener::<EventExceptionThrown>().await?;
        let sink = page_errors.clone();
        tokio::spawn(async move {
            while let Some(event) = exceptions.next().await {
                let text = event.exception_details.text.clone();
                warn!("Page exception: {}", text);
                sink.lock().push(text);
            }
        });

        Ok(Self {
            browser: tokio::sync::Mutex::new(browser),
            page,
            handler,
            page_errors,
            page_load_timeout: options.page_load_timeout,
        })
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> E2eResult<T> {
        let result = self.page.evaluate(script).await?;
        Ok(result.into_value::<T>()?)
    }
}

#[async_trait]
impl Driver for CdpDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        debug!("goto {}", url);
        match tokio::time::timeout(self.page_load_timeout, self.page.goto(url)).await {
            Ok(result) => {
                result.map_err(|e| E2eError::Navigation(format!("{}: {}", url, e)))?;
                Ok(())
            }
            Err(_) => Err(E2eError::Navigation(format!(
                "{}: page load exceeded {} ms",
                url,
                self.page_load_timeout.as_millis()
            ))),
        }
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        self.eval(locator.script("return els.length;")).await
    }

    async fn texts(&self, locator: &Locator) -> E2eResult<Vec<String>> {
        self.eval(locator.script("return els.map(e => e.textContent || '');"))
            .await
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> E2eResult<Option<String>> {
        let body = format!(
            "return els.length ? els[0].getAttribute({}) : null;",
            js_string(name)
        );
        self.eval(locator.script(&body)).await
    }

    async fn is_visible(&self, locator: &Locator) -> E2eResult<bool> {
        self.eval(locator.script(
            "if (!els.length) return false; \
             const e = els[0]; \
             return !!(e.offsetWidth || e.offsetHeight || e.getClientRects().length);",
        ))
        .await
    }

    async fn click(&self, locator: &Locator) -> E2eResult<()> {
        let clicked: bool = self
            .eval(locator.script(
                "if (!els.length) return false; \
                 els[0].scrollIntoView({ block: 'center' }); \
                 els[0].click(); \
                 return true;",
            ))
            .await?;
        if !clicked {
            return Err(E2eError::Browser(format!("nothing to click: {}", locator)));
        }
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        let focused: bool = self
            .eval(locator.script(
                "if (!els.length) return false; \
                 els[0].focus(); \
                 if (typeof els[0].select === 'function') els[0].select(); \
                 return true;",
            ))
            .await?;
        if !focused {
            return Err(E2eError::Browser(format!("nothing to fill: {}", locator)));
        }

        // Typing fires the key events frameworks listen to
        let element = self.page.find_element(":focus").await?;
        element.type_str(value).await?;
        Ok(())
    }

    async fn count_text(&self, text: &str) -> E2eResult<usize> {
        let script = format!(
            "(() => {{
  if (!document.body) return 0;
  const needle = {}.toLowerCase();
  const hits = new Set();
  const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_TEXT);
  while (walker.nextNode()) {{
    const node = walker.currentNode;
    if (node.parentElement && (node.textContent || '').toLowerCase().includes(needle)) {{
      hits.add(node.parentElement);
    }}
  }}
  return hits.size;
}})()",
            js_string(text)
        );
        self.eval(script).await
    }

    async fn clear_session(&self) -> E2eResult<()> {
        self.page.execute(ClearBrowserCookiesParams::default()).await?;
        let _: bool = self
            .eval(
                "(() => { try { localStorage.clear(); sessionStorage.clear(); } catch (e) {} return true; })()"
                    .to_string(),
            )
            .await?;
        Ok(())
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        let params = ScreenshotParams::builder().full_page(true).build();
        Ok(self.page.screenshot(params).await?)
    }

    fn page_errors(&self) -> Vec<String> {
        self.page_errors.lock().clone()
    }

    async fn close(&self) -> E2eResult<()> {
        let mut browser = self.browser.lock().await;
        browser.close().await?;
        self.handler.abort();
        Ok(())
    }
}

/// Launches a new Chrome per scenario
pub struct CdpLauncher {
    options: BrowserOptions,
}

impl CdpLauncher {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Launcher for CdpLauncher {
    async fn launch(&self) -> E2eResult<Arc<dyn Driver>> {
        let driver = CdpDriver::launch(&self.options).await?;
        Ok(Arc::new(driver))
    }
}
