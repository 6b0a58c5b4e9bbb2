//! Chromium-backed implementation of the browser ports, driven over CDP by
//! `chromiumoxide`.

use crate::config::settings::BrowserSettings;
use crate::domain::ports::{BrowserLauncher, BrowserPage, BrowserSession};
use crate::utils::error::{Result, ScrapeError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::element::Element;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);
const EXIT_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    settings: BrowserSettings,
}

impl ChromiumLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let settings = &self.settings;
        let mut builder = BrowserConfig::builder()
            .window_size(settings.viewport_width, settings.viewport_height)
            .viewport(Viewport {
                width: settings.viewport_width,
                height: settings.viewport_height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: false,
                has_touch: false,
            })
            .request_timeout(settings.request_timeout);

        if !settings.headless {
            builder = builder.with_head();
        }
        if settings.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &settings.chrome_path {
            builder = builder.chrome_executable(path);
        }
        for arg in &settings.extra_args {
            builder = builder.arg(arg.as_str());
        }

        builder
            .build()
            .map_err(|message| ScrapeError::BrowserLaunchError { message })
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let config = self.browser_config()?;
        let (browser, mut handler) =
            Browser::launch(config)
                .await
                .map_err(|e| ScrapeError::BrowserLaunchError {
                    message: e.to_string(),
                })?;

        // The CDP handler must be polled for the browser connection to make progress
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler stopped: {}", e);
                    break;
                }
            }
        });

        let mut session = ChromiumSession {
            browser,
            page: None,
            handler_task,
        };

        match open_page(&session.browser, &self.settings.user_agent).await {
            Ok(page) => {
                session.page = Some(ChromiumPage { page });
                tracing::debug!("Chromium session ready");
                Ok(Box::new(session) as Box<dyn BrowserSession>)
            }
            Err(e) => {
                if let Err(close_err) = session.close().await {
                    tracing::warn!("Failed to close browser after launch error: {}", close_err);
                }
                Err(e)
            }
        }
    }
}

async fn open_page(browser: &Browser, user_agent: &str) -> Result<Page> {
    let page = browser.new_page("about:blank").await?;
    page.set_user_agent(SetUserAgentOverrideParams::new(user_agent.to_string()))
        .await?;
    Ok(page)
}

pub struct ChromiumSession {
    browser: Browser,
    page: Option<ChromiumPage>,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    fn page(&self) -> &dyn BrowserPage {
        match &self.page {
            Some(page) => page as &dyn BrowserPage,
            None => &DetachedPage,
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.page = None;
        let result = shut_down(&mut self.browser, EXIT_GRACE).await;
        self.handler_task.abort();
        result
    }
}

/// The process-level controls of a launched browser.
#[async_trait]
trait BrowserProcess: Send {
    async fn request_close(&mut self) -> Result<()>;
    async fn wait_exit(&mut self) -> Result<()>;
    async fn kill(&mut self) -> Result<()>;
}

#[async_trait]
impl BrowserProcess for Browser {
    async fn request_close(&mut self) -> Result<()> {
        Browser::close(self).await?;
        Ok(())
    }

    async fn wait_exit(&mut self) -> Result<()> {
        Browser::wait(self).await?;
        Ok(())
    }

    async fn kill(&mut self) -> Result<()> {
        match Browser::kill(self).await {
            Some(result) => Ok(result?),
            None => Ok(()),
        }
    }
}

/// Asks the browser to close and waits up to `grace` for it to exit.
///
/// The process is killed when the close command fails (the CDP connection
/// may already be gone) or the process outlives the grace period.
async fn shut_down<P: BrowserProcess + ?Sized>(process: &mut P, grace: Duration) -> Result<()> {
    let closed = process.request_close().await;

    let exited = match &closed {
        Ok(()) => match tokio::time::timeout(grace, process.wait_exit()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::debug!("Waiting for browser exit failed: {}", e);
                false
            }
            Err(_) => {
                tracing::warn!("Browser still running {:?} after close", grace);
                false
            }
        },
        Err(e) => {
            tracing::debug!("Browser close command failed: {}", e);
            false
        }
    };

    if !exited {
        if let Err(e) = process.kill().await {
            tracing::warn!("Failed to kill browser process: {}", e);
        }
    }
    closed
}

pub struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    async fn find_with_text(
        &self,
        selector: &str,
        text: &str,
    ) -> Result<Option<Element>> {
        for element in self.page.find_elements(selector).await? {
            let inner = element.inner_text().await?.unwrap_or_default();
            if inner.trim() == text {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<()> {
        tracing::debug!("Navigating to {}", url);
        tokio::time::timeout(timeout, self.page.goto(url))
            .await
            .map_err(|_| ScrapeError::timeout(format!("navigation to {}", url), timeout))??;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let poll = async {
            loop {
                if self.page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| ScrapeError::timeout(format!("selector '{}'", selector), timeout))
    }

    async fn inner_html_all(&self, selector: &str) -> Result<Vec<String>> {
        let elements = self.page.find_elements(selector).await?;

        let mut fragments = Vec::with_capacity(elements.len());
        for element in elements {
            fragments.push(element.inner_html().await?.unwrap_or_default());
        }
        Ok(fragments)
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        match self.page.find_element(selector).await {
            Ok(element) => {
                element.click().await?;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    async fn click_with_text(&self, selector: &str, text: &str) -> Result<bool> {
        match self.find_with_text(selector, text).await? {
            Some(element) => {
                element.click().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }
}

/// Stands in for the page after the session has been closed.
struct DetachedPage;

impl DetachedPage {
    fn closed() -> ScrapeError {
        ScrapeError::UnavailableError {
            message: "browser session is closed".to_string(),
        }
    }
}

#[async_trait]
impl BrowserPage for DetachedPage {
    async fn goto(&self, _url: &str, _timeout: Duration) -> Result<()> {
        Err(Self::closed())
    }

    async fn wait_for_selector(&self, _selector: &str, _timeout: Duration) -> Result<()> {
        Err(Self::closed())
    }

    async fn inner_html_all(&self, _selector: &str) -> Result<Vec<String>> {
        Err(Self::closed())
    }

    async fn click(&self, _selector: &str) -> Result<bool> {
        Err(Self::closed())
    }

    async fn click_with_text(&self, _selector: &str, _text: &str) -> Result<bool> {
        Err(Self::closed())
    }

    async fn content(&self) -> Result<String> {
        Err(Self::closed())
    }
}
