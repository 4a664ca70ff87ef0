use crate::launcher::BrowserSession;
use crate::network_idle::{IdlePolicy, InflightTracker};
use crate::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
    SetUserAgentOverrideParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::{Duration, Instant};
use url::Url;

/// Chrome shows its own error page for DNS, TLS and connection failures
const CHROME_ERROR_SCHEME: &str = "chrome-error://";

/// The page operations the fetch pipeline needs
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Override the user agent for every following request
    async fn set_user_agent(&self, user_agent: &str) -> Result<()>;

    /// Navigate and wait for network quiescence, bounded by `timeout`
    async fn navigate(&self, url: &Url, timeout: Duration, idle: IdlePolicy) -> Result<()>;

    /// Whether the challenge marker is still in the body text
    ///
    /// A page without a body yet counts as still challenged.
    async fn challenge_present(&self, marker: &str) -> Result<bool>;

    /// Full rendered markup of the current document
    async fn content(&self) -> Result<String>;

    async fn current_url(&self) -> Result<Option<String>>;

    async fn title(&self) -> Result<Option<String>>;

    /// Release the browser; called once, after success or failure
    async fn close(&mut self) -> Result<()>;
}

/// A chromiumoxide page together with the browser that owns it
pub struct ChromePage {
    page: Page,
    session: BrowserSession,
}

impl ChromePage {
    pub fn new(page: Page, session: BrowserSession) -> Self {
        Self { page, session }
    }

    async fn goto_and_settle(&self, url: &Url, idle: IdlePolicy) -> Result<()> {
        self.page.execute(EnableParams::default()).await?;

        // Subscribe before navigating so no request of the load is missed
        let mut started = self.page.event_listener::<EventRequestWillBeSent>().await?;
        let mut finished = self.page.event_listener::<EventLoadingFinished>().await?;
        let mut failed = self.page.event_listener::<EventLoadingFailed>().await?;

        tracing::debug!("Navigating to {}", url);
        self.page.goto(url.as_str()).await?;
        tracing::debug!("Load event fired, waiting for network idle");

        let mut tracker = InflightTracker::new(idle, Instant::now());
        loop {
            if tracker.is_idle(Instant::now()) {
                break;
            }

            let idle_at = tracker.idle_at();
            tokio::select! {
                biased;
                Some(event) = started.next() => {
                    tracing::trace!("Request: {}", event.request.url);
                    tracker.request_started(event.request_id.inner(), Instant::now());
                }
                Some(event) = finished.next() => {
                    tracker.request_done(event.request_id.inner(), Instant::now());
                }
                Some(event) = failed.next() => {
                    tracing::trace!("Request failed: {}", event.error_text);
                    tracker.request_done(event.request_id.inner(), Instant::now());
                }
                _ = sleep_until(idle_at) => {}
            }
        }

        tracing::debug!("Network idle ({} request(s) in flight)", tracker.inflight());
        Ok(())
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}

#[async_trait]
impl PageDriver for ChromePage {
    async fn set_user_agent(&self, user_agent: &str) -> Result<()> {
        self.page
            .execute(SetUserAgentOverrideParams::new(user_agent))
            .await?;
        Ok(())
    }

    async fn navigate(&self, url: &Url, timeout: Duration, idle: IdlePolicy) -> Result<()> {
        tokio::time::timeout(timeout, self.goto_and_settle(url, idle))
            .await
            .map_err(|_| Error::Timeout {
                what: "navigation and network idle",
                after: timeout,
            })?
            .map_err(|e| match e {
                Error::Cdp(reason) => Error::Navigation {
                    url: url.to_string(),
                    reason,
                },
                other => other,
            })?;

        if let Some(landed) = self.page.url().await? {
            if landed.starts_with(CHROME_ERROR_SCHEME) {
                return Err(Error::Navigation {
                    url: url.to_string(),
                    reason: "Chrome could not load the page".to_string(),
                });
            }
        }

        Ok(())
    }

    async fn challenge_present(&self, marker: &str) -> Result<bool> {
        let marker = serde_json::to_string(marker)
            .map_err(|e| Error::Browser(format!("Unencodable challenge marker: {}", e)))?;
        let script = format!(
            "(() => {{ const body = document.body; return body ? body.innerText.includes({}) : true; }})()",
            marker
        );

        let result = self.page.evaluate(script).await?;
        result
            .into_value::<bool>()
            .map_err(|e| Error::Cdp(format!("Unexpected challenge check result: {}", e)))
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn current_url(&self) -> Result<Option<String>> {
        Ok(self.page.url().await?)
    }

    async fn title(&self) -> Result<Option<String>> {
        Ok(self.page.get_title().await?)
    }

    async fn close(&mut self) -> Result<()> {
        self.session.close().await
    }
}
