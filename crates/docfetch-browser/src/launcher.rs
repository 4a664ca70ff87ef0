use crate::{Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Extra time given to CDP commands on top of the navigation bound, so the
/// navigation timeout fires before chromiumoxide's own request timeout
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(15);

/// Manages the headless Chrome process lifecycle
pub struct ChromeLauncher {
    chrome_path: PathBuf,
    profile_path: PathBuf,
    request_timeout: Duration,
}

impl ChromeLauncher {
    /// Create a new ChromeLauncher
    pub fn new(chrome_path: PathBuf, profile_path: PathBuf, navigation_timeout: Duration) -> Self {
        Self {
            chrome_path,
            profile_path,
            request_timeout: navigation_timeout.saturating_add(REQUEST_TIMEOUT_MARGIN),
        }
    }

    /// Launch headless Chrome and start driving its CDP connection
    pub async fn launch(&self) -> Result<BrowserSession> {
        tracing::info!("Launching headless Chrome: {}", self.chrome_path.display());

        let config = BrowserConfig::builder()
            .chrome_executable(&self.chrome_path)
            .user_data_dir(&self.profile_path)
            .request_timeout(self.request_timeout)
            .args(self.build_args())
            .build()
            .map_err(|e| Error::Browser(format!("Invalid browser configuration: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Browser(format!("Failed to launch Chrome: {}", e)))?;

        // The handler must be polled for any page command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        tracing::debug!("Chrome launched, CDP handler running");

        Ok(BrowserSession {
            browser,
            handler_task,
            closed: false,
        })
    }

    /// Build Chrome command-line arguments
    fn build_args(&self) -> Vec<String> {
        vec![
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
        ]
    }
}

/// A running browser plus the task pumping its CDP events
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    closed: bool,
}

impl BrowserSession {
    /// Open a blank page to navigate from
    pub async fn new_page(&self) -> Result<Page> {
        Ok(self.browser.new_page("about:blank").await?)
    }

    /// Close the browser and stop the handler task
    ///
    /// Only the first call does anything.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        tracing::debug!("Closing Chrome");
        let result = self.browser.close().await;

        match self.browser.wait().await {
            Ok(status) => tracing::debug!("Chrome exited: {:?}", status),
            Err(e) => tracing::debug!("Failed to wait for Chrome to exit: {}", e),
        }
        self.handler_task.abort();

        result.map(|_| ()).map_err(Error::from)
    }
}
