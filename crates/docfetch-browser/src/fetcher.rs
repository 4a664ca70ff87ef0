//! The fetch-and-save pipeline.
//!
//! One run launches headless Chrome, navigates to the target, waits out an
//! anti-bot interstitial when one is showing, lets late content settle, and
//! saves the rendered HTML plus the extracted main-content text. The browser
//! is closed whether or not the run succeeded.

use crate::network_idle::IdlePolicy;
use crate::page::{ChromePage, PageDriver};
use crate::{ChromeFinder, ChromeLauncher, ProfileManager, Result};
use chrono::{DateTime, Utc};
use docfetch_core::{
    Artifacts, ContentRoot, FetchConfig, OutputTarget, SavedArtifacts, extract_text,
    normalize_url,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use url::Url;

/// How the browser is found and which profile it runs with
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Explicit Chrome binary; auto-detected when absent
    pub chrome_path: Option<PathBuf>,
    /// Named persistent profile; a temporary profile when absent
    pub profile: Option<String>,
}

/// What the challenge wait observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeOutcome {
    /// The marker was never seen
    NotPresent,
    /// The marker was seen and went away
    Cleared,
    /// The wait gave up with the marker (possibly) still showing
    StillPresent,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub url: Url,
    pub final_url: Option<String>,
    pub title: Option<String>,
    pub challenge: ChallengeOutcome,
    /// Challenge checks that could not be evaluated, usually because the
    /// page was reloading
    pub failed_challenge_checks: usize,
    pub root: ContentRoot,
    pub saved: SavedArtifacts,
    pub fetched_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

/// Fetch `url` in headless Chrome and save `<output_name>.html` and `.txt`
///
/// Everything that can be checked without a browser is checked before one
/// is launched.
pub async fn fetch_and_save(
    url: &str,
    output_name: &str,
    config: &FetchConfig,
    launch: &LaunchOptions,
) -> Result<FetchReport> {
    config.validate()?;
    let url = normalize_url(url)?;
    let target = OutputTarget::new(&config.output_dir, output_name)?;

    let chrome = ChromeFinder::new(launch.chrome_path.clone()).find()?;
    let profile = match &launch.profile {
        Some(name) => ProfileManager::named(name)?,
        None => ProfileManager::temporary()?,
    };

    let launcher = ChromeLauncher::new(
        chrome,
        profile.path().to_path_buf(),
        config.navigation_timeout,
    );
    let mut session = launcher.launch().await?;

    let page = match session.new_page().await {
        Ok(page) => page,
        Err(e) => {
            if let Err(close_err) = session.close().await {
                tracing::warn!("Failed to close Chrome: {}", close_err);
            }
            return Err(e);
        }
    };

    // The profile directory outlives the browser using it
    let report = fetch_with(ChromePage::new(page, session), &url, &target, config).await;
    drop(profile);
    report
}

/// Run the pipeline on `page`, then close it regardless of the outcome
pub async fn fetch_with<P: PageDriver>(
    mut page: P,
    url: &Url,
    target: &OutputTarget,
    config: &FetchConfig,
) -> Result<FetchReport> {
    let result = run_pipeline(&page, url, target, config).await;

    if let Err(e) = page.close().await {
        tracing::warn!("Failed to close Chrome: {}", e);
    }

    result
}

async fn run_pipeline<P: PageDriver>(
    page: &P,
    url: &Url,
    target: &OutputTarget,
    config: &FetchConfig,
) -> Result<FetchReport> {
    let started = Instant::now();
    let fetched_at = Utc::now();

    page.set_user_agent(&config.user_agent).await?;

    tracing::info!("Navigating to {}", url);
    page.navigate(
        url,
        config.navigation_timeout,
        IdlePolicy::new(config.idle_connections, config.idle_window),
    )
    .await?;

    let ChallengeWait {
        outcome: challenge,
        failed_checks: failed_challenge_checks,
    } = wait_for_challenge(page, config).await;

    if !config.settle_delay.is_zero() {
        tracing::debug!("Settling for {:?}", config.settle_delay);
        tokio::time::sleep(config.settle_delay).await;
    }

    let html = page.content().await?;
    let extracted = extract_text(&html, &config.extract)?;
    if extracted.text.is_empty() {
        tracing::warn!("No visible text found in {}", extracted.root);
    }

    // Report metadata only; a failure here must not lose the page
    let final_url = page.current_url().await.unwrap_or_else(|e| {
        tracing::debug!("Could not read final URL: {}", e);
        None
    });
    let title = page.title().await.unwrap_or_else(|e| {
        tracing::debug!("Could not read title: {}", e);
        None
    });

    let saved = target.write(&Artifacts {
        html,
        text: extracted.text,
    })?;

    Ok(FetchReport {
        url: url.clone(),
        final_url,
        title,
        challenge,
        failed_challenge_checks,
        root: extracted.root,
        saved,
        fetched_at,
        elapsed_ms: started.elapsed().as_millis() as u64,
    })
}

struct ChallengeWait {
    outcome: ChallengeOutcome,
    failed_checks: usize,
}

/// Poll until the challenge marker is gone, giving up quietly on timeout
async fn wait_for_challenge<P: PageDriver>(page: &P, config: &FetchConfig) -> ChallengeWait {
    let marker = config.challenge_marker.as_str();
    let mut seen = false;
    let mut failed_checks = 0;

    let poll = async {
        loop {
            match page.challenge_present(marker).await {
                Ok(false) => return,
                Ok(true) => {
                    if !seen {
                        tracing::info!("Challenge page detected, waiting for it to clear");
                        seen = true;
                    }
                }
                // The challenge often reloads the page, destroying the context
                Err(e) => {
                    failed_checks += 1;
                    tracing::debug!("Challenge check failed (retrying): {}", e);
                }
            }
            tokio::time::sleep(config.challenge_poll).await;
        }
    };
    let waited = tokio::time::timeout(config.challenge_timeout, poll).await;

    let outcome = match waited {
        Ok(()) if seen => {
            tracing::info!("Challenge cleared");
            ChallengeOutcome::Cleared
        }
        Ok(()) => ChallengeOutcome::NotPresent,
        Err(_) => {
            tracing::warn!("Cloudflare check may still be present");
            ChallengeOutcome::StillPresent
        }
    };
    if failed_checks > 0 {
        tracing::info!("{} challenge check(s) could not be evaluated", failed_checks);
    }

    ChallengeWait {
        outcome,
        failed_checks,
    }
}
