use crate::OutputFormat;
use anyhow::{Context, Result};
use console::style;
use docfetch_browser::{FetchReport, LaunchOptions, fetch_and_save};
use docfetch_core::FetchConfig;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line settings that map onto a [`FetchConfig`]
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub output_dir: PathBuf,
    pub user_agent: String,
    pub nav_timeout_secs: u64,
    pub challenge_marker: String,
    pub challenge_timeout_secs: u64,
    pub settle_ms: u64,
}

impl FetchSettings {
    pub fn to_config(&self) -> FetchConfig {
        FetchConfig::new()
            .with_output_dir(&self.output_dir)
            .with_user_agent(&self.user_agent)
            .with_navigation_timeout(Duration::from_secs(self.nav_timeout_secs))
            .with_challenge_marker(&self.challenge_marker)
            .with_challenge_timeout(Duration::from_secs(self.challenge_timeout_secs))
            .with_settle_delay(Duration::from_millis(self.settle_ms))
    }
}

pub fn execute(
    url: &str,
    output_name: &str,
    settings: &FetchSettings,
    launch: LaunchOptions,
    format: OutputFormat,
) -> Result<()> {
    let config = settings.to_config();
    tracing::debug!("Fetch settings: {:?} (format: {})", settings, format.as_str());

    if format == OutputFormat::Pretty {
        println!("Fetching: {}", url);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let spinner = spinner(url);
    let result = runtime.block_on(fetch_and_save(url, output_name, &config, &launch));
    spinner.finish_and_clear();

    // Don't hang on a stuck CDP handler after the browser is gone
    runtime.shutdown_timeout(Duration::from_millis(100));

    let report = result.with_context(|| format!("Failed to fetch {}", url))?;

    match format {
        OutputFormat::Pretty => print_pretty(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn spinner(url: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        spinner.set_style(template);
    }
    spinner.set_message(format!("Loading {}", url));
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn print_pretty(report: &FetchReport) {
    println!(
        "{} {}",
        style("HTML saved to:").green(),
        report.saved.html_path.display()
    );
    println!(
        "{} {}",
        style("Text saved to:").green(),
        report.saved.text_path.display()
    );
    tracing::info!(
        "{} bytes of HTML, {} characters of text from <{}> in {} ms",
        report.saved.html_bytes,
        report.saved.text_chars,
        report.root,
        report.elapsed_ms
    );
}
