use anyhow::Result;
use clap::Parser;
use docfetch_browser::LaunchOptions;
use docfetch_cli::OutputFormat;
use docfetch_cli::commands::fetch::{self, FetchSettings};
use docfetch_core::config::{DEFAULT_CHALLENGE_MARKER, DEFAULT_OUTPUT_DIR, DEFAULT_USER_AGENT};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docfetch")]
#[command(author, version)]
#[command(
    about = "Fetch a web page through headless Chrome and save its HTML and main text",
    long_about = "docfetch loads a page in headless Chrome, waits for anti-bot challenges such as \
                  Cloudflare's \"Just a moment\" interstitial to clear, then writes the rendered \
                  markup to <OUTPUT_NAME>.html and the page's main content as plain text to \
                  <OUTPUT_NAME>.txt."
)]
struct Cli {
    /// URL of the page to fetch
    #[arg(value_name = "URL")]
    url: String,

    /// Base name for the .html and .txt files
    #[arg(value_name = "OUTPUT_NAME")]
    output_name: String,

    /// Directory the files are written to
    #[arg(short, long, env = "DOCFETCH_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// User agent presented to the site
    #[arg(long, env = "DOCFETCH_USER_AGENT", default_value = DEFAULT_USER_AGENT, hide_default_value = true)]
    user_agent: String,

    /// Seconds allowed for navigation and network idle
    #[arg(
        long,
        env = "DOCFETCH_NAV_TIMEOUT",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    nav_timeout: u64,

    /// Body text that marks an anti-bot challenge page
    #[arg(long, env = "DOCFETCH_CHALLENGE_MARKER", default_value = DEFAULT_CHALLENGE_MARKER)]
    challenge_marker: String,

    /// Seconds to wait for the challenge to clear before continuing anyway
    #[arg(long, env = "DOCFETCH_CHALLENGE_TIMEOUT", default_value_t = 30)]
    challenge_timeout: u64,

    /// Milliseconds to wait for late content after the challenge
    #[arg(long, env = "DOCFETCH_SETTLE_MS", default_value_t = 3000)]
    settle_ms: u64,

    /// Path to the Chrome or Chromium binary
    #[arg(long, env = "CHROME_PATH", value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// Reuse a named Chrome profile (~/.docfetch/profiles/<NAME>) instead of a temporary one
    #[arg(long, value_name = "NAME")]
    profile: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let settings = FetchSettings {
        output_dir: cli.output_dir,
        user_agent: cli.user_agent,
        nav_timeout_secs: cli.nav_timeout,
        challenge_marker: cli.challenge_marker,
        challenge_timeout_secs: cli.challenge_timeout,
        settle_ms: cli.settle_ms,
    };
    let launch = LaunchOptions {
        chrome_path: cli.chrome_path,
        profile: cli.profile,
    };

    fetch::execute(&cli.url, &cli.output_name, &settings, launch, cli.format)
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("docfetch=debug,docfetch_cli=debug,docfetch_core=debug,docfetch_browser=debug")
    } else {
        EnvFilter::new("docfetch=info,docfetch_cli=info,docfetch_core=warn,docfetch_browser=warn")
    };

    // stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
