//! Headless Chrome driver for docfetch.

mod chrome_finder;
mod error;
pub mod fetcher;
mod launcher;
pub mod network_idle;
pub mod page;
mod profile;

pub use chrome_finder::ChromeFinder;
pub use error::{Error, Result};
pub use fetcher::{ChallengeOutcome, FetchReport, LaunchOptions, fetch_and_save, fetch_with};
pub use launcher::{BrowserSession, ChromeLauncher};
pub use network_idle::{IdlePolicy, InflightTracker};
pub use page::{ChromePage, PageDriver};
pub use profile::ProfileManager;
