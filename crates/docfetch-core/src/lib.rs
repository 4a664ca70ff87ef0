pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod target_url;

pub use config::FetchConfig;
pub use error::{Error, Result};
pub use extract::{ContentRoot, ExtractConfig, Extracted, extract_text};
pub use output::{Artifacts, OutputTarget, SavedArtifacts};
pub use target_url::normalize_url;
