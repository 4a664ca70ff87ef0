use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid output name '{name}': {reason}")]
    InvalidOutputName { name: String, reason: &'static str },

    #[error("Invalid content selector '{0}'")]
    InvalidSelector(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
