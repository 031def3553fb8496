use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid separator pattern: {0}")]
    InvalidSeparator(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
