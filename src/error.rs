use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid taps: {0}")]
    InvalidTaps(String),

    #[error("Tap file error: {0}")]
    Config(String),

    #[error("Filter block is gone")]
    BlockGone,
}

pub type Result<T> = std::result::Result<T, FilterError>;
