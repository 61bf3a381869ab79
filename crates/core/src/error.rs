use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForkJoinError {
    #[error("Invalid range [{start}, {end}) for sequence of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("Invalid threshold {0}: must be greater than zero")]
    InvalidThreshold(usize),

    #[error("Worker pool build failed: {0}")]
    PoolBuild(String),

    #[error("Task panicked: {0}")]
    TaskPanicked(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ForkJoinError>;
