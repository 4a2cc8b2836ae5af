use thiserror::Error;

#[derive(Error, Debug)]
pub enum CycleError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}
