use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpendwatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No usable records: {0}")]
    NoData(String),

    #[error("Detector has not been trained; run train() before detect()")]
    NotTrained,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SpendwatchError>;
