use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("Unknown fund category: {0}")]
    UnknownCategory(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
