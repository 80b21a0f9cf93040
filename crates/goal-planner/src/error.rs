use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoalError {
    #[error("Malformed goal data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid goal {name}: {reason}")]
    InvalidGoal { name: String, reason: String },
}
