//! Domain errors

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum FlowError {
    #[error("Invalid digit input: {0:?}")]
    InvalidDigits(String),

    #[error("Flow already completed")]
    Completed,

    #[error("Unknown call flow: {0}")]
    UnknownFlow(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
