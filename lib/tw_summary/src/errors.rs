//! Summaries errors definition.

use thiserror::Error;

pub type SummaryResult<T> = Result<T, SummaryError>;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("invalid method signature: {0}")]
    InvalidMethodSignature(String),

    #[error("invalid field signature: {0}")]
    InvalidFieldSignature(String),

    #[error("flow for {method} is attached to class {class} but declares no sub-signature")]
    MissingMethod { class: String, method: String },
}
