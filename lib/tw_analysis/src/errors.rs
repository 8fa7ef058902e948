//! Analysis errors definition.
//!
//! Not-applicable flows and unsupported callees are not errors: they are
//! reported through `Option` results. The variants below are contract
//! violations, they must abort the current query.

use crate::program::StmtUid;
use thiserror::Error;
use tw_summary::errors::SummaryError;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("internal error: {0}")]
    Internal(String),

    #[error("summary error: {0}")]
    Summary(#[from] SummaryError),

    #[error("class not found: {0}")]
    ClassNotFound(String),

    #[error("gap flow without parent detected: {0}")]
    GapWithoutParent(String),

    #[error("a return value cannot be propagated into a method: {0}")]
    ReturnIntoMethod(String),

    #[error("could not convert {taint} to an access path at {stmt}")]
    TaintConversion { taint: String, stmt: String },

    #[error("statement is not a method call: {0}")]
    NotAnInvoke(StmtUid),

    #[error("method {0} has no body")]
    NoCode(String),

    #[error("taint wrapper used before initialization")]
    Uninitialized,
}
