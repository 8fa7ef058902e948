//! Global error handling.
//!
//! Each sub-crate of the project defines its own type error.
//! Their types can be unified, for example in a main function,
//! when winding results at the top-level.
//!
//! ```rust
//! use taintwrap::prelude::*;
//!
//! fn main() -> TwResult<()> { // can return a TwError
//!    let _sig = MethodSignature::parse("<a.B: void c()>")?; // can return a SummaryError
//!    Ok(())
//! }
//! ```

use thiserror::Error;
use tw_analysis::errors::AnalysisError;
use tw_summary::errors::SummaryError;

/// An alias for result that can be a [`TwError`].
pub type TwResult<T> = Result<T, TwError>;

/// The main error type for error winding at the top-level.
/// It mainly consists of transparent wrapper over error types that
/// are defined in dependencies.
#[derive(Debug, Error)]
pub enum TwError {
    /// Error that can be returned from [`tw_analysis`] functions.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Error that can be returned from [`tw_summary`] functions.
    #[error(transparent)]
    Summary(#[from] SummaryError),
}
