//! This crate provides the summary-based taint propagation engine of the
//! `TaintWrap` project.
//!
//! When an interprocedural taint analysis reaches a call into library code,
//! the [`summary_wrapper::SummaryTaintWrapper`] replays the precomputed flow
//! summaries of the callee instead of analyzing its body. Callbacks into
//! caller-supplied code (gaps) are analyzed on demand by the external solver
//! and resumed through a continuation.

pub mod errors;
pub mod hierarchy;
pub mod infoflow;
pub mod program;
pub mod summary_wrapper;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;
