//! This crate provides the method flow summaries data structures for
//! the `TaintWrap` project: the shapes of summary endpoints, the taints
//! propagated through them, and the read-only provider interface that
//! serves summaries to the analysis.

pub mod errors;
pub mod flow;
pub mod gap;
pub mod provider;
pub mod signature;
pub mod source_sink;
pub mod summaries;
pub mod taint;

pub use flow::MethodFlow;
pub use gap::GapDefinition;
pub use provider::{ClassRecord, MemorySummaries, SummaryProvider};
pub use signature::{FieldSignature, MethodSignature};
pub use source_sink::{FieldStep, FlowSinkSource, PathShape, SourceSinkType};
pub use summaries::{ClassSummaries, MethodSummaries};
pub use taint::Taint;
