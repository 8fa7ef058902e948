//! # `TaintWrap`
//!
//! `taintwrap` is the main crate of the `TaintWrap` project, a summary-based
//! taint wrapper for interprocedural taint analysis. The project is
//! subdivided into multiple crates, `taintwrap` acts as entry point by
//! reexporting important structs and functions from those sub-crates. Most of
//! the reexport are done within the `taintwrap::prelude` namespace.
//!
//! ## Library basics
//!
//! A taint analysis hands the calls it cannot or does not want to analyze to
//! a [`TaintWrapper`](analysis::infoflow::TaintWrapper). The
//! [`SummaryTaintWrapper`](analysis::summary_wrapper::SummaryTaintWrapper)
//! answers from flow summaries of library methods:
//!
//! ```rust
//! use std::sync::Arc;
//! use taintwrap::prelude::*;
//!
//! let mut summaries = MemorySummaries::new();
//! summaries.add_flow(
//!     "java.lang.StringBuilder",
//!     MethodFlow::new(
//!         "java.lang.StringBuilder append(java.lang.String)",
//!         FlowSinkSource::parameter(0, "java.lang.String"),
//!         FlowSinkSource::field("java.lang.StringBuilder"),
//!         false,
//!     ),
//! );
//! let wrapper = SummaryTaintWrapper::new(Arc::new(summaries), WrapperOptions::default());
//! let append = MethodSignature::parse(
//!     "<java.lang.StringBuilder: java.lang.StringBuilder append(java.lang.String)>",
//! )?;
//! assert!(wrapper.supports_callee_method(&append));
//! # Ok::<(), TwError>(())
//! ```
//!
//! Before answering queries, the wrapper must be bound to the analysis with
//! [`TaintWrapper::initialize`](analysis::infoflow::TaintWrapper::initialize),
//! which gives it access to the control flow graph, the class hierarchy and
//! the solver.
//!
//! ## Sub-crates
//!
//!  - [`tw_summary`] contains the flow summaries data model and the
//!    [`SummaryProvider`](summary::SummaryProvider) trait,
//!  - [`tw_analysis`] contains the program model, the class hierarchy and the
//!    summary application engine,
//!  - [`tw_utils`] contains the concurrent containers the other crates rely on.

mod errors;

pub use tw_analysis as analysis;
pub use tw_summary as summary;
pub use tw_utils as utils;

use serde::Deserialize;

/// Logging configuration, usually filled from command line flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogOptions {
    /// Enables all the logs, trace level included.
    pub verbose: bool,
    /// Enables logs up to the debug level.
    pub debug: bool,
}

/// Reexport module of commonly used structures and functions from `TaintWrap`
/// project sub-crates:
///
/// ```rust
/// use taintwrap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::errors::{TwError, TwResult};
    pub use crate::LogOptions;

    pub use tw_analysis::hierarchy::{ClassKind, Hierarchy, TypeHierarchy};
    pub use tw_analysis::infoflow::{
        AccessPath, Abstraction, FollowReturnsPastSeedsHandler, ForwardSolver, InfoflowManager,
        PathEdge, TaintWrapper, WrapperOptions,
    };
    pub use tw_analysis::program::{Icfg, Program};
    pub use tw_analysis::summary_wrapper::SummaryTaintWrapper;

    pub use tw_summary::{
        ClassRecord, FlowSinkSource, GapDefinition, MemorySummaries, MethodFlow, MethodSignature,
        SummaryProvider,
    };

    /// Initializes the global logger. The level is read from the `TW_LOG`
    /// environment variable (`info` by default) unless overridden by the
    /// options.
    pub fn init_logger(opts: &LogOptions) {
        let env = env_logger::Env::new()
            .filter_or("TW_LOG", "info")
            .write_style("TW_LOG_STYLE");

        let mut builder = env_logger::Builder::from_env(env);
        if opts.verbose {
            builder.filter_level(log::LevelFilter::Trace);
        } else if opts.debug {
            builder.filter_level(log::LevelFilter::Debug);
        }
        if builder.try_init().is_err() {
            log::debug!("logger already initialized");
        }
    }
}
