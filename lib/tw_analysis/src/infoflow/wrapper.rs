use crate::errors::AnalysisResult;
use crate::infoflow::{Abstraction, InfoflowManager};
use crate::program::StmtUid;
use std::collections::BTreeSet;
use std::sync::Arc;
use tw_summary::MethodSignature;

/// A component computing the effect of library calls on taints, in place
/// of the normal analysis of the callee.
///
/// Both queries return `Ok(None)` when the wrapper does not know the
/// callee: the solver must then analyze the call normally. A supported
/// call always yields a set containing at least the incoming fact.
pub trait TaintWrapper: Send + Sync {
    /// Binds the wrapper to the analysis it serves.
    ///
    /// # Errors
    ///
    /// Fails when the wrapper has already been initialized.
    fn initialize(self: Arc<Self>, manager: InfoflowManager) -> AnalysisResult<()>;

    /// Facts holding after the call `stmt` when `tainted` holds before it,
    /// in the context `d1`.
    fn taints_for_method(
        &self,
        stmt: StmtUid,
        d1: &Abstraction,
        tainted: &Abstraction,
    ) -> AnalysisResult<Option<BTreeSet<Abstraction>>>;

    /// Facts aliasing `tainted` through the call `stmt`, the value returned
    /// by the call included.
    fn aliases_for_method(
        &self,
        stmt: StmtUid,
        d1: &Abstraction,
        tainted: &Abstraction,
    ) -> AnalysisResult<Option<BTreeSet<Abstraction>>>;

    /// Checks whether the wrapper takes full responsibility for the call,
    /// so that the callee does not need to be analyzed.
    fn is_exclusive(&self, stmt: StmtUid, tainted: &Abstraction) -> bool;

    fn supports_callee_method(&self, method: &MethodSignature) -> bool;

    fn supports_callee_stmt(&self, stmt: StmtUid) -> bool;

    fn wrapper_hits(&self) -> usize;

    fn wrapper_misses(&self) -> usize;
}
