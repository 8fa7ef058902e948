//! Continuation of the summary application once the solver has analyzed a
//! gap implementation.

use crate::errors::{AnalysisError, AnalysisResult};
use crate::infoflow::{Abstraction, FollowReturnsPastSeedsHandler, InfoflowManager, PathEdge};
use crate::program::StmtUid;
use crate::summary_wrapper::conversion::taints_on_return;
use crate::summary_wrapper::propagator::{leave_frame, CallSite, Continuation, Propagator, PropagatorId};
use crate::summary_wrapper::SummaryTaintWrapper;
use std::collections::BTreeSet;
use std::sync::Weak;
use tw_summary::MethodFlow;

/// Handler registered in the solver by [`SummaryTaintWrapper`].
///
/// The wrapper owns the solver through its manager, so the handler only
/// keeps a weak reference back to it.
pub(crate) struct SummaryFrpsHandler {
    wrapper: Weak<SummaryTaintWrapper>,
}

impl SummaryFrpsHandler {
    pub(crate) fn new(wrapper: Weak<SummaryTaintWrapper>) -> Self {
        Self { wrapper }
    }
}

impl FollowReturnsPastSeedsHandler for SummaryFrpsHandler {
    fn handle_follow_returns_past_seeds(
        &self,
        d1: &Abstraction,
        stmt: StmtUid,
        d2: &Abstraction,
    ) -> AnalysisResult<()> {
        match self.wrapper.upgrade() {
            Some(wrapper) => wrapper.resume_from_user_code(d1, stmt, d2),
            None => {
                log::debug!("taint wrapper dropped, ignoring exit of seed {d1}");
                Ok(())
            }
        }
    }
}

impl SummaryTaintWrapper {
    /// Flows of the method called at the call site of the stack bottom `root`.
    fn flows_in_original_callee(
        &self,
        manager: &InfoflowManager,
        root: &Propagator,
    ) -> AnalysisResult<BTreeSet<MethodFlow>> {
        let site = root_call_site(root)?;
        let callee = manager
            .icfg()
            .stmt(site.stmt)
            .invoke_expr()
            .ok_or(AnalysisError::NotAnInvoke(site.stmt))?
            .method();
        Ok(self
            .summaries_for_method(manager, Some(site.stmt), callee)
            .all_flows_for_method(&callee.sub_signature()))
    }

    /// Resumes the propagators waiting for the end of the method containing
    /// the exit `stmt`, reached by the solver with `d2` from the seed `d1`.
    ///
    /// Facts obtained at the original call sites are injected into the
    /// solver at the successors of these calls.
    pub(crate) fn resume_from_user_code(
        &self,
        d1: &Abstraction,
        stmt: StmtUid,
        d2: &Abstraction,
    ) -> AnalysisResult<()> {
        let manager = self.manager()?;
        let icfg = manager.icfg();
        let method = icfg.method_of(stmt);
        let Some(waiting) = self.user_code_taints.get(&(d1.clone(), method)) else {
            return Ok(());
        };

        for Continuation { arena, id } in waiting {
            let propagator = arena.get(id);
            if propagator.parent().is_none() {
                return Err(AnalysisError::GapWithoutParent(propagator.to_string()));
            }
            let taints = taints_on_return(icfg, d2.access_path(), stmt, propagator.gap());
            if taints.is_empty() {
                continue;
            }
            log::debug!("resuming {propagator} after {}", icfg.method(method));

            // flows of enclosing gaps are looked up by the work list itself
            let root = arena.get(arena.root_of(id));
            let flows = self.flows_in_original_callee(manager, &root)?;
            let initial: Vec<PropagatorId> = leave_frame(&arena, &propagator, taints)
                .into_iter()
                .map(|p: Propagator| arena.intern(p))
                .collect();
            let Some(aps) = self.apply_flows_iterative(manager, &arena, &flows, initial)? else {
                continue;
            };

            let site = root_call_site(&root)?;
            let succs = icfg.succs_of(site.stmt);
            for ap in aps {
                let abs = site.d2.derive_new_abstraction(ap, site.stmt);
                for succ in &succs {
                    manager
                        .forward_solver()
                        .process_edge(PathEdge::new(site.d1.clone(), *succ, abs.clone()));
                }
            }
        }
        Ok(())
    }
}

fn root_call_site(root: &Propagator) -> AnalysisResult<&CallSite> {
    root.call_site()
        .ok_or_else(|| AnalysisError::Internal(format!("root propagator without call site: {root}")))
}
