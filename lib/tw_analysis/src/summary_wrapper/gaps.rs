//! Analysis of gaps without summaries, by spawning the solver into the
//! analyzed code implementing them.

use crate::errors::AnalysisResult;
use crate::infoflow::{Abstraction, InfoflowManager, PathEdge};
use crate::program::{Icfg, MethodUid};
use crate::summary_wrapper::conversion::{access_path_in_method, taints_on_return};
use crate::summary_wrapper::lookup::all_implementors;
use crate::summary_wrapper::propagator::{leave_frame, Continuation, Propagator, PropagatorArena, PropagatorId};
use crate::summary_wrapper::SummaryTaintWrapper;
use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError};
use tw_summary::Taint;

impl SummaryTaintWrapper {
    /// Loads the body of `method` if needed. The body is retrieved at most
    /// once, even when several threads spawn into the same method.
    fn ensure_body(&self, icfg: &dyn Icfg, method: MethodUid) -> AnalysisResult<()> {
        if icfg.has_active_body(method) {
            return Ok(());
        }
        let lock = Arc::clone(self.body_locks.entry(method).or_default().value());
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if !icfg.has_active_body(method) {
            icfg.retrieve_active_body(method)?;
            icfg.notify_method_changed(method);
        }
        Ok(())
    }

    /// Spawns the analysis of the gap of propagator `id` in all the concrete
    /// methods implementing it.
    ///
    /// Returns the propagators leaving the gap that could be computed right
    /// away from already analyzed implementors.
    pub(crate) fn resolve_gap(
        &self,
        manager: &InfoflowManager,
        arena: &Arc<PropagatorArena>,
        id: PropagatorId,
    ) -> AnalysisResult<Vec<Propagator>> {
        let propagator = arena.get(id);
        let Some(gap) = propagator.gap() else { return Ok(Vec::new()) };
        let icfg = manager.icfg();
        let hierarchy = manager.hierarchy();

        let Some(callee) = icfg.find_method(gap.signature()) else {
            log::debug!("no summary nor code for {gap}");
            return Ok(Vec::new());
        };

        let mut res = Vec::new();
        for implementor in all_implementors(icfg, hierarchy, callee) {
            let m = icfg.method(implementor);
            if m.is_abstract() || !hierarchy.is_concrete(m.class_name()) || hierarchy.is_phantom(m.class_name()) {
                continue;
            }
            if let Some(propagators) = self.spawn_analysis_into_client_code(manager, implementor, arena, id)? {
                res.extend(propagators);
            }
        }
        Ok(res)
    }

    /// Injects the taint of propagator `id` at the start of `implementor`.
    ///
    /// The propagator is registered as waiting for the solver to reach the
    /// end of the method before the seed is injected, see
    /// [`SummaryTaintWrapper::resume_from_user_code`]. If the solver already
    /// knows the exit facts of the method for this seed, the corresponding
    /// propagators are also returned.
    fn spawn_analysis_into_client_code(
        &self,
        manager: &InfoflowManager,
        implementor: MethodUid,
        arena: &Arc<PropagatorArena>,
        id: PropagatorId,
    ) -> AnalysisResult<Option<Vec<Propagator>>> {
        let icfg = manager.icfg();
        let solver = manager.forward_solver();
        self.ensure_body(icfg, implementor)?;

        let propagator = arena.get(id);
        let Some(ap) = access_path_in_method(icfg, manager.hierarchy(), propagator.taint(), implementor)? else {
            return Ok(None);
        };
        let abs = Abstraction::new(ap);
        // the solver may reach the exit of the method as soon as the seed is
        // injected
        self.user_code_taints
            .put((abs.clone(), implementor), Continuation::new(arena, id));
        for start_point in icfg.start_points_of(implementor) {
            solver.process_edge(PathEdge::new(abs.clone(), start_point, abs.clone()));
        }
        log::debug!("spawned analysis of {} with {abs}", icfg.method(implementor));

        let Some(exits) = solver.end_summary(implementor, &abs).filter(|exits| !exits.is_empty()) else {
            return Ok(None);
        };
        let taints: BTreeSet<Taint> = exits
            .iter()
            .flat_map(|(stmt, d2)| taints_on_return(icfg, d2.access_path(), *stmt, propagator.gap()))
            .collect();
        Ok(Some(leave_frame(arena, &propagator, taints)))
    }
}
