//! Fixed point application of summaries.

use crate::errors::{AnalysisError, AnalysisResult};
use crate::infoflow::{AccessPath, InfoflowManager};
use crate::summary_wrapper::apply::apply_flow;
use crate::summary_wrapper::conversion::access_path_from_taint;
use crate::summary_wrapper::propagator::{has_heap_taint, Propagator, PropagatorArena, PropagatorId};
use crate::summary_wrapper::SummaryTaintWrapper;
use crate::types::can_type_alias;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use tw_summary::{MethodFlow, PathShape};

struct WorkList {
    queue: VecDeque<PropagatorId>,
    done: BTreeSet<PropagatorId>,
}

impl WorkList {
    fn new(initial: Vec<PropagatorId>) -> Self {
        Self {
            done: initial.iter().copied().collect(),
            queue: initial.into(),
        }
    }

    fn push(&mut self, arena: &PropagatorArena, propagator: Propagator) {
        let id = arena.intern(propagator);
        if self.done.insert(id) {
            self.queue.push_back(id);
        }
    }
}

impl SummaryTaintWrapper {
    /// Applies the given flows, and the flows of the gaps they lead to,
    /// until no new propagator is produced.
    ///
    /// `flows_in_callee` are the flows of the method called at the root of
    /// the stacks, the flows of gaps are looked up when needed. Returns the
    /// access paths tainted at the original call sites, or `None` when no
    /// flow produced any.
    pub(crate) fn apply_flows_iterative(
        &self,
        manager: &InfoflowManager,
        arena: &Arc<PropagatorArena>,
        flows_in_callee: &BTreeSet<MethodFlow>,
        initial: Vec<PropagatorId>,
    ) -> AnalysisResult<Option<BTreeSet<AccessPath>>> {
        let hierarchy = manager.hierarchy();
        let mut res: Option<BTreeSet<AccessPath>> = None;
        let mut work_list = WorkList::new(initial);
        let mut steps = 0;

        while let Some(id) = work_list.queue.pop_front() {
            if let Some(max_steps) = self.options.max_steps {
                if steps >= max_steps {
                    log::warn!(
                        "summary application stopped after {steps} steps, {} propagators left",
                        work_list.queue.len() + 1
                    );
                    break;
                }
            }
            steps += 1;

            let current = arena.get(id);
            log::trace!("applying summaries to {current} at depth {}", arena.depth(id));
            if current.gap().is_some() && current.parent().is_none() {
                return Err(AnalysisError::GapWithoutParent(current.to_string()));
            }

            let gap_flows;
            let flows = match current.gap() {
                None => flows_in_callee,
                Some(gap) => {
                    gap_flows = self.flows_for_gap(manager, gap);
                    &gap_flows
                }
            };

            // without summaries for the gap, look for its implementations in
            // the analyzed code
            if flows.is_empty() && current.gap().is_some() {
                for propagator in self.resolve_gap(manager, arena, id)? {
                    work_list.push(arena, propagator);
                }
            }

            for flow in flows {
                let reversed;
                let flow = if current.is_inverse() {
                    if !flow.is_alias()
                        || !can_type_alias(flow.source().last_field_type())
                        || !can_type_alias(flow.sink().last_field_type())
                    {
                        continue;
                    }
                    reversed = flow.reverse();
                    &reversed
                } else {
                    flow
                };

                let Some(new_propagator) = apply_flow(hierarchy, arena, flow, id) else {
                    continue;
                };

                if new_propagator.parent().is_none() && new_propagator.taint().gap().is_none() {
                    let stmt = new_propagator
                        .call_site()
                        .map(|site| site.stmt)
                        .ok_or_else(|| {
                            AnalysisError::Internal(format!("root propagator without call site: {new_propagator}"))
                        })?;
                    let Some(ap) = access_path_from_taint(manager.icfg(), hierarchy, new_propagator.taint(), stmt)?
                    else {
                        continue;
                    };
                    log::trace!("{flow} taints {ap}");
                    res.get_or_insert_with(BTreeSet::new).insert(ap);
                }

                // heap locations may have aliases
                let inverse = (has_heap_taint(&new_propagator)
                    && can_type_alias(new_propagator.taint().last_field_type()))
                .then(|| new_propagator.derive_inverse());
                work_list.push(arena, new_propagator);
                if let Some(inverse) = inverse {
                    work_list.push(arena, inverse);
                }
            }
        }
        Ok(res)
    }
}
