//! Summary lookup for call sites and gaps.

use crate::hierarchy::TypeHierarchy;
use crate::infoflow::InfoflowManager;
use crate::program::{Icfg, InvokeExpr, MethodUid, StmtUid};
use crate::summary_wrapper::SummaryTaintWrapper;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use tw_summary::{ClassSummaries, GapDefinition, MethodFlow, MethodSignature, SummaryProvider};

/// Walks the given class and all the types inheriting from it, directly or
/// not, calling `visit` once on each of them.
fn walk_children<F>(hierarchy: &dyn TypeHierarchy, class_name: &str, mut visit: F)
where
    F: FnMut(&str, bool),
{
    let mut work_list = VecDeque::from([class_name.to_string()]);
    let mut done = BTreeSet::new();
    while let Some(cur) = work_list.pop_front() {
        if !done.insert(cur.clone()) {
            continue;
        }
        let is_interface = hierarchy.is_interface(&cur);
        if is_interface {
            work_list.extend(hierarchy.direct_implementers(&cur));
            work_list.extend(hierarchy.direct_subinterfaces(&cur));
        } else {
            work_list.extend(hierarchy.direct_subclasses(&cur));
        }
        visit(&cur, is_interface);
    }
}

/// The classes that may be the runtime type of a value of the given static
/// type: the class itself and its subclasses, or all the classes
/// implementing an interface. Interfaces are never part of the result.
pub(crate) fn all_child_classes(hierarchy: &dyn TypeHierarchy, class_name: &str) -> BTreeSet<String> {
    let mut classes = BTreeSet::new();
    walk_children(hierarchy, class_name, |class, is_interface| {
        if !is_interface {
            classes.insert(class.to_string());
        }
    });
    classes
}

/// All the methods overriding or implementing the given one, itself
/// included.
pub(crate) fn all_implementors(
    icfg: &dyn Icfg,
    hierarchy: &dyn TypeHierarchy,
    method: MethodUid,
) -> BTreeSet<MethodUid> {
    let m = icfg.method(method);
    let sub_signature = m.sub_signature();
    let mut implementors = BTreeSet::new();
    walk_children(hierarchy, m.class_name(), |class, _| {
        if let Some(implementor) = icfg.find_method_in_class(class, &sub_signature) {
            implementors.insert(implementor);
        }
    });
    implementors
}

impl SummaryTaintWrapper {
    fn query_summaries(&self, classes: BTreeSet<String>, sub_signature: &str) -> Arc<ClassSummaries> {
        self.summaries
            .get_or_compute((classes, sub_signature.to_string()), |(classes, sub_signature)| {
                log::trace!("querying summaries of {sub_signature} in {} classes", classes.len());
                Arc::new(self.provider.method_flows(classes, sub_signature))
            })
    }

    /// Summaries of `method` for every class that may declare the code
    /// actually run.
    ///
    /// At a call site, the declaring classes of the callees given by the
    /// call graph are tried first. Otherwise, the static type of the
    /// receiver of the call, or the declaring class of the method, is used.
    pub(crate) fn summaries_for_method(
        &self,
        manager: &InfoflowManager,
        stmt: Option<StmtUid>,
        method: &MethodSignature,
    ) -> Arc<ClassSummaries> {
        let icfg = manager.icfg();
        let hierarchy = manager.hierarchy();
        let sub_signature = method.sub_signature();

        if let Some(stmt) = stmt {
            let classes: BTreeSet<String> = icfg
                .callees_of_call_at(stmt)
                .into_iter()
                .flat_map(|callee| all_child_classes(hierarchy, icfg.method(callee).class_name()))
                .collect();
            if !classes.is_empty() {
                let summaries = self.query_summaries(classes, &sub_signature);
                if !summaries.is_empty() {
                    return summaries;
                }
            }
        }

        let target_class = stmt
            .and_then(|stmt| icfg.stmt(stmt).invoke_expr())
            .and_then(InvokeExpr::base)
            .and_then(|base| icfg.local_type(base))
            .and_then(|t| t.class_name().map(str::to_string))
            .unwrap_or_else(|| method.class_name().to_string());
        self.query_summaries(all_child_classes(hierarchy, &target_class), &sub_signature)
    }

    /// Flows of the method invoked in a gap.
    pub(crate) fn flows_for_gap(&self, manager: &InfoflowManager, gap: &GapDefinition) -> BTreeSet<MethodFlow> {
        let icfg = manager.icfg();
        if let Some(method) = icfg.find_method(gap.signature()) {
            let flows = self
                .summaries_for_method(manager, None, icfg.method(method).signature())
                .all_flows();
            if !flows.is_empty() {
                return flows;
            }
        }
        match self.provider.flows_for_signature(gap.signature()) {
            Ok(flows) => flows,
            Err(err) => {
                log::warn!("cannot look up summaries of {gap}: {err}");
                BTreeSet::new()
            }
        }
    }
}
