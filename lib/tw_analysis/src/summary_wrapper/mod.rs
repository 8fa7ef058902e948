//! Taint wrapper applying flow summaries of library methods.
//!
//! At a call into a summarized method, the incoming taint is converted into
//! abstract [`Taint`]s, which are driven through the flows of the callee by
//! [`Propagator`]s. A flow may lead into a gap, a callback whose code is
//! provided by the analyzed application: propagators then form a stack of
//! frames, one per gap entered. Gaps without summaries are analyzed by the
//! solver itself, the summary application being resumed when the solver
//! reaches the end of the callback.

mod apply;
mod conversion;
mod gaps;
mod handler;
mod lookup;
mod propagator;
mod worklist;

pub use apply::{add_sink_taint, apply_flow, compare_fields, is_cast_compatible};
pub use propagator::{CallSite, Propagator, PropagatorArena, PropagatorId};
use propagator::Continuation;

use crate::errors::{AnalysisError, AnalysisResult};
use crate::infoflow::{Abstraction, InfoflowManager, TaintWrapper, WrapperOptions};
use crate::program::{MethodUid, StmtUid};
use conversion::taints_on_call;
use dashmap::DashMap;
use handler::SummaryFrpsHandler;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use tw_summary::{ClassSummaries, MethodSignature, SummaryProvider, Taint};
use tw_utils::{ComputingCache, ConcurrentMultiMap};

/// Summaries of one sub-signature, for a set of candidate classes.
type SummaryCache = ComputingCache<(BTreeSet<String>, String), Arc<ClassSummaries>>;

pub struct SummaryTaintWrapper {
    provider: Arc<dyn SummaryProvider>,
    options: WrapperOptions,
    fallback: Option<Arc<dyn TaintWrapper>>,
    manager: OnceLock<InfoflowManager>,
    summaries: SummaryCache,
    /// Propagators waiting for the solver to reach the end of a gap
    /// implementation, by seed fact and method.
    user_code_taints: ConcurrentMultiMap<(Abstraction, MethodUid), Continuation>,
    body_locks: DashMap<MethodUid, Arc<Mutex<()>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl SummaryTaintWrapper {
    #[must_use]
    pub fn new(provider: Arc<dyn SummaryProvider>, options: WrapperOptions) -> Self {
        Self {
            provider,
            options,
            fallback: None,
            manager: OnceLock::new(),
            summaries: ComputingCache::new(),
            user_code_taints: ConcurrentMultiMap::new(),
            body_locks: DashMap::new(),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Delegates calls without summaries to another wrapper. The fallback
    /// must be initialized by the caller.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn TaintWrapper>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// # Errors
    ///
    /// Fails when the wrapper has not been initialized yet.
    pub fn manager(&self) -> AnalysisResult<&InfoflowManager> {
        self.manager.get().ok_or(AnalysisError::Uninitialized)
    }

    #[inline]
    pub fn options(&self) -> &WrapperOptions {
        &self.options
    }

    /// Number of (seed, method) pairs with propagators waiting for the
    /// solver.
    pub fn nb_pending_continuations(&self) -> usize {
        self.user_code_taints.len()
    }

    /// Number of propagators kept alive by pending continuations.
    pub fn nb_retained_propagators(&self) -> usize {
        let arenas: BTreeMap<usize, Arc<PropagatorArena>> = self
            .user_code_taints
            .values()
            .into_iter()
            .map(|continuation| (continuation.arena.serial(), continuation.arena))
            .collect();
        arenas.values().map(|arena| arena.len()).sum()
    }

    /// Number of actual queries to the summary provider.
    pub fn summary_cache_misses(&self) -> usize {
        self.summaries.misses()
    }

    fn propagate(
        &self,
        stmt: StmtUid,
        d1: &Abstraction,
        tainted: &Abstraction,
        alias: bool,
    ) -> AnalysisResult<Option<BTreeSet<Abstraction>>> {
        let manager = self.manager()?;
        let icfg = manager.icfg();
        let Some(expr) = icfg.stmt(stmt).invoke_expr() else {
            return Ok(Some(BTreeSet::from([tainted.clone()])));
        };
        let callee = expr.method();

        let summaries = self.summaries_for_method(manager, Some(stmt), callee);
        if summaries.is_empty() {
            if !alias {
                self.misses.fetch_add(1, Ordering::Relaxed);
                if self.options.report_missing_summaries && self.options.is_system_class(callee.class_name()) {
                    log::warn!("missing summary for {callee}");
                }
            }
            return match &self.fallback {
                Some(fallback) if alias => fallback.aliases_for_method(stmt, d1, tainted),
                Some(fallback) => fallback.taints_for_method(stmt, d1, tainted),
                None => Ok(None),
            };
        }
        if !alias {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }

        let taints = taints_on_call(icfg, tainted.access_path(), stmt, alias);
        let mut res = BTreeSet::from([tainted.clone()]);
        if taints.is_empty() {
            return Ok(Some(res));
        }

        let sub_signature = callee.sub_signature();
        let call_site = CallSite::new(stmt, d1.clone(), tainted.clone());
        let arena = Arc::new(PropagatorArena::new());
        for class_name in summaries.classes() {
            let Some(flows) = summaries
                .class_summaries(class_name)
                .and_then(|s| s.flows_for_method(&sub_signature))
            else {
                continue;
            };
            let initial = taints
                .iter()
                .map(|taint: &Taint| arena.intern(Propagator::root(taint.clone(), call_site.clone(), alias)))
                .collect();
            if let Some(aps) = self.apply_flows_iterative(manager, &arena, flows, initial)? {
                res.extend(aps.into_iter().map(|ap| tainted.derive_new_abstraction(ap, stmt)));
            }
        }
        log::trace!("{} facts after {callee} from {tainted}", res.len());
        Ok(Some(res))
    }
}

impl TaintWrapper for SummaryTaintWrapper {
    fn initialize(self: Arc<Self>, manager: InfoflowManager) -> AnalysisResult<()> {
        self.manager
            .set(manager)
            .map_err(|_| AnalysisError::Internal("taint wrapper initialized twice".to_string()))?;
        let manager = self.manager()?;

        let loadable = self.provider.loadable_classes();
        let supported = self.provider.supported_classes();
        for class_name in loadable.iter().chain(supported.iter()) {
            manager.hierarchy().ensure_class(class_name);
        }

        let handler = SummaryFrpsHandler::new(Arc::downgrade(&self));
        manager
            .forward_solver()
            .set_follow_returns_past_seeds_handler(Arc::new(handler));
        log::info!(
            "summary taint wrapper initialized with {} loadable and {} supported classes",
            loadable.len(),
            supported.len()
        );
        Ok(())
    }

    fn taints_for_method(
        &self,
        stmt: StmtUid,
        d1: &Abstraction,
        tainted: &Abstraction,
    ) -> AnalysisResult<Option<BTreeSet<Abstraction>>> {
        self.propagate(stmt, d1, tainted, false)
    }

    fn aliases_for_method(
        &self,
        stmt: StmtUid,
        d1: &Abstraction,
        tainted: &Abstraction,
    ) -> AnalysisResult<Option<BTreeSet<Abstraction>>> {
        self.propagate(stmt, d1, tainted, true)
    }

    fn is_exclusive(&self, stmt: StmtUid, tainted: &Abstraction) -> bool {
        self.supports_callee_stmt(stmt)
            || self
                .fallback
                .as_ref()
                .map_or(false, |fallback| fallback.is_exclusive(stmt, tainted))
    }

    fn supports_callee_method(&self, method: &MethodSignature) -> bool {
        self.provider.supports_class(method.class_name())
    }

    fn supports_callee_stmt(&self, stmt: StmtUid) -> bool {
        let Ok(manager) = self.manager() else { return false };
        manager
            .icfg()
            .stmt(stmt)
            .invoke_expr()
            .map_or(false, |expr| self.supports_callee_method(expr.method()))
    }

    fn wrapper_hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    fn wrapper_misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::TypeHierarchy;
    use crate::infoflow::AccessPath;
    use crate::testing::{self, Scenario};
    use tw_summary::MemorySummaries;

    fn has_ap(res: &BTreeSet<Abstraction>, base: crate::program::Local, fields: &[&str]) -> bool {
        res.iter().any(|abs| {
            let ap: &AccessPath = abs.access_path();
            ap.plain_value() == base
                && ap.fields().len() == fields.len()
                && ap
                    .fields()
                    .iter()
                    .zip(fields)
                    .all(|(f, expected)| f.field().to_string() == *expected)
        })
    }

    #[test]
    fn test_identity() {
        let s = Scenario::new();
        let wrapper = s.wrapper(testing::summaries());
        let x = s.abs_field("x", testing::BUF, "java.lang.String");

        let res = wrapper.taints_for_method(s.id_call, &x, &x).unwrap().unwrap();
        assert_eq!(res.len(), 2);
        assert!(res.contains(&x));
        assert!(has_ap(&res, s.local("r"), &[testing::BUF]));
        assert_eq!(wrapper.wrapper_hits(), 1);
        assert_eq!(wrapper.wrapper_misses(), 0);
    }

    #[test]
    fn test_field_write() {
        let s = Scenario::new();
        let wrapper = s.wrapper(testing::summaries());
        let h = s.abs_field("h", testing::BUF, "java.lang.String");

        let res = wrapper.taints_for_method(s.write_call, &h, &h).unwrap().unwrap();
        assert!(res.contains(&h));
        assert!(has_ap(&res, s.local("buf"), &[testing::DATA]));

        // a tainted holder taints all its fields
        let h = s.abs("h");
        let res = wrapper.taints_for_method(s.write_call, &h, &h).unwrap().unwrap();
        assert_eq!(res.len(), 2);
        assert!(has_ap(&res, s.local("buf"), &[testing::DATA]));

        let buf = s.abs("buf");
        let res = wrapper.taints_for_method(s.write_call, &buf, &buf).unwrap().unwrap();
        assert_eq!(res, BTreeSet::from([buf]));
    }

    #[test]
    fn test_aliases() {
        let s = Scenario::new();
        let wrapper = s.wrapper(testing::summaries());
        let o = s.abs("o");

        let res = wrapper.aliases_for_method(s.get_call, &o, &o).unwrap().unwrap();
        assert!(res.contains(&o));
        assert!(has_ap(&res, s.local("box"), &[testing::VALUE]));
        // alias queries are not counted
        assert_eq!(wrapper.wrapper_hits(), 0);
    }

    #[test]
    fn test_primitive_values_have_no_alias() {
        let s = Scenario::new();
        let wrapper = s.wrapper(testing::summaries());
        let dd = s.abs("dd");

        let res = wrapper.aliases_for_method(s.get_d_call, &dd, &dd).unwrap().unwrap();
        assert_eq!(res, BTreeSet::from([dd]));
        assert_eq!(wrapper.nb_retained_propagators(), 0);
    }

    #[test]
    fn test_untouched_taint_is_kept() {
        let s = Scenario::new();
        let wrapper = s.wrapper(testing::summaries());
        let v = s.abs("v");
        let res = wrapper.taints_for_method(s.id_call, &v, &v).unwrap().unwrap();
        assert_eq!(res, BTreeSet::from([v.clone()]));
        let res = wrapper.taints_for_method(s.exit, &v, &v).unwrap().unwrap();
        assert_eq!(res, BTreeSet::from([v]));
        assert_eq!(wrapper.nb_retained_propagators(), 0);
    }

    #[test]
    fn test_unsupported_callee() {
        let s = Scenario::new();
        let wrapper = s.wrapper_with(MemorySummaries::new(), WrapperOptions::verbose());
        let x = s.abs("x");
        assert!(wrapper.taints_for_method(s.id_call, &x, &x).unwrap().is_none());
        assert!(wrapper.aliases_for_method(s.id_call, &x, &x).unwrap().is_none());
        assert_eq!(wrapper.wrapper_misses(), 1);
        assert!(!wrapper.supports_callee_stmt(s.id_call));
        assert!(!wrapper.is_exclusive(s.id_call, &x));
    }

    #[test]
    fn test_fallback() {
        let s = Scenario::new();
        let fallback = s.wrapper(testing::summaries());
        let wrapper = Arc::new(
            SummaryTaintWrapper::new(Arc::new(MemorySummaries::new()), WrapperOptions::default())
                .with_fallback(fallback.clone()),
        );
        Arc::clone(&wrapper).initialize(s.manager()).unwrap();

        let x = s.abs_field("x", testing::BUF, "java.lang.String");
        let res = wrapper.taints_for_method(s.id_call, &x, &x).unwrap().unwrap();
        assert!(has_ap(&res, s.local("r"), &[testing::BUF]));
        assert_eq!(wrapper.wrapper_misses(), 1);
        assert_eq!(fallback.wrapper_hits(), 1);
        assert!(wrapper.is_exclusive(s.id_call, &x));
    }

    #[test]
    fn test_uninitialized() {
        let s = Scenario::new();
        let wrapper = SummaryTaintWrapper::new(Arc::new(testing::summaries()), WrapperOptions::default());
        let x = s.abs("x");
        assert!(matches!(
            wrapper.taints_for_method(s.id_call, &x, &x),
            Err(AnalysisError::Uninitialized)
        ));
        assert!(!wrapper.supports_callee_stmt(s.id_call));
    }

    #[test]
    fn test_initialize() {
        let s = Scenario::new();
        assert!(!s.solver.has_handler());
        let wrapper = s.wrapper(testing::summaries());
        assert!(s.solver.has_handler());
        assert!(s.hierarchy.contains_class("lib.Extra"));
        assert!(s.hierarchy.is_phantom("lib.Extra"));
        assert!(!s.hierarchy.is_phantom("lib.Box"));
        assert!(wrapper.supports_callee_stmt(s.get_call));
        assert!(wrapper.supports_callee_method(&MethodSignature::parse(testing::GET).unwrap()));

        assert!(matches!(
            Arc::clone(&wrapper).initialize(s.manager()),
            Err(AnalysisError::Internal(_))
        ));
    }

    #[test]
    fn test_summaries_are_cached() {
        let s = Scenario::new();
        let wrapper = s.wrapper(testing::summaries());
        let x = s.abs("x");
        for _ in 0..3 {
            wrapper.taints_for_method(s.id_call, &x, &x).unwrap();
        }
        assert_eq!(wrapper.summary_cache_misses(), 1);
        assert_eq!(wrapper.wrapper_hits(), 3);
    }

    #[test]
    fn test_propagators_released_after_query() {
        let s = Scenario::new();
        let wrapper = s.wrapper(testing::summaries());
        let h = s.abs_field("h", testing::BUF, "java.lang.String");
        for name in ["x", "r", "v", "o", "dd"] {
            let d1 = s.abs(name);
            wrapper.taints_for_method(s.write_call, &d1, &h).unwrap();
            assert_eq!(wrapper.nb_retained_propagators(), 0);
        }

        // a callback keeps its stack until the solver reaches its end
        let l = s.abs("l");
        wrapper.taints_for_method(s.dispatch_call, &l, &l).unwrap();
        assert_eq!(wrapper.nb_retained_propagators(), 2);
        let v = s.abs("v");
        wrapper.taints_for_method(s.id_call, &v, &s.abs("x")).unwrap();
        assert_eq!(wrapper.nb_retained_propagators(), 2);
    }

    #[test]
    fn test_deterministic() {
        let run = || {
            let s = Scenario::new();
            let wrapper = s.wrapper(testing::summaries());
            let o = s.abs("o");
            let h = s.abs_field("h", testing::BUF, "java.lang.String");
            (
                wrapper.aliases_for_method(s.get_call, &o, &o).unwrap(),
                wrapper.taints_for_method(s.write_call, &h, &h).unwrap(),
            )
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_concurrent_queries() {
        use rayon::prelude::*;

        let s = Scenario::new();
        let wrapper = s.wrapper(testing::summaries());
        let x = s.abs_field("x", testing::BUF, "java.lang.String");
        let h = s.abs_field("h", testing::BUF, "java.lang.String");
        let queries = [(s.id_call, x), (s.write_call, h)];
        let expected: Vec<_> = queries
            .iter()
            .map(|(stmt, abs)| wrapper.taints_for_method(*stmt, abs, abs).unwrap())
            .collect();

        (0..64).into_par_iter().for_each(|i| {
            let (stmt, abs) = &queries[i % 2];
            assert_eq!(wrapper.taints_for_method(*stmt, abs, abs).unwrap(), expected[i % 2]);
        });
        assert_eq!(wrapper.summary_cache_misses(), 2);
        assert_eq!(wrapper.wrapper_hits(), 66);
    }
}
