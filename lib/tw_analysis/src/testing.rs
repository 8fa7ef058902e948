//! Test fixtures: a recording solver, small hierarchies and a program
//! calling into summarized library classes.

use crate::errors::AnalysisResult;
use crate::hierarchy::{ClassKind, Hierarchy};
use crate::infoflow::{
    AccessPath, Abstraction, FollowReturnsPastSeedsHandler, ForwardSolver, InfoflowManager, PathEdge,
    TaintWrapper, WrapperOptions,
};
use crate::program::{Icfg, InvokeExpr, Local, MethodUid, Program, ProgramCounters, StmtKind, StmtUid, Value};
use crate::summary_wrapper::{CallSite, SummaryTaintWrapper};
use crate::types::JavaType;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tw_summary::{FieldSignature, FlowSinkSource, GapDefinition, MemorySummaries, MethodFlow, MethodSignature};

pub(crate) const ID: &str = "<lib.Util: java.lang.Object id(java.lang.Object)>";
pub(crate) const WRITE: &str = "<lib.Buffer: void write(app.Holder)>";
pub(crate) const DISPATCH: &str = "<lib.Dispatcher: java.lang.Object dispatch(lib.Listener,java.lang.Object)>";
pub(crate) const ON_EVENT: &str = "<lib.Listener: java.lang.Object onEvent(java.lang.Object)>";
pub(crate) const GET: &str = "<lib.Box: java.lang.Object get()>";
pub(crate) const GET_D: &str = "<lib.Box: double getD()>";
pub(crate) const SCHEDULE: &str = "<lib.Scheduler: java.lang.Object schedule(lib.Executor,lib.Listener)>";
pub(crate) const EXECUTE: &str = "<lib.Executor: java.lang.Object execute(lib.Listener)>";

pub(crate) const BUF: &str = "<app.Holder: java.lang.String buf>";
pub(crate) const DATA: &str = "<lib.Buffer: java.lang.String data>";
pub(crate) const VALUE: &str = "<lib.Box: java.lang.Object value>";
pub(crate) const D: &str = "<lib.Box: double d>";

const OBJECT: &str = "java.lang.Object";

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Hierarchy of the few runtime classes used by tests.
pub(crate) fn hierarchy() -> Hierarchy {
    let h = Hierarchy::new();
    h.add_class("java.lang.Object", ClassKind::Class).unwrap();
    for class in ["java.lang.String", "java.lang.StringBuilder"] {
        h.add_class(class, ClassKind::Class).unwrap();
        h.add_extends(class, "java.lang.Object").unwrap();
    }
    for interface in ["java.lang.Cloneable", "java.io.Serializable", "java.lang.Runnable"] {
        h.add_class(interface, ClassKind::Interface).unwrap();
    }
    h
}

/// A call site that is not part of any program.
pub(crate) fn call_site() -> CallSite {
    let mut counters = ProgramCounters::default();
    let stmt = counters.new_stmt_uid();
    let local = counters.new_local();
    let abs = Abstraction::new(AccessPath::from_local(local, JavaType::parse("java.lang.Object")));
    CallSite::new(stmt, abs.clone(), abs)
}

/// Solver recording the edges it receives instead of propagating them.
#[derive(Default)]
pub(crate) struct MockSolver {
    edges: Mutex<Vec<PathEdge>>,
    end_summaries: Mutex<BTreeMap<MethodUid, Vec<(StmtUid, Abstraction)>>>,
    /// Exits reached as soon as a seed is injected at a start point
    eager_exits: Mutex<BTreeMap<StmtUid, StmtUid>>,
    handler: Mutex<Option<Arc<dyn FollowReturnsPastSeedsHandler>>>,
}

impl MockSolver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn edges(&self) -> Vec<PathEdge> {
        self.edges.lock().unwrap().clone()
    }

    /// Pretends that `method` has been completely analyzed, whatever the
    /// seed, reaching the given exit facts.
    pub(crate) fn set_end_summary(&self, method: MethodUid, exits: Vec<(StmtUid, Abstraction)>) {
        self.end_summaries.lock().unwrap().insert(method, exits);
    }

    /// Reports the exit `exit` with the seed itself, from within
    /// `process_edge`, whenever a seed is injected at `start`.
    pub(crate) fn return_on_injection(&self, start: StmtUid, exit: StmtUid) {
        self.eager_exits.lock().unwrap().insert(start, exit);
    }

    pub(crate) fn has_handler(&self) -> bool {
        self.handler.lock().unwrap().is_some()
    }

    /// Plays the role of the solver reaching the exit `stmt` of a method
    /// entered with the seed `d1`.
    pub(crate) fn follow_returns(
        &self,
        d1: &Abstraction,
        stmt: StmtUid,
        d2: &Abstraction,
    ) -> AnalysisResult<()> {
        let handler = self.handler.lock().unwrap().clone();
        match handler {
            Some(handler) => handler.handle_follow_returns_past_seeds(d1, stmt, d2),
            None => Ok(()),
        }
    }
}

impl ForwardSolver for MockSolver {
    fn process_edge(&self, edge: PathEdge) {
        let exit = self.eager_exits.lock().unwrap().get(&edge.target).copied();
        let seed = (edge.d1 == edge.d2).then(|| edge.d1.clone());
        self.edges.lock().unwrap().push(edge);
        if let (Some(exit), Some(seed)) = (exit, seed) {
            self.follow_returns(&seed, exit, &seed).unwrap();
        }
    }

    fn end_summary(&self, method: MethodUid, _d1: &Abstraction) -> Option<Vec<(StmtUid, Abstraction)>> {
        self.end_summaries.lock().unwrap().get(&method).cloned()
    }

    fn set_follow_returns_past_seeds_handler(&self, handler: Arc<dyn FollowReturnsPastSeedsHandler>) {
        *self.handler.lock().unwrap() = Some(handler);
    }
}

/// Summaries of the library classes called by [`Scenario`].
pub(crate) fn summaries() -> MemorySummaries {
    let gap = GapDefinition::new(ON_EVENT);
    let mut provider = MemorySummaries::new();
    provider.add_flow(
        "lib.Util",
        MethodFlow::new(
            "java.lang.Object id(java.lang.Object)",
            FlowSinkSource::parameter(0, OBJECT),
            FlowSinkSource::return_value(OBJECT),
            false,
        ),
    );
    provider.add_flow(
        "lib.Buffer",
        MethodFlow::new(
            "void write(app.Holder)",
            FlowSinkSource::parameter(0, "app.Holder").with_field(BUF, "java.lang.String"),
            FlowSinkSource::field("lib.Buffer").with_field(DATA, "java.lang.String"),
            false,
        ),
    );
    let dispatch = "java.lang.Object dispatch(lib.Listener,java.lang.Object)";
    provider.add_flow(
        "lib.Dispatcher",
        MethodFlow::new(
            dispatch,
            FlowSinkSource::parameter(0, "lib.Listener"),
            FlowSinkSource::gap_base_object("lib.Listener").in_gap(gap.clone()),
            false,
        ),
    );
    provider.add_flow(
        "lib.Dispatcher",
        MethodFlow::new(
            dispatch,
            FlowSinkSource::return_value(OBJECT).in_gap(gap),
            FlowSinkSource::return_value(OBJECT),
            false,
        ),
    );
    provider.add_flow(
        "lib.Box",
        MethodFlow::new(
            "java.lang.Object get()",
            FlowSinkSource::field("lib.Box").with_field(VALUE, OBJECT),
            FlowSinkSource::return_value(OBJECT),
            true,
        ),
    );
    provider.add_flow(
        "lib.Box",
        MethodFlow::new(
            "double getD()",
            FlowSinkSource::field("lib.Box").with_field(D, "double"),
            FlowSinkSource::return_value("double"),
            true,
        ),
    );
    // the scheduler runs its listener through an executor
    let executor_gap = GapDefinition::new(EXECUTE);
    let schedule = "java.lang.Object schedule(lib.Executor,lib.Listener)";
    provider.add_flow(
        "lib.Scheduler",
        MethodFlow::new(
            schedule,
            FlowSinkSource::parameter(1, "lib.Listener"),
            FlowSinkSource::parameter(0, "lib.Listener").in_gap(executor_gap.clone()),
            false,
        ),
    );
    provider.add_flow(
        "lib.Scheduler",
        MethodFlow::new(
            schedule,
            FlowSinkSource::return_value(OBJECT).in_gap(executor_gap),
            FlowSinkSource::return_value(OBJECT),
            false,
        ),
    );
    let execute = "java.lang.Object execute(lib.Listener)";
    provider.add_flow(
        "lib.Executor",
        MethodFlow::new(
            execute,
            FlowSinkSource::parameter(0, "lib.Listener"),
            FlowSinkSource::gap_base_object("lib.Listener").in_gap(GapDefinition::new(ON_EVENT)),
            false,
        ),
    );
    provider.add_flow(
        "lib.Executor",
        MethodFlow::new(
            execute,
            FlowSinkSource::return_value(OBJECT).in_gap(GapDefinition::new(ON_EVENT)),
            FlowSinkSource::return_value(OBJECT),
            false,
        ),
    );
    provider.add_loadable_class("lib.Extra");
    provider
}

/// `app.Main.run()` calling library methods, and a listener implemented
/// in the application:
///
/// ```text
/// r = lib.Util.id(x)
/// buf.write(h)
/// r2 = d.dispatch(l, v)
/// o = box.get()
/// dd = box.getD()
/// r3 = sched.schedule(ex, l)
/// return
/// ```
pub(crate) struct Scenario {
    pub(crate) program: Arc<Program>,
    pub(crate) hierarchy: Arc<Hierarchy>,
    pub(crate) solver: Arc<MockSolver>,
    locals: BTreeMap<&'static str, Local>,
    pub(crate) id_call: StmtUid,
    pub(crate) write_call: StmtUid,
    pub(crate) dispatch_call: StmtUid,
    pub(crate) get_call: StmtUid,
    pub(crate) get_d_call: StmtUid,
    pub(crate) schedule_call: StmtUid,
    pub(crate) exit: StmtUid,
    /// `app.MyListener.onEvent`, returning `this`
    pub(crate) on_event: MethodUid,
    pub(crate) on_event_ret: StmtUid,
}

impl Scenario {
    pub(crate) fn new() -> Self {
        init_logger();
        let mut program = Program::new();
        let main = program.add_method("<app.Main: void run()>", false).unwrap();
        let mut locals = BTreeMap::new();
        for (name, type_) in [
            ("x", "app.Holder"),
            ("r", OBJECT),
            ("h", "app.Holder"),
            ("buf", "lib.Buffer"),
            ("d", "lib.Dispatcher"),
            ("l", "lib.Listener"),
            ("v", OBJECT),
            ("r2", OBJECT),
            ("box", "lib.Box"),
            ("o", OBJECT),
            ("dd", "double"),
            ("sched", "lib.Scheduler"),
            ("ex", "lib.Executor"),
            ("r3", OBJECT),
        ] {
            locals.insert(name, program.new_local(main, name, type_));
        }
        let sig = |s: &str| MethodSignature::parse(s).unwrap();
        let arg = |name: &str| Value::Local(locals[name]);

        let mut call = |result: Option<&str>, expr: InvokeExpr| {
            program
                .push_stmt(
                    main,
                    StmtKind::Invoke {
                        result: result.map(|name| locals[name]),
                        expr,
                    },
                )
                .unwrap()
        };
        let id_call = call(Some("r"), InvokeExpr::new_static(sig(ID), vec![arg("x")]));
        let write_call = call(None, InvokeExpr::new_instance(sig(WRITE), locals["buf"], vec![arg("h")]));
        let dispatch_call = call(
            Some("r2"),
            InvokeExpr::new_instance(sig(DISPATCH), locals["d"], vec![arg("l"), arg("v")]),
        );
        let get_call = call(Some("o"), InvokeExpr::new_instance(sig(GET), locals["box"], Vec::new()));
        let get_d_call = call(Some("dd"), InvokeExpr::new_instance(sig(GET_D), locals["box"], Vec::new()));
        let schedule_call = call(
            Some("r3"),
            InvokeExpr::new_instance(sig(SCHEDULE), locals["sched"], vec![arg("ex"), arg("l")]),
        );
        let exit = program.push_stmt(main, StmtKind::Return(None)).unwrap();

        program.add_abstract_method(ON_EVENT).unwrap();
        program
            .add_abstract_method("<app.AbstractListener: java.lang.Object onEvent(java.lang.Object)>")
            .unwrap();
        let on_event = program
            .add_method("<app.MyListener: java.lang.Object onEvent(java.lang.Object)>", false)
            .unwrap();
        let this = program[on_event].this_local().unwrap();
        let on_event_ret = program
            .push_stmt(on_event, StmtKind::Return(Some(Value::Local(this))))
            .unwrap();

        let h = hierarchy();
        h.add_class("lib.Listener", ClassKind::Interface).unwrap();
        h.add_class("app.MyListener", ClassKind::Class).unwrap();
        h.add_extends("app.MyListener", OBJECT).unwrap();
        h.add_implements("app.MyListener", "lib.Listener").unwrap();
        h.add_class("app.AbstractListener", ClassKind::Abstract).unwrap();
        h.add_implements("app.AbstractListener", "lib.Listener").unwrap();
        for class in [
            "app.Main",
            "app.Holder",
            "lib.Buffer",
            "lib.Dispatcher",
            "lib.Box",
            "lib.Util",
            "lib.Scheduler",
        ] {
            h.add_class(class, ClassKind::Class).unwrap();
        }
        h.add_class("lib.Executor", ClassKind::Interface).unwrap();
        h.close();

        Self {
            program: Arc::new(program),
            hierarchy: Arc::new(h),
            solver: Arc::new(MockSolver::new()),
            locals,
            id_call,
            write_call,
            dispatch_call,
            get_call,
            get_d_call,
            schedule_call,
            exit,
            on_event,
            on_event_ret,
        }
    }

    pub(crate) fn manager(&self) -> InfoflowManager {
        InfoflowManager::new(self.program.clone(), self.solver.clone(), self.hierarchy.clone())
    }

    /// An initialized wrapper with default options.
    pub(crate) fn wrapper(&self, provider: MemorySummaries) -> Arc<SummaryTaintWrapper> {
        self.wrapper_with(provider, WrapperOptions::default())
    }

    pub(crate) fn wrapper_with(&self, provider: MemorySummaries, options: WrapperOptions) -> Arc<SummaryTaintWrapper> {
        let wrapper = Arc::new(SummaryTaintWrapper::new(Arc::new(provider), options));
        Arc::clone(&wrapper).initialize(self.manager()).unwrap();
        wrapper
    }

    pub(crate) fn local(&self, name: &str) -> Local {
        self.locals[name]
    }

    /// The fact tracking the whole value of a local of `run()`.
    pub(crate) fn abs(&self, name: &str) -> Abstraction {
        let local = self.local(name);
        let type_ = self.program.local_type(local).unwrap();
        Abstraction::new(AccessPath::from_local(local, type_))
    }

    pub(crate) fn abs_field(&self, name: &str, field: &str, type_: &str) -> Abstraction {
        let ap = self
            .abs(name)
            .access_path()
            .clone()
            .with_field(FieldSignature::parse(field).unwrap(), JavaType::parse(type_));
        Abstraction::new(ap)
    }
}
