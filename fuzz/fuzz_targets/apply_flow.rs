#![no_main]
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeSet;
use tw_analysis::hierarchy::{ClassKind, Hierarchy};
use tw_analysis::infoflow::{AccessPath, Abstraction};
use tw_analysis::program::{Program, StmtKind};
use tw_analysis::summary_wrapper::{apply_flow, CallSite, Propagator, PropagatorArena};
use tw_analysis::types::JavaType;
use tw_summary::{FlowSinkSource, GapDefinition, MethodFlow, Taint};

const OBJECT: &str = "java.lang.Object";
const GAPS: [&str; 3] = [
    "<java.lang.Runnable: void run()>",
    "<java.util.concurrent.Callable: java.lang.Object call()>",
    "<java.lang.Thread: void start()>",
];

fn endpoint(byte: u8) -> FlowSinkSource {
    let mut endpoint = match byte % 5 {
        0 => FlowSinkSource::parameter(usize::from(byte >> 7), OBJECT),
        1 => FlowSinkSource::field(OBJECT),
        2 => FlowSinkSource::receiver(OBJECT),
        3 => FlowSinkSource::return_value(OBJECT),
        _ => FlowSinkSource::gap_base_object(OBJECT),
    };
    if byte & 0x08 != 0 {
        endpoint = endpoint.with_field("<java.lang.Object: java.lang.Object next>", OBJECT);
    }
    match (byte >> 4) & 0x03 {
        0 => endpoint,
        g => endpoint.in_gap(GapDefinition::new(GAPS[usize::from(g) - 1])),
    }
}

fn call_site() -> CallSite {
    let mut program = Program::new();
    let method = program
        .add_method("<app.Main: void run()>", true)
        .expect("valid signature");
    let local = program.new_local(method, "o", OBJECT);
    let stmt = program
        .push_stmt(method, StmtKind::Return(None))
        .expect("known method");
    let abs = Abstraction::new(AccessPath::from_local(local, JavaType::parse(OBJECT)));
    CallSite::new(stmt, abs.clone(), abs)
}

fuzz_target!(|data: &[u8]| {
    let flows: Vec<MethodFlow> = data
        .chunks_exact(2)
        .map(|pair| MethodFlow::new("java.lang.Object m()", endpoint(pair[0]), endpoint(pair[1]), false))
        .collect();
    if flows.is_empty() {
        return;
    }

    let hierarchy = Hierarchy::new();
    hierarchy
        .add_class(OBJECT, ClassKind::Class)
        .expect("fresh hierarchy");
    let arena = PropagatorArena::new();
    let site = call_site();
    let mut work_list: Vec<_> = [
        Taint::parameter(0, OBJECT, Vec::new()).with_sub_fields(true),
        Taint::parameter(1, OBJECT, Vec::new()),
        Taint::field(OBJECT, Vec::new()).with_sub_fields(true),
    ]
    .into_iter()
    .map(|taint| arena.intern(Propagator::root(taint, site.clone(), false)))
    .collect();
    let mut done: BTreeSet<_> = work_list.iter().copied().collect();

    while let Some(id) = work_list.pop() {
        for flow in &flows {
            let Some(propagator) = apply_flow(&hierarchy, &arena, flow, id) else {
                continue;
            };
            assert!(
                propagator.gap().is_none() || propagator.parent().is_some(),
                "gap without parent: {propagator}"
            );
            assert!(
                propagator.parent().is_some() || propagator.call_site().is_some(),
                "root without call site: {propagator}"
            );
            let new_id = arena.intern(propagator);
            if let Some(parent) = arena.get(new_id).parent() {
                assert!(parent < new_id);
            }
            if done.len() < 1024 && done.insert(new_id) {
                work_list.push(new_id);
            }
        }
    }
});
