//! Application of a single flow summary to a propagator.

use crate::hierarchy::TypeHierarchy;
use crate::summary_wrapper::propagator::{pop_frame, Propagator, PropagatorArena, PropagatorId};
use crate::types::JavaType;
use std::iter;
use tw_summary::{FieldStep, FlowSinkSource, GapDefinition, MethodFlow, PathShape, SourceSinkType, Taint};

/// Checks whether a value of type `base` may be seen as a value of type
/// `check`, or conversely.
///
/// `java.lang.Object` is compatible with any reference type.
pub fn is_cast_compatible(hierarchy: &dyn TypeHierarchy, base: &JavaType, check: &JavaType) -> bool {
    if base.is_object() {
        return check.is_reference();
    }
    if check.is_object() {
        return base.is_reference();
    }
    base == check || hierarchy.can_store_type(base, check) || hierarchy.can_store_type(check, base)
}

/// Checks whether the fields of a taint match the fields of a flow source.
///
/// If `a` is tainted, the source must be `a`. If `a.*` is tainted, the source
/// can also be `a.b`. When one of the paths is a prefix of the other, the
/// extra fields of the taint are carried over by the flow.
pub fn compare_fields(taint: &Taint, source: &FlowSinkSource) -> bool {
    if !taint.has_access_path() {
        return !source.is_field() || taint.taint_sub_fields();
    }
    if taint.access_path_len() < source.access_path_len() && !taint.taint_sub_fields() {
        return false;
    }
    taint
        .access_path()
        .iter()
        .zip(source.access_path())
        .all(|(t, s)| t.field == s.field)
}

fn source_matches(source: &FlowSinkSource, taint: &Taint) -> bool {
    match source.kind() {
        SourceSinkType::Parameter => {
            taint.is_parameter()
                && taint.parameter_index() == source.parameter_index()
                && compare_fields(taint, source)
        }
        // flows from a field apply to the field itself or to the whole base object
        SourceSinkType::Field => {
            (taint.is_field() || taint.is_gap_base_object()) && compare_fields(taint, source)
        }
        SourceSinkType::Receiver => taint.is_field(),
        SourceSinkType::Return => match source.gap() {
            Some(_) => taint.gap().is_some() && compare_fields(taint, source),
            // over-approximates flows from the return edge to every exit point
            None => taint.gap().is_none() && taint.is_return() && compare_fields(taint, source),
        },
        SourceSinkType::GapBaseObject => false,
    }
}

/// Fields of `taint` not consumed by `source`.
fn remaining_fields<'a>(source: &FlowSinkSource, taint: &'a Taint) -> &'a [FieldStep] {
    if !source.has_access_path() {
        return taint.access_path();
    }
    taint
        .access_path()
        .get(source.access_path_len()..)
        .unwrap_or_default()
}

/// Builds the taint produced at `sink` when `taint` matched `source`.
///
/// Returns `None` if the value referenced by the taint cannot be stored at
/// the sink, nor in an element of it when the sink is an array.
pub fn add_sink_taint(
    hierarchy: &dyn TypeHierarchy,
    source: &FlowSinkSource,
    sink: &FlowSinkSource,
    taint: &Taint,
    gap: Option<&GapDefinition>,
) -> Option<Taint> {
    let remaining = remaining_fields(source, taint);

    // with open sub-fields, the flow consumes a field of the tainted value
    let taint_type = if taint.access_path_len() < source.access_path_len() {
        JavaType::parse(source.last_field_type())
    } else {
        JavaType::parse(taint.type_at(source.access_path_len().checked_sub(1)))
    };
    let sink_type = JavaType::parse(sink.last_field_type());
    if !is_cast_compatible(hierarchy, &taint_type, &sink_type)
        && !iter::successors(sink_type.element_type(), |t| t.element_type())
            .any(|elem| is_cast_compatible(hierarchy, &taint_type, elem))
    {
        return None;
    }

    let kind = match sink.kind() {
        SourceSinkType::GapBaseObject if !remaining.is_empty() => SourceSinkType::Field,
        kind => kind,
    };
    let access_path = sink
        .access_path()
        .iter()
        .chain(remaining)
        .cloned()
        .collect();
    Some(Taint::new(
        kind,
        sink.parameter_index(),
        sink.base_type(),
        access_path,
        sink.taint_sub_fields() || taint.taint_sub_fields(),
        gap.cloned(),
    ))
}

/// Applies `flow` to the propagator `id`.
///
/// Returns `None` when the flow does not apply. Otherwise the returned
/// propagator is positioned on the stack according to the gaps of the flow:
/// entering a gap pushes a frame, any other flow ends in the method of the
/// current frame and pops it.
pub fn apply_flow(
    hierarchy: &dyn TypeHierarchy,
    arena: &PropagatorArena,
    flow: &MethodFlow,
    id: PropagatorId,
) -> Option<Propagator> {
    let propagator = arena.get(id);
    let source = flow.source();
    let sink = flow.sink();
    let taint = propagator.taint();

    let compatible = is_cast_compatible(
        hierarchy,
        &JavaType::parse(taint.base_type()),
        &JavaType::parse(source.base_type()),
    );
    if !compatible || taint.gap() != source.gap() || !source_matches(source, taint) {
        return None;
    }

    // a taint entering a gap is relative to the gap method itself, a taint
    // leaving a frame is seen from its caller as a value of the gap call
    let (parent, gap, call_site, taint_gap) = if let Some(sink_gap) = sink.gap() {
        (Some(id), Some(sink_gap.clone()), None, None)
    } else {
        let (parent, gap, call_site) = pop_frame(arena, &propagator);
        (parent, gap, call_site, propagator.gap())
    };

    let new_taint = add_sink_taint(hierarchy, source, sink, taint, taint_gap)?;
    Some(Propagator::new(new_taint, gap, parent, call_site, false))
}
