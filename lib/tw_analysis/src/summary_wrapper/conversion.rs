//! Conversions between the concrete access paths of the analysis and the
//! abstract taints of summaries.

use crate::errors::{AnalysisError, AnalysisResult};
use crate::hierarchy::TypeHierarchy;
use crate::infoflow::{AccessPath, AccessPathField};
use crate::program::{Icfg, MethodUid, StmtUid, Value};
use crate::types::JavaType;
use std::collections::BTreeSet;
use tw_summary::{FieldSignature, FieldStep, GapDefinition, PathShape, SourceSinkType, Taint};

fn taint_from_access_path(
    kind: SourceSinkType,
    parameter_index: Option<usize>,
    ap: &AccessPath,
    gap: Option<&GapDefinition>,
) -> Taint {
    let fields = ap
        .fields()
        .iter()
        .map(|f| FieldStep::new(&f.field().to_string(), &f.type_().to_string()))
        .collect();
    Taint::new(
        kind,
        parameter_index,
        &ap.base_type().to_string(),
        fields,
        ap.taint_sub_fields(),
        gap.cloned(),
    )
}

/// Taints designating `ap` from the point of view of the method invoked by
/// the call `stmt`.
///
/// With `match_returned_values`, a path based on the local receiving the
/// result of the call is also matched, as a returned value.
pub(crate) fn taints_on_call(
    icfg: &dyn Icfg,
    ap: &AccessPath,
    stmt: StmtUid,
    match_returned_values: bool,
) -> BTreeSet<Taint> {
    let mut taints = BTreeSet::new();
    let stmt = icfg.stmt(stmt);
    let Some(expr) = stmt.invoke_expr() else { return taints };
    let base = ap.plain_value();

    if expr.base() == Some(base) {
        taints.insert(taint_from_access_path(SourceSinkType::Field, None, ap, None));
    }
    if let Some(idx) = expr.args().iter().position(|arg| *arg == Value::Local(base)) {
        taints.insert(taint_from_access_path(
            SourceSinkType::Parameter,
            Some(idx),
            ap,
            None,
        ));
    }
    if match_returned_values && stmt.result() == Some(base) {
        taints.insert(taint_from_access_path(SourceSinkType::Return, None, ap, None));
    }
    taints
}

/// Taints designating `ap` when it leaves the method containing the exit
/// statement `stmt`.
pub(crate) fn taints_on_return(
    icfg: &dyn Icfg,
    ap: &AccessPath,
    stmt: StmtUid,
    gap: Option<&GapDefinition>,
) -> BTreeSet<Taint> {
    let mut taints = BTreeSet::new();
    let method = icfg.method(icfg.method_of(stmt));
    let base = ap.plain_value();

    if method.this_local() == Some(base) {
        taints.insert(taint_from_access_path(SourceSinkType::Field, None, ap, gap));
    }
    if let Some(idx) = method.parameter_index(base) {
        taints.insert(taint_from_access_path(
            SourceSinkType::Parameter,
            Some(idx),
            ap,
            gap,
        ));
    }
    if icfg
        .stmt(stmt)
        .returned_value()
        .and_then(Value::as_local)
        == Some(base)
    {
        taints.insert(taint_from_access_path(SourceSinkType::Return, None, ap, gap));
    }
    taints
}

/// Resolves the field chain of a taint. Declaring classes of the fields are
/// registered in the hierarchy on the fly.
fn resolve_fields(hierarchy: &dyn TypeHierarchy, taint: &Taint) -> Option<Vec<AccessPathField>> {
    let mut fields = Vec::with_capacity(taint.access_path_len());
    for step in taint.access_path() {
        match FieldSignature::parse(&step.field) {
            Ok(field) => {
                hierarchy.ensure_class(field.class_name());
                fields.push(AccessPathField::new(field, JavaType::parse(&step.type_)));
            }
            Err(err) => {
                log::warn!("cannot resolve field of {taint}: {err}");
                return None;
            }
        }
    }
    Some(fields)
}

/// Builds the access path designated by a taint at the call `stmt`, in the
/// caller.
///
/// Returns `None` when the taint targets something that cannot be tainted
/// at this call: an ignored result, a constant argument, or an unresolvable
/// field.
pub(crate) fn access_path_from_taint(
    icfg: &dyn Icfg,
    hierarchy: &dyn TypeHierarchy,
    taint: &Taint,
    stmt: StmtUid,
) -> AnalysisResult<Option<AccessPath>> {
    let call = icfg.stmt(stmt);
    let expr = call.invoke_expr().ok_or(AnalysisError::NotAnInvoke(stmt))?;
    let conversion_error = || AnalysisError::TaintConversion {
        taint: taint.to_string(),
        stmt: call.to_string(),
    };

    let base = match taint.kind() {
        SourceSinkType::Return => call.result(),
        SourceSinkType::Parameter => {
            let idx = taint.parameter_index().ok_or_else(conversion_error)?;
            expr.arg(idx).ok_or_else(conversion_error)?.as_local()
        }
        SourceSinkType::Field | SourceSinkType::Receiver | SourceSinkType::GapBaseObject => {
            Some(expr.base().ok_or_else(conversion_error)?)
        }
    };
    let Some(base) = base else { return Ok(None) };
    let Some(fields) = resolve_fields(hierarchy, taint) else { return Ok(None) };

    Ok(Some(AccessPath::new(
        base,
        JavaType::parse(taint.base_type()),
        fields,
        taint.taint_sub_fields(),
    )))
}

/// Builds the access path designated by a taint inside the method `method`,
/// when the taint is propagated into it. All the sub-fields of the path are
/// considered tainted.
pub(crate) fn access_path_in_method(
    icfg: &dyn Icfg,
    hierarchy: &dyn TypeHierarchy,
    taint: &Taint,
    method: MethodUid,
) -> AnalysisResult<Option<AccessPath>> {
    let m = icfg.method(method);
    let conversion_error = || AnalysisError::TaintConversion {
        taint: taint.to_string(),
        stmt: m.to_string(),
    };

    let base = match taint.kind() {
        SourceSinkType::Return => return Err(AnalysisError::ReturnIntoMethod(taint.to_string())),
        SourceSinkType::Parameter => taint
            .parameter_index()
            .and_then(|idx| m.parameter_local(idx))
            .ok_or_else(conversion_error)?,
        SourceSinkType::Field | SourceSinkType::Receiver | SourceSinkType::GapBaseObject => {
            m.this_local().ok_or_else(conversion_error)?
        }
    };
    let Some(fields) = resolve_fields(hierarchy, taint) else { return Ok(None) };

    Ok(Some(AccessPath::new(
        base,
        JavaType::parse(taint.base_type()),
        fields,
        true,
    )))
}
