//! Shapes of the access paths at both ends of a flow summary.

use crate::gap::GapDefinition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The role of the base value of an access path at a method boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceSinkType {
    /// A formal parameter, identified by its index.
    Parameter,
    /// The receiver object, or a field reachable from it.
    Field,
    /// The returned value.
    Return,
    /// The receiver object itself (`this`), without any field.
    Receiver,
    /// The object on which a gap method is invoked.
    GapBaseObject,
}

impl fmt::Display for SourceSinkType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Parameter => write!(f, "Parameter"),
            Self::Field => write!(f, "Field"),
            Self::Return => write!(f, "Return"),
            Self::Receiver => write!(f, "Receiver"),
            Self::GapBaseObject => write!(f, "GapBaseObject"),
        }
    }
}

/// One element of a field chain: the field signature and the type
/// of the value it holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldStep {
    pub field: String,
    #[serde(rename = "type")]
    pub type_: String,
}

impl FieldStep {
    pub fn new(field: &str, type_: &str) -> Self {
        Self {
            field: field.to_string(),
            type_: type_.to_string(),
        }
    }
}

/// Common accessors of access path shapes, shared by summary endpoints
/// and taints.
pub trait PathShape {
    fn kind(&self) -> SourceSinkType;
    fn parameter_index(&self) -> Option<usize>;
    fn base_type(&self) -> &str;
    fn access_path(&self) -> &[FieldStep];
    fn taint_sub_fields(&self) -> bool;
    fn gap(&self) -> Option<&GapDefinition>;

    fn is_parameter(&self) -> bool {
        self.kind() == SourceSinkType::Parameter
    }

    fn is_field(&self) -> bool {
        self.kind() == SourceSinkType::Field
    }

    fn is_this(&self) -> bool {
        self.kind() == SourceSinkType::Receiver
    }

    fn is_return(&self) -> bool {
        self.kind() == SourceSinkType::Return
    }

    fn is_gap_base_object(&self) -> bool {
        self.kind() == SourceSinkType::GapBaseObject
    }

    fn has_access_path(&self) -> bool {
        !self.access_path().is_empty()
    }

    fn access_path_len(&self) -> usize {
        self.access_path().len()
    }

    /// Type of the value finally referenced by the shape: for `a.b.c` this
    /// is the type of `c`, for a plain `a` the base type.
    fn last_field_type(&self) -> &str {
        self.access_path()
            .last()
            .map_or(self.base_type(), |step| step.type_.as_str())
    }
}

/// One endpoint of a [`crate::MethodFlow`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowSinkSource {
    #[serde(rename = "type")]
    kind: SourceSinkType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameter_index: Option<usize>,
    base_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    access_path: Vec<FieldStep>,
    #[serde(default)]
    taint_sub_fields: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gap: Option<GapDefinition>,
}

impl FlowSinkSource {
    fn new(kind: SourceSinkType, parameter_index: Option<usize>, base_type: &str) -> Self {
        Self {
            kind,
            parameter_index,
            base_type: base_type.to_string(),
            access_path: Vec::new(),
            taint_sub_fields: false,
            gap: None,
        }
    }

    pub fn parameter(index: usize, base_type: &str) -> Self {
        Self::new(SourceSinkType::Parameter, Some(index), base_type)
    }

    pub fn field(base_type: &str) -> Self {
        Self::new(SourceSinkType::Field, None, base_type)
    }

    pub fn receiver(base_type: &str) -> Self {
        Self::new(SourceSinkType::Receiver, None, base_type)
    }

    pub fn return_value(base_type: &str) -> Self {
        Self::new(SourceSinkType::Return, None, base_type)
    }

    pub fn gap_base_object(base_type: &str) -> Self {
        Self::new(SourceSinkType::GapBaseObject, None, base_type)
    }

    /// Appends a field to the access path of this endpoint.
    #[must_use]
    pub fn with_field(mut self, field: &str, type_: &str) -> Self {
        self.access_path.push(FieldStep::new(field, type_));
        self
    }

    #[must_use]
    pub fn with_sub_fields(mut self, taint_sub_fields: bool) -> Self {
        self.taint_sub_fields = taint_sub_fields;
        self
    }

    #[must_use]
    pub fn in_gap(mut self, gap: GapDefinition) -> Self {
        self.gap = Some(gap);
        self
    }
}

impl PathShape for FlowSinkSource {
    #[inline]
    fn kind(&self) -> SourceSinkType {
        self.kind
    }

    #[inline]
    fn parameter_index(&self) -> Option<usize> {
        self.parameter_index
    }

    #[inline]
    fn base_type(&self) -> &str {
        &self.base_type
    }

    #[inline]
    fn access_path(&self) -> &[FieldStep] {
        &self.access_path
    }

    #[inline]
    fn taint_sub_fields(&self) -> bool {
        self.taint_sub_fields
    }

    #[inline]
    fn gap(&self) -> Option<&GapDefinition> {
        self.gap.as_ref()
    }
}

impl fmt::Display for FlowSinkSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_shape(self, f)
    }
}

pub(crate) fn fmt_shape<S: PathShape>(shape: &S, f: &mut fmt::Formatter) -> fmt::Result {
    if let Some(gap) = shape.gap() {
        write!(f, "{gap}:")?;
    }
    write!(f, "{}", shape.kind())?;
    if let Some(idx) = shape.parameter_index() {
        write!(f, "({idx})")?;
    }
    write!(f, " [{}]", shape.base_type())?;
    for step in shape.access_path() {
        write!(f, ".{}", step.field)?;
    }
    if shape.taint_sub_fields() {
        write!(f, ".*")?;
    }
    Ok(())
}
