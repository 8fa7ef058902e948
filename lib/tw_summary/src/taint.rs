use crate::gap::GapDefinition;
use crate::source_sink::{fmt_shape, FieldStep, PathShape, SourceSinkType};
use std::fmt;

/// An abstract tainted access path at a method boundary.
///
/// A taint is an immutable value: deriving a new taint always builds a new
/// one. Two taints that only differ by their gap are distinct facts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Taint {
    kind: SourceSinkType,
    parameter_index: Option<usize>,
    base_type: String,
    access_path: Vec<FieldStep>,
    taint_sub_fields: bool,
    gap: Option<GapDefinition>,
}

impl Taint {
    /// Builds a new taint.
    ///
    /// The receiver object is always tracked as a [`SourceSinkType::Field`]
    /// taint with an empty field chain, and the parameter index is only kept
    /// for parameter taints.
    pub fn new(
        kind: SourceSinkType,
        parameter_index: Option<usize>,
        base_type: &str,
        access_path: Vec<FieldStep>,
        taint_sub_fields: bool,
        gap: Option<GapDefinition>,
    ) -> Self {
        let kind = match kind {
            SourceSinkType::Receiver => SourceSinkType::Field,
            k => k,
        };
        let parameter_index = if kind == SourceSinkType::Parameter {
            parameter_index
        } else {
            None
        };
        Self {
            kind,
            parameter_index,
            base_type: base_type.to_string(),
            access_path,
            taint_sub_fields,
            gap,
        }
    }

    pub fn parameter(index: usize, base_type: &str, access_path: Vec<FieldStep>) -> Self {
        Self::new(
            SourceSinkType::Parameter,
            Some(index),
            base_type,
            access_path,
            false,
            None,
        )
    }

    pub fn field(base_type: &str, access_path: Vec<FieldStep>) -> Self {
        Self::new(SourceSinkType::Field, None, base_type, access_path, false, None)
    }

    pub fn return_value(base_type: &str, access_path: Vec<FieldStep>) -> Self {
        Self::new(SourceSinkType::Return, None, base_type, access_path, false, None)
    }

    #[must_use]
    pub fn with_sub_fields(mut self, taint_sub_fields: bool) -> Self {
        self.taint_sub_fields = taint_sub_fields;
        self
    }

    #[must_use]
    pub fn in_gap(mut self, gap: Option<GapDefinition>) -> Self {
        self.gap = gap;
        self
    }

    /// Type of the value referenced at position `idx` of the field chain,
    /// `None` designating the base value.
    pub fn type_at(&self, idx: Option<usize>) -> &str {
        match idx.and_then(|i| self.access_path.get(i)) {
            Some(step) => &step.type_,
            None => &self.base_type,
        }
    }
}

impl PathShape for Taint {
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

impl fmt::Display for Taint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "taint ")?;
        fmt_shape(self, f)
    }
}
