use crate::program::Local;
use crate::types::JavaType;
use std::fmt;
use tw_summary::FieldSignature;

/// One field dereference of an access path, with the type of the value it
/// holds in this path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccessPathField {
    field: FieldSignature,
    type_: JavaType,
}

impl AccessPathField {
    pub fn new(field: FieldSignature, type_: JavaType) -> Self {
        Self { field, type_ }
    }

    #[inline]
    pub fn field(&self) -> &FieldSignature {
        &self.field
    }

    #[inline]
    pub fn type_(&self) -> &JavaType {
        &self.type_
    }
}

/// A local followed by a chain of field dereferences, e.g. `x.buf.data`.
///
/// When `taint_sub_fields` is set, the path also covers all its extensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccessPath {
    base: Local,
    base_type: JavaType,
    fields: Vec<AccessPathField>,
    taint_sub_fields: bool,
}

impl AccessPath {
    pub fn new(
        base: Local,
        base_type: JavaType,
        fields: Vec<AccessPathField>,
        taint_sub_fields: bool,
    ) -> Self {
        Self {
            base,
            base_type,
            fields,
            taint_sub_fields,
        }
    }

    /// The path designating the local itself.
    pub fn from_local(base: Local, base_type: JavaType) -> Self {
        Self::new(base, base_type, Vec::new(), false)
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldSignature, type_: JavaType) -> Self {
        self.fields.push(AccessPathField::new(field, type_));
        self
    }

    #[must_use]
    pub fn with_sub_fields(mut self, taint_sub_fields: bool) -> Self {
        self.taint_sub_fields = taint_sub_fields;
        self
    }

    /// The local this path starts from.
    #[inline]
    pub fn plain_value(&self) -> Local {
        self.base
    }

    #[inline]
    pub fn base_type(&self) -> &JavaType {
        &self.base_type
    }

    #[inline]
    pub fn fields(&self) -> &[AccessPathField] {
        &self.fields
    }

    #[inline]
    pub fn taint_sub_fields(&self) -> bool {
        self.taint_sub_fields
    }

    #[inline]
    pub fn is_local(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({})", self.base, self.base_type)?;
        for field in &self.fields {
            write!(f, ".{}", field.field.name())?;
        }
        if self.taint_sub_fields {
            write!(f, ".*")?;
        }
        Ok(())
    }
}
