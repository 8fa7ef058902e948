//! Method and field signatures, in the `<class: type name>` notation used
//! by summaries.

use crate::errors::{SummaryError, SummaryResult};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

lazy_static! {
    static ref METHOD_SIGNATURE: Regex = Regex::new(
        r"^<(?P<class>[^:\s]+):\s+(?P<ret>\S+)\s+(?P<name>[^\s(]+)\((?P<params>[^)]*)\)>$"
    )
    .unwrap();
    static ref FIELD_SIGNATURE: Regex =
        Regex::new(r"^<(?P<class>[^:\s]+):\s+(?P<type>\S+)\s+(?P<name>[^\s>]+)>$").unwrap();
}

/// A fully qualified method signature, such as
/// `<java.util.List: boolean add(java.lang.Object)>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodSignature {
    class_name: String,
    return_type: String,
    name: String,
    parameters_types: Vec<String>,
}

impl MethodSignature {
    pub fn new(
        class_name: &str,
        return_type: &str,
        name: &str,
        parameters_types: &[&str],
    ) -> Self {
        Self {
            class_name: class_name.to_string(),
            return_type: return_type.to_string(),
            name: name.to_string(),
            parameters_types: parameters_types.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn parse(signature: &str) -> SummaryResult<Self> {
        let caps = METHOD_SIGNATURE
            .captures(signature.trim())
            .ok_or_else(|| SummaryError::InvalidMethodSignature(signature.to_string()))?;
        let params = caps["params"].trim();
        let parameters_types = if params.is_empty() {
            Vec::new()
        } else {
            params.split(',').map(|p| p.trim().to_string()).collect()
        };
        Ok(Self {
            class_name: caps["class"].to_string(),
            return_type: caps["ret"].to_string(),
            name: caps["name"].to_string(),
            parameters_types,
        })
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    #[inline]
    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn parameters_types(&self) -> &[String] {
        &self.parameters_types
    }

    /// The signature without the declaring class, e.g. `boolean add(java.lang.Object)`.
    /// Summaries are indexed by sub-signature.
    pub fn sub_signature(&self) -> String {
        format!(
            "{} {}({})",
            self.return_type,
            self.name,
            self.parameters_types.join(",")
        )
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}: {}>", self.class_name, self.sub_signature())
    }
}

impl FromStr for MethodSignature {
    type Err = SummaryError;

    fn from_str(s: &str) -> SummaryResult<Self> {
        Self::parse(s)
    }
}

/// A fully qualified field signature, such as `<java.lang.StringBuilder: char[] value>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldSignature {
    class_name: String,
    type_: String,
    name: String,
}

impl FieldSignature {
    pub fn new(class_name: &str, type_: &str, name: &str) -> Self {
        Self {
            class_name: class_name.to_string(),
            type_: type_.to_string(),
            name: name.to_string(),
        }
    }

    pub fn parse(signature: &str) -> SummaryResult<Self> {
        let caps = FIELD_SIGNATURE
            .captures(signature.trim())
            .ok_or_else(|| SummaryError::InvalidFieldSignature(signature.to_string()))?;
        Ok(Self {
            class_name: caps["class"].to_string(),
            type_: caps["type"].to_string(),
            name: caps["name"].to_string(),
        })
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    #[inline]
    pub fn type_(&self) -> &str {
        &self.type_
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for FieldSignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}: {} {}>", self.class_name, self.type_, self.name)
    }
}

impl FromStr for FieldSignature {
    type Err = SummaryError;

    fn from_str(s: &str) -> SummaryResult<Self> {
        Self::parse(s)
    }
}
