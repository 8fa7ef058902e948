use crate::source_sink::{FlowSinkSource, PathShape};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single summary edge: a value shaped like `source` entering the method
/// produces a value shaped like `sink`.
///
/// Gap-free endpoints on both sides describe a flow inside one invocation.
/// A gap-anchored sink enters a callback, a gap-anchored source leaves one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodFlow {
    method: String,
    source: FlowSinkSource,
    sink: FlowSinkSource,
    #[serde(default)]
    is_alias: bool,
}

impl MethodFlow {
    /// `method` is the sub-signature of the summarized method.
    pub fn new(method: &str, source: FlowSinkSource, sink: FlowSinkSource, is_alias: bool) -> Self {
        Self {
            method: method.to_string(),
            source,
            sink,
            is_alias,
        }
    }

    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[inline]
    pub fn source(&self) -> &FlowSinkSource {
        &self.source
    }

    #[inline]
    pub fn sink(&self) -> &FlowSinkSource {
        &self.sink
    }

    #[inline]
    pub fn is_alias(&self) -> bool {
        self.is_alias
    }

    /// Returns the same flow with source and sink swapped, used when
    /// looking for aliases backwards.
    #[must_use]
    pub fn reverse(&self) -> Self {
        Self {
            method: self.method.clone(),
            source: self.sink.clone(),
            sink: self.source.clone(),
            is_alias: self.is_alias,
        }
    }

    pub fn is_gap_free(&self) -> bool {
        self.source.gap().is_none() && self.sink.gap().is_none()
    }
}

impl fmt::Display for MethodFlow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{}: {} -> {}", self.method, self.source, self.sink)?;
        if self.is_alias {
            write!(f, " (alias)")?;
        }
        write!(f, "}}")
    }
}
