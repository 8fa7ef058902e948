use crate::errors::SummaryResult;
use crate::signature::MethodSignature;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A call site inside a summarized method whose callee is not known by
/// the summary, typically a callback on a user-supplied object.
///
/// Gaps are identified by the signature of the invoked method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GapDefinition {
    signature: String,
}

impl GapDefinition {
    pub fn new(signature: &str) -> Self {
        Self {
            signature: signature.to_string(),
        }
    }

    #[inline]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn method_signature(&self) -> SummaryResult<MethodSignature> {
        MethodSignature::parse(&self.signature)
    }
}

impl fmt::Display for GapDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "gap{}", self.signature)
    }
}
