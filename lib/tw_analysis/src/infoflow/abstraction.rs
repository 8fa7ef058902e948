use crate::infoflow::AccessPath;
use crate::program::StmtUid;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A data flow fact of the solver: an access path known to be tainted.
///
/// Two abstractions tracking the same access path are equal, the statement
/// at which an abstraction was derived is only informative.
#[derive(Debug, Clone)]
pub struct Abstraction {
    access_path: AccessPath,
    current_stmt: Option<StmtUid>,
}

impl Abstraction {
    pub fn new(access_path: AccessPath) -> Self {
        Self {
            access_path,
            current_stmt: None,
        }
    }

    #[inline]
    pub fn access_path(&self) -> &AccessPath {
        &self.access_path
    }

    #[inline]
    pub fn current_stmt(&self) -> Option<StmtUid> {
        self.current_stmt
    }

    /// Builds the fact obtained from this one when `access_path` becomes
    /// tainted at `stmt`.
    #[must_use]
    pub fn derive_new_abstraction(&self, access_path: AccessPath, stmt: StmtUid) -> Self {
        Self {
            access_path,
            current_stmt: Some(stmt),
        }
    }
}

impl PartialEq for Abstraction {
    fn eq(&self, other: &Self) -> bool {
        self.access_path == other.access_path
    }
}

impl Eq for Abstraction {}

impl Hash for Abstraction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.access_path.hash(state);
    }
}

impl PartialOrd for Abstraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Abstraction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.access_path.cmp(&other.access_path)
    }
}

impl fmt::Display for Abstraction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.access_path)
    }
}
