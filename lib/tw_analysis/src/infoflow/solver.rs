use crate::errors::AnalysisResult;
use crate::infoflow::Abstraction;
use crate::program::{MethodUid, StmtUid};
use std::fmt;
use std::sync::Arc;

/// An edge of the exploded super-graph: `d2` holds at `target` in the
/// context of `d1`, the fact that held at the start of the method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathEdge {
    pub d1: Abstraction,
    pub target: StmtUid,
    pub d2: Abstraction,
}

impl PathEdge {
    pub fn new(d1: Abstraction, target: StmtUid, d2: Abstraction) -> Self {
        Self { d1, target, d2 }
    }
}

impl fmt::Display for PathEdge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}> -> <{}, {}>", self.d1, self.target, self.d2)
    }
}

/// Observer notified by the solver when the analysis of a method started
/// from a seed reaches an exit point, and no caller is known to return to.
pub trait FollowReturnsPastSeedsHandler: Send + Sync {
    /// `d1` is the seed fact, `stmt` the exit statement and `d2` the fact
    /// holding at it.
    fn handle_follow_returns_past_seeds(
        &self,
        d1: &Abstraction,
        stmt: StmtUid,
        d2: &Abstraction,
    ) -> AnalysisResult<()>;
}

/// Capabilities of the forward IFDS solver used by the taint wrapper.
///
/// The solver schedules the propagation of injected edges itself, so none
/// of these operations block on the analysis.
pub trait ForwardSolver: Send + Sync {
    /// Injects a new edge to be propagated.
    fn process_edge(&self, edge: PathEdge);

    /// Returns the exit points of `method` already reached from the seed
    /// `d1`, with the facts holding there, if the method has been
    /// completely analyzed in this context.
    fn end_summary(&self, method: MethodUid, d1: &Abstraction) -> Option<Vec<(StmtUid, Abstraction)>>;

    fn set_follow_returns_past_seeds_handler(&self, handler: Arc<dyn FollowReturnsPastSeedsHandler>);
}
