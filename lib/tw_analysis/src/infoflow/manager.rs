use crate::hierarchy::TypeHierarchy;
use crate::infoflow::ForwardSolver;
use crate::program::Icfg;
use std::fmt;
use std::sync::Arc;

/// The services of the host analysis a taint wrapper relies on.
#[derive(Clone)]
pub struct InfoflowManager {
    icfg: Arc<dyn Icfg>,
    solver: Arc<dyn ForwardSolver>,
    hierarchy: Arc<dyn TypeHierarchy>,
}

impl InfoflowManager {
    pub fn new(
        icfg: Arc<dyn Icfg>,
        solver: Arc<dyn ForwardSolver>,
        hierarchy: Arc<dyn TypeHierarchy>,
    ) -> Self {
        Self {
            icfg,
            solver,
            hierarchy,
        }
    }

    #[inline]
    pub fn icfg(&self) -> &dyn Icfg {
        self.icfg.as_ref()
    }

    #[inline]
    pub fn forward_solver(&self) -> &dyn ForwardSolver {
        self.solver.as_ref()
    }

    #[inline]
    pub fn hierarchy(&self) -> &dyn TypeHierarchy {
        self.hierarchy.as_ref()
    }
}

impl fmt::Debug for InfoflowManager {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("InfoflowManager").finish_non_exhaustive()
    }
}
