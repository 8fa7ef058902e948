//! The interface between the taint wrapper and the interprocedural
//! analysis it serves: facts, solver capabilities and the wrapper
//! contract itself.

mod abstraction;
mod access_path;
mod manager;
mod options;
mod solver;
mod wrapper;

pub use abstraction::Abstraction;
pub use access_path::{AccessPath, AccessPathField};
pub use manager::InfoflowManager;
pub use options::WrapperOptions;
pub use solver::{FollowReturnsPastSeedsHandler, ForwardSolver, PathEdge};
pub use wrapper::TaintWrapper;
