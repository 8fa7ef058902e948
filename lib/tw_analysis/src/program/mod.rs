//! Program representation consumed by the analysis: methods, statements
//! and the interprocedural control flow graph over them.

mod icfg;
mod method;
mod repository;
mod stmt;
mod uids;

pub use icfg::Icfg;
pub use method::Method;
pub use repository::Program;
pub use stmt::{InvokeExpr, Stmt, StmtKind, Value};
pub use uids::{Local, MethodUid, ProgramCounters, StmtUid};
