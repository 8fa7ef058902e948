use crate::errors::AnalysisResult;
use crate::program::{Local, Method, MethodUid, Stmt, StmtUid};
use crate::types::JavaType;

/// Interprocedural control flow graph services required by the analysis.
pub trait Icfg: Send + Sync {
    fn method(&self, method: MethodUid) -> &Method;

    fn stmt(&self, stmt: StmtUid) -> &Stmt;

    /// The method containing the given statement.
    fn method_of(&self, stmt: StmtUid) -> MethodUid {
        self.stmt(stmt).method()
    }

    fn succs_of(&self, stmt: StmtUid) -> Vec<StmtUid>;

    fn start_points_of(&self, method: MethodUid) -> Vec<StmtUid>;

    /// The methods that may be invoked by the given call statement.
    fn callees_of_call_at(&self, stmt: StmtUid) -> Vec<MethodUid>;

    /// Resolves a full method signature such as `<a.B: void f(int)>`.
    fn find_method(&self, signature: &str) -> Option<MethodUid>;

    /// Finds the method with the given sub-signature declared by the given
    /// class. Inherited methods are not considered.
    fn find_method_in_class(&self, class_name: &str, sub_signature: &str) -> Option<MethodUid>;

    fn local_type(&self, local: Local) -> Option<JavaType>;

    /// Loads the body of the given method.
    ///
    /// # Errors
    ///
    /// Fails if the method has no code.
    fn retrieve_active_body(&self, method: MethodUid) -> AnalysisResult<()>;

    /// Invalidates what the graph knows about the given method, after its
    /// body has changed.
    fn notify_method_changed(&self, method: MethodUid);

    fn has_active_body(&self, method: MethodUid) -> bool {
        self.method(method).has_active_body()
    }
}
