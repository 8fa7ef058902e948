//! An in-memory program, built statement by statement.

use crate::errors::{AnalysisError, AnalysisResult};
use crate::program::*;
use crate::types::JavaType;
use std::collections::{BTreeMap, BTreeSet};
use std::ops;
use std::sync::atomic::{AtomicUsize, Ordering};
use tw_summary::MethodSignature;

#[derive(Debug)]
struct LocalDecl {
    name: String,
    type_: JavaType,
    method: MethodUid,
}

#[derive(Debug, Default)]
pub struct Program {
    counters: ProgramCounters,
    methods: Vec<Method>,
    stmts: Vec<Stmt>,
    locals: Vec<LocalDecl>,
    signatures: BTreeMap<String, MethodUid>,
    call_edges: BTreeMap<StmtUid, BTreeSet<MethodUid>>,
    nb_body_loads: AtomicUsize,
    nb_changes: AtomicUsize,
}

impl ops::Index<MethodUid> for Program {
    type Output = Method;

    fn index(&self, muid: MethodUid) -> &Method {
        &self.methods[muid.idx()]
    }
}

impl ops::Index<StmtUid> for Program {
    type Output = Stmt;

    fn index(&self, suid: StmtUid) -> &Stmt {
        &self.stmts[suid.idx()]
    }
}

impl Program {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a method with a body, returns its id.
    pub fn add_method(&mut self, signature: &str, is_static: bool) -> AnalysisResult<MethodUid> {
        self.register_method(signature, is_static, false)
    }

    /// Registers a method without body.
    pub fn add_abstract_method(&mut self, signature: &str) -> AnalysisResult<MethodUid> {
        self.register_method(signature, false, true)
    }

    fn register_method(
        &mut self,
        signature: &str,
        is_static: bool,
        is_abstract: bool,
    ) -> AnalysisResult<MethodUid> {
        let signature = MethodSignature::parse(signature)?;
        let key = signature.to_string();
        if self.signatures.contains_key(&key) {
            return Err(AnalysisError::Internal(format!(
                "method {key} has already been added to the program"
            )));
        }

        let uid = self.counters.new_method_uid();
        log::trace!("pushing method {key} ({uid}) in program");

        let this_local = (!is_static).then(|| {
            self.declare_local(uid, "this", JavaType::Class(signature.class_name().to_string()))
        });
        let parameter_locals = signature
            .parameters_types()
            .iter()
            .enumerate()
            .map(|(i, t)| self.declare_local(uid, &format!("p{i}"), JavaType::parse(t)))
            .collect();

        self.methods.push(Method::new(
            uid,
            signature,
            is_static,
            is_abstract,
            this_local,
            parameter_locals,
        ));
        self.signatures.insert(key, uid);
        Ok(uid)
    }

    fn declare_local(&mut self, method: MethodUid, name: &str, type_: JavaType) -> Local {
        let local = self.counters.new_local();
        self.locals.push(LocalDecl {
            name: name.to_string(),
            type_,
            method,
        });
        local
    }

    /// Declares a new local in the body of the given method.
    pub fn new_local(&mut self, method: MethodUid, name: &str, type_name: &str) -> Local {
        self.declare_local(method, name, JavaType::parse(type_name))
    }

    /// Appends a statement to the body of the given method.
    pub fn push_stmt(&mut self, method: MethodUid, kind: StmtKind) -> AnalysisResult<StmtUid> {
        if self.methods[method.idx()].is_abstract() {
            return Err(AnalysisError::NoCode(self.methods[method.idx()].to_string()));
        }
        let uid = self.counters.new_stmt_uid();
        self.stmts.push(Stmt::new(uid, method, kind));
        self.methods[method.idx()].push_stmt(uid);
        Ok(uid)
    }

    /// Overrides the call graph at the given call site.
    pub fn add_call_edge(&mut self, stmt: StmtUid, callee: MethodUid) {
        self.call_edges.entry(stmt).or_default().insert(callee);
    }

    #[must_use]
    pub fn local_name(&self, local: Local) -> Option<&str> {
        self.locals.get(local.idx()).map(|decl| decl.name.as_str())
    }

    #[must_use]
    pub fn local_method(&self, local: Local) -> Option<MethodUid> {
        self.locals.get(local.idx()).map(|decl| decl.method)
    }

    pub fn iter_methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }

    pub fn nb_methods(&self) -> usize {
        self.counters.nb_methods()
    }

    pub fn nb_stmts(&self) -> usize {
        self.counters.nb_stmts()
    }

    /// Number of bodies actually retrieved so far.
    pub fn nb_body_loads(&self) -> usize {
        self.nb_body_loads.load(Ordering::Relaxed)
    }

    pub fn nb_changes(&self) -> usize {
        self.nb_changes.load(Ordering::Relaxed)
    }
}

impl Icfg for Program {
    fn method(&self, method: MethodUid) -> &Method {
        &self[method]
    }

    fn stmt(&self, stmt: StmtUid) -> &Stmt {
        &self[stmt]
    }

    fn succs_of(&self, stmt: StmtUid) -> Vec<StmtUid> {
        let stmts = self[self[stmt].method()].stmts();
        stmts
            .iter()
            .position(|s| *s == stmt)
            .and_then(|pos| stmts.get(pos + 1))
            .copied()
            .into_iter()
            .collect()
    }

    fn start_points_of(&self, method: MethodUid) -> Vec<StmtUid> {
        self[method].stmts().first().copied().into_iter().collect()
    }

    fn callees_of_call_at(&self, stmt: StmtUid) -> Vec<MethodUid> {
        if let Some(callees) = self.call_edges.get(&stmt) {
            return callees.iter().copied().collect();
        }
        self[stmt]
            .invoke_expr()
            .and_then(|expr| self.signatures.get(&expr.method().to_string()))
            .copied()
            .into_iter()
            .collect()
    }

    fn find_method(&self, signature: &str) -> Option<MethodUid> {
        let signature = MethodSignature::parse(signature).ok()?;
        self.signatures.get(&signature.to_string()).copied()
    }

    fn find_method_in_class(&self, class_name: &str, sub_signature: &str) -> Option<MethodUid> {
        self.signatures
            .get(&format!("<{class_name}: {sub_signature}>"))
            .copied()
    }

    fn local_type(&self, local: Local) -> Option<JavaType> {
        self.locals.get(local.idx()).map(|decl| decl.type_.clone())
    }

    fn retrieve_active_body(&self, method: MethodUid) -> AnalysisResult<()> {
        let m = &self[method];
        if m.is_abstract() {
            return Err(AnalysisError::NoCode(m.to_string()));
        }
        log::trace!("retrieving body of {m}");
        self.nb_body_loads.fetch_add(1, Ordering::Relaxed);
        m.activate_body();
        Ok(())
    }

    fn notify_method_changed(&self, method: MethodUid) {
        log::trace!("method {} changed", self[method]);
        self.nb_changes.fetch_add(1, Ordering::Relaxed);
    }
}
