use crate::program::{Local, MethodUid, StmtUid};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tw_summary::MethodSignature;

/// A method of the analyzed program.
///
/// The body of a method (its statements) is declared when the program is
/// built but only becomes active once it has been retrieved, mimicking
/// lazily loaded method bodies.
#[derive(Debug)]
pub struct Method {
    // Unique identifier in the program
    uid: MethodUid,
    signature: MethodSignature,
    is_static: bool,
    is_abstract: bool,
    this_local: Option<Local>,
    parameter_locals: Vec<Local>,
    stmts: Vec<StmtUid>,
    active_body: AtomicBool,
}

impl Method {
    pub(crate) fn new(
        uid: MethodUid,
        signature: MethodSignature,
        is_static: bool,
        is_abstract: bool,
        this_local: Option<Local>,
        parameter_locals: Vec<Local>,
    ) -> Self {
        Self {
            uid,
            signature,
            is_static,
            is_abstract,
            this_local,
            parameter_locals,
            stmts: Vec::new(),
            active_body: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn uid(&self) -> MethodUid {
        self.uid
    }

    #[inline]
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        self.signature.class_name()
    }

    #[inline]
    pub fn sub_signature(&self) -> String {
        self.signature.sub_signature()
    }

    #[inline]
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    #[inline]
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// The local holding the receiver object, `None` for static methods.
    #[inline]
    pub fn this_local(&self) -> Option<Local> {
        self.this_local
    }

    #[inline]
    pub fn parameter_local(&self, idx: usize) -> Option<Local> {
        self.parameter_locals.get(idx).copied()
    }

    #[inline]
    pub fn parameter_locals(&self) -> &[Local] {
        &self.parameter_locals
    }

    #[inline]
    pub fn parameter_index(&self, local: Local) -> Option<usize> {
        self.parameter_locals.iter().position(|l| *l == local)
    }

    #[inline]
    pub fn stmts(&self) -> &[StmtUid] {
        &self.stmts
    }

    pub(crate) fn push_stmt(&mut self, stmt: StmtUid) {
        self.stmts.push(stmt);
    }

    #[inline]
    pub fn has_active_body(&self) -> bool {
        self.active_body.load(Ordering::Acquire)
    }

    pub(crate) fn activate_body(&self) {
        self.active_body.store(true, Ordering::Release);
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.signature)
    }
}
