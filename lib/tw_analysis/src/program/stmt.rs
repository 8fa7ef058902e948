use crate::program::{Local, MethodUid, StmtUid};
use std::fmt;
use tw_summary::MethodSignature;

/// An operand of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Local(Local),
    /// A literal. Constants cannot carry taint.
    Constant(String),
}

impl Value {
    #[must_use]
    pub fn as_local(&self) -> Option<Local> {
        match self {
            Self::Local(l) => Some(*l),
            Self::Constant(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Local(l) => write!(f, "{l}"),
            Self::Constant(c) => write!(f, "{c:?}"),
        }
    }
}

/// A method invocation: `base.method(args)`, without base for static calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeExpr {
    method: MethodSignature,
    base: Option<Local>,
    args: Vec<Value>,
}

impl InvokeExpr {
    pub fn new_static(method: MethodSignature, args: Vec<Value>) -> Self {
        Self {
            method,
            base: None,
            args,
        }
    }

    pub fn new_instance(method: MethodSignature, base: Local, args: Vec<Value>) -> Self {
        Self {
            method,
            base: Some(base),
            args,
        }
    }

    #[inline]
    pub fn method(&self) -> &MethodSignature {
        &self.method
    }

    #[inline]
    pub fn base(&self) -> Option<Local> {
        self.base
    }

    #[inline]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    #[inline]
    pub fn arg(&self, idx: usize) -> Option<&Value> {
        self.args.get(idx)
    }
}

impl fmt::Display for InvokeExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(base) = self.base {
            write!(f, "{base}.")?;
        }
        write!(f, "{}(", self.method)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    /// A call, possibly assigning its result to a local.
    Invoke {
        result: Option<Local>,
        expr: InvokeExpr,
    },
    Return(Option<Value>),
    Nop,
}

#[derive(Debug, Clone)]
pub struct Stmt {
    uid: StmtUid,
    method: MethodUid,
    kind: StmtKind,
}

impl Stmt {
    pub(crate) fn new(uid: StmtUid, method: MethodUid, kind: StmtKind) -> Self {
        Self { uid, method, kind }
    }

    #[inline]
    pub fn uid(&self) -> StmtUid {
        self.uid
    }

    /// The method containing the statement.
    #[inline]
    pub fn method(&self) -> MethodUid {
        self.method
    }

    #[inline]
    pub fn kind(&self) -> &StmtKind {
        &self.kind
    }

    #[must_use]
    pub fn invoke_expr(&self) -> Option<&InvokeExpr> {
        match &self.kind {
            StmtKind::Invoke { expr, .. } => Some(expr),
            _ => None,
        }
    }

    /// The local receiving the result of the call, if any.
    #[must_use]
    pub fn result(&self) -> Option<Local> {
        match &self.kind {
            StmtKind::Invoke { result, .. } => *result,
            _ => None,
        }
    }

    /// The value returned by a return statement.
    #[must_use]
    pub fn returned_value(&self) -> Option<&Value> {
        match &self.kind {
            StmtKind::Return(value) => value.as_ref(),
            _ => None,
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: ", self.uid)?;
        match &self.kind {
            StmtKind::Invoke {
                result: Some(r),
                expr,
            } => write!(f, "{r} = {expr}"),
            StmtKind::Invoke { result: None, expr } => write!(f, "{expr}"),
            StmtKind::Return(Some(v)) => write!(f, "return {v}"),
            StmtKind::Return(None) => write!(f, "return"),
            StmtKind::Nop => write!(f, "nop"),
        }
    }
}
