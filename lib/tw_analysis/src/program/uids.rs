use std::fmt;
use std::num::NonZeroUsize;

/// Unique id to identify a method in the program
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct MethodUid(NonZeroUsize);

impl MethodUid {
    pub(crate) fn idx(self) -> usize {
        self.0.get() - 1
    }
}

impl fmt::Display for MethodUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// Unique id to identify a statement in the program
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct StmtUid(NonZeroUsize);

impl StmtUid {
    pub(crate) fn idx(self) -> usize {
        self.0.get() - 1
    }
}

impl fmt::Display for StmtUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// A local variable. Locals are unique in the whole program, two methods
/// never share a local.
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct Local(NonZeroUsize);

impl Local {
    pub(crate) fn idx(self) -> usize {
        self.0.get() - 1
    }
}

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "$l{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct ProgramCounters {
    nb_methods: usize,
    nb_stmts: usize,
    nb_locals: usize,
}

impl ProgramCounters {
    pub(crate) fn new_method_uid(&mut self) -> MethodUid {
        self.nb_methods += 1;
        MethodUid(NonZeroUsize::new(self.nb_methods).expect("just incremented, cannot be 0"))
    }

    pub(crate) fn new_stmt_uid(&mut self) -> StmtUid {
        self.nb_stmts += 1;
        StmtUid(NonZeroUsize::new(self.nb_stmts).expect("just incremented, cannot be 0"))
    }

    pub(crate) fn new_local(&mut self) -> Local {
        self.nb_locals += 1;
        Local(NonZeroUsize::new(self.nb_locals).expect("just incremented, cannot be 0"))
    }

    pub(crate) fn nb_methods(&self) -> usize {
        self.nb_methods
    }

    pub(crate) fn nb_stmts(&self) -> usize {
        self.nb_stmts
    }
}
