//! Work items of the summary application, and the arena storing them.

use crate::infoflow::Abstraction;
use crate::program::StmtUid;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{self, AtomicUsize};
use std::sync::{Arc, PoisonError, RwLock};
use tw_summary::{GapDefinition, PathShape, Taint};

/// Index of a propagator in a [`PropagatorArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropagatorId(usize);

impl fmt::Display for PropagatorId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The call at which a summary application started, with the solver facts
/// needed to inject its results back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    pub stmt: StmtUid,
    /// Context fact
    pub d1: Abstraction,
    /// Incoming fact
    pub d2: Abstraction,
}

impl CallSite {
    pub fn new(stmt: StmtUid, d1: Abstraction, d2: Abstraction) -> Self {
        Self { stmt, d1, d2 }
    }
}

/// A taint being driven through summaries.
///
/// `parent` is the frame that entered the gap the propagator is currently
/// inside, so a propagator with a gap always has a parent. The call site is
/// only known for propagators at the root of the stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Propagator {
    taint: Taint,
    gap: Option<GapDefinition>,
    parent: Option<PropagatorId>,
    call_site: Option<CallSite>,
    inverse: bool,
}

impl Propagator {
    pub fn new(
        taint: Taint,
        gap: Option<GapDefinition>,
        parent: Option<PropagatorId>,
        call_site: Option<CallSite>,
        inverse: bool,
    ) -> Self {
        Self {
            taint,
            gap,
            parent,
            call_site,
            inverse,
        }
    }

    /// A propagator at the call site where the summary application starts.
    pub fn root(taint: Taint, call_site: CallSite, inverse: bool) -> Self {
        Self::new(taint, None, None, Some(call_site), inverse)
    }

    #[inline]
    pub fn taint(&self) -> &Taint {
        &self.taint
    }

    #[inline]
    pub fn gap(&self) -> Option<&GapDefinition> {
        self.gap.as_ref()
    }

    #[inline]
    pub fn parent(&self) -> Option<PropagatorId> {
        self.parent
    }

    #[inline]
    pub fn call_site(&self) -> Option<&CallSite> {
        self.call_site.as_ref()
    }

    /// Inverse propagators look for aliases: they apply alias flows from
    /// sink to source.
    #[inline]
    pub fn is_inverse(&self) -> bool {
        self.inverse
    }

    #[must_use]
    pub fn derive_inverse(&self) -> Self {
        Self {
            inverse: true,
            ..self.clone()
        }
    }
}

impl fmt::Display for Propagator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.inverse {
            write!(f, "inverse ")?;
        }
        write!(f, "propagator [{}]", self.taint)?;
        if let Some(gap) = &self.gap {
            write!(f, " in {gap}")?;
        }
        if let Some(parent) = self.parent {
            write!(f, " parent {parent}")?;
        }
        if let Some(call_site) = &self.call_site {
            write!(f, " at {}", call_site.stmt)?;
        }
        Ok(())
    }
}

static NB_ARENAS: AtomicUsize = AtomicUsize::new(0);

/// Append-only store of propagators.
///
/// Each summary application owns its arena, which lives as long as the
/// application or the continuations it left pending in the solver.
///
/// Equal propagators are stored once, so that comparing ids compares whole
/// parent chains. A parent is always interned before its children, hence
/// parent ids are smaller than their children ids and chains are acyclic.
#[derive(Debug)]
pub struct PropagatorArena {
    serial: usize,
    nodes: RwLock<Vec<Arc<Propagator>>>,
    ids: DashMap<Arc<Propagator>, PropagatorId>,
}

impl Default for PropagatorArena {
    fn default() -> Self {
        Self {
            serial: NB_ARENAS.fetch_add(1, atomic::Ordering::Relaxed),
            nodes: RwLock::default(),
            ids: DashMap::new(),
        }
    }
}

impl PropagatorArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifies the arena among all the arenas of the process.
    #[inline]
    pub fn serial(&self) -> usize {
        self.serial
    }

    /// Returns the id of the given propagator, storing it if needed.
    pub fn intern(&self, propagator: Propagator) -> PropagatorId {
        match self.ids.entry(Arc::new(propagator)) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
                let id = PropagatorId(nodes.len());
                nodes.push(Arc::clone(e.key()));
                e.insert(id);
                id
            }
        }
    }

    /// # Panics
    ///
    /// Panics if the id does not come from this arena.
    #[must_use]
    pub fn get(&self, id: PropagatorId) -> Arc<Propagator> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&nodes[id.0])
    }

    #[must_use]
    pub fn parent_of(&self, id: PropagatorId) -> Option<Arc<Propagator>> {
        self.get(id).parent().map(|parent| self.get(parent))
    }

    /// The bottom of the stack of the given propagator.
    #[must_use]
    pub fn root_of(&self, id: PropagatorId) -> PropagatorId {
        let mut cur = id;
        while let Some(parent) = self.get(cur).parent() {
            cur = parent;
        }
        cur
    }

    /// Number of frames below the given propagator.
    #[must_use]
    pub fn depth(&self, id: PropagatorId) -> usize {
        let mut depth = 0;
        let mut cur = id;
        while let Some(parent) = self.get(cur).parent() {
            depth += 1;
            cur = parent;
        }
        depth
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A propagator waiting for the solver to reach the end of a gap
/// implementation, with the arena holding its parent chain.
#[derive(Debug, Clone)]
pub(crate) struct Continuation {
    pub(crate) arena: Arc<PropagatorArena>,
    pub(crate) id: PropagatorId,
}

impl Continuation {
    pub(crate) fn new(arena: &Arc<PropagatorArena>, id: PropagatorId) -> Self {
        Self {
            arena: Arc::clone(arena),
            id,
        }
    }

    fn key(&self) -> (usize, PropagatorId) {
        (self.arena.serial(), self.id)
    }
}

impl PartialEq for Continuation {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Continuation {}

impl PartialOrd for Continuation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Continuation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Pops the top frame of the given propagator stack: returns the parent,
/// gap and call site a propagator leaving the current frame must have.
pub(crate) fn pop_frame(
    arena: &PropagatorArena,
    propagator: &Propagator,
) -> (Option<PropagatorId>, Option<GapDefinition>, Option<CallSite>) {
    match propagator.parent().map(|p| arena.get(p)) {
        Some(frame) => (frame.parent(), frame.gap().cloned(), frame.call_site().cloned()),
        None => (None, None, propagator.call_site().cloned()),
    }
}

/// Builds the propagators carrying the given taints out of the top frame
/// of `propagator`.
pub(crate) fn leave_frame<I>(arena: &PropagatorArena, propagator: &Propagator, taints: I) -> Vec<Propagator>
where
    I: IntoIterator<Item = Taint>,
{
    let (parent, gap, call_site) = pop_frame(arena, propagator);
    taints
        .into_iter()
        .map(|taint| Propagator::new(taint, gap.clone(), parent, call_site.clone(), false))
        .collect()
}

pub(crate) fn has_heap_taint(propagator: &Propagator) -> bool {
    propagator.taint().has_access_path()
}
