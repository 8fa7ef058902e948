//! Classes hierarchy graph representation.
//!
//! The analysis only needs a narrow view of the hierarchy, given by the
//! [`TypeHierarchy`] trait: the host application owns the hierarchy and
//! passes it to the analysis. [`Hierarchy`] is an in-memory implementation
//! backed by a `petgraph` graph in which edges go from a class to its
//! direct parents.

use crate::errors::{AnalysisError, AnalysisResult};
use crate::types::{JavaType, JAVA_IO_SERIALIZABLE, JAVA_LANG_CLONEABLE, JAVA_LANG_OBJECT};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use Direction::{Incoming, Outgoing};

/// Type hierarchy services required by the analysis.
pub trait TypeHierarchy: Send + Sync {
    /// Registers a phantom placeholder for a class that is referenced but
    /// not known yet. Does nothing if the class exists.
    fn ensure_class(&self, class_name: &str);

    fn contains_class(&self, class_name: &str) -> bool;

    fn is_interface(&self, class_name: &str) -> bool;

    /// Checks whether the class can be instantiated (neither an interface
    /// nor an abstract class).
    fn is_concrete(&self, class_name: &str) -> bool;

    fn is_phantom(&self, class_name: &str) -> bool;

    fn direct_subclasses(&self, class_name: &str) -> Vec<String>;

    fn direct_implementers(&self, interface_name: &str) -> Vec<String>;

    fn direct_subinterfaces(&self, interface_name: &str) -> Vec<String>;

    /// Checks whether `child` is `parent` or inherits from it, directly or not,
    /// by extension or implementation.
    fn is_subtype(&self, child: &str, parent: &str) -> bool;

    /// Checks whether a value of type `child` can be stored in a location of
    /// type `parent`.
    fn can_store_type(&self, child: &JavaType, parent: &JavaType) -> bool {
        if child == parent {
            return true;
        }
        match (child, parent) {
            (JavaType::Class(c), JavaType::Class(p)) => p == JAVA_LANG_OBJECT || self.is_subtype(c, p),
            (JavaType::Array(_), JavaType::Class(p)) => {
                p == JAVA_LANG_OBJECT || p == JAVA_LANG_CLONEABLE || p == JAVA_IO_SERIALIZABLE
            }
            (JavaType::Array(c), JavaType::Array(p)) => {
                c.is_reference() && p.is_reference() && self.can_store_type(c, p)
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Abstract,
    Interface,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Inheritance {
    Extends,
    Implements,
}

impl fmt::Display for Inheritance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Extends => write!(f, "<extends>"),
            Self::Implements => write!(f, "<implements>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNode {
    name: String,
    kind: ClassKind,
    phantom: bool,
}

impl ClassNode {
    fn new(name: &str, kind: ClassKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            phantom: false,
        }
    }

    fn new_phantom(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ClassKind::Class,
            phantom: true,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    #[inline]
    pub fn is_phantom(&self) -> bool {
        self.phantom
    }
}

#[derive(Debug, Default)]
struct Graph {
    inner: DiGraph<ClassNode, Inheritance>,
    node_ids: BTreeMap<String, NodeIndex>,
}

impl Graph {
    fn get(&self, class_name: &str) -> Option<&ClassNode> {
        self.node_ids.get(class_name).map(|id| &self.inner[*id])
    }

    fn get_or_insert_phantom(&mut self, class_name: &str) -> NodeIndex {
        if let Some(id) = self.node_ids.get(class_name) {
            return *id;
        }
        log::trace!("adding phantom class '{class_name}' to hierarchy");
        let id = self.inner.add_node(ClassNode::new_phantom(class_name));
        self.node_ids.insert(class_name.to_string(), id);
        id
    }

    fn children(&self, class_name: &str, link: Inheritance, interfaces: bool) -> Vec<String> {
        let Some(id) = self.node_ids.get(class_name) else { return Vec::new() };
        let mut res: Vec<String> = self
            .inner
            .edges_directed(*id, Incoming)
            .filter(|edge| *edge.weight() == link)
            .map(|edge| &self.inner[edge.source()])
            .filter(|class| (class.kind == ClassKind::Interface) == interfaces)
            .map(|class| class.name.clone())
            .collect();
        res.sort();
        res
    }
}

/// In-memory class hierarchy.
///
/// Classes are registered with [`Hierarchy::add_class`] and linked with
/// [`Hierarchy::add_extends`] and [`Hierarchy::add_implements`]. Classes
/// that are referenced before being defined are phantom classes until
/// their definition is added.
#[derive(Debug, Default)]
pub struct Hierarchy {
    graph: RwLock<Graph>,
}

impl Hierarchy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<Graph> {
        self.graph.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<Graph> {
        self.graph.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Defines a class. A phantom class with the same name is replaced
    /// by the definition.
    pub fn add_class(&self, class_name: &str, kind: ClassKind) -> AnalysisResult<()> {
        let mut graph = self.write();
        if let Some(id) = graph.node_ids.get(class_name).copied() {
            if !graph.inner[id].phantom {
                return Err(AnalysisError::Internal(format!(
                    "duplicate class '{class_name}' in hierarchy graph"
                )));
            }
            graph.inner[id] = ClassNode::new(class_name, kind);
        } else {
            let id = graph.inner.add_node(ClassNode::new(class_name, kind));
            graph.node_ids.insert(class_name.to_string(), id);
        }
        Ok(())
    }

    /// Links a class to its superclass, or an interface to one of the
    /// interfaces it extends.
    pub fn add_extends(&self, class_name: &str, superclass: &str) -> AnalysisResult<()> {
        self.add_link(class_name, superclass, Inheritance::Extends)
    }

    pub fn add_implements(&self, class_name: &str, interface: &str) -> AnalysisResult<()> {
        self.add_link(class_name, interface, Inheritance::Implements)
    }

    fn add_link(&self, from: &str, to: &str, link: Inheritance) -> AnalysisResult<()> {
        let mut graph = self.write();
        let src = *graph
            .node_ids
            .get(from)
            .ok_or_else(|| AnalysisError::ClassNotFound(from.to_string()))?;
        let dst = graph.get_or_insert_phantom(to);
        graph.inner.add_edge(src, dst, link);
        Ok(())
    }

    /// Makes every class without parent inherit from `java.lang.Object`.
    pub fn close(&self) {
        let mut graph = self.write();
        let object = graph.get_or_insert_phantom(JAVA_LANG_OBJECT);
        let orphans: Vec<NodeIndex> = graph
            .inner
            .externals(Outgoing)
            .filter(|id| *id != object)
            .collect();
        for id in orphans {
            log::debug!(
                "add missing java.lang.Object inheritance to {}",
                graph.inner[id].name
            );
            graph.inner.add_edge(id, object, Inheritance::Extends);
        }
    }

    #[must_use]
    pub fn get_class(&self, class_name: &str) -> Option<ClassNode> {
        self.read().get(class_name).cloned()
    }

    #[must_use]
    pub fn nb_classes(&self) -> usize {
        self.read().inner.node_count()
    }

    /// All the classes and interfaces the given class inherits from,
    /// including itself.
    #[must_use]
    pub fn all_parents(&self, class_name: &str) -> BTreeSet<String> {
        let graph = self.read();
        let mut parents = BTreeSet::new();
        let Some(id) = graph.node_ids.get(class_name) else { return parents };
        let mut dfs = Dfs::new(&graph.inner, *id);
        while let Some(id) = dfs.next(&graph.inner) {
            parents.insert(graph.inner[id].name.clone());
        }
        parents
    }
}

impl TypeHierarchy for Hierarchy {
    fn ensure_class(&self, class_name: &str) {
        if !self.contains_class(class_name) {
            self.write().get_or_insert_phantom(class_name);
        }
    }

    fn contains_class(&self, class_name: &str) -> bool {
        self.read().node_ids.contains_key(class_name)
    }

    fn is_interface(&self, class_name: &str) -> bool {
        self.read()
            .get(class_name)
            .map_or(false, |class| class.kind == ClassKind::Interface)
    }

    fn is_concrete(&self, class_name: &str) -> bool {
        self.read()
            .get(class_name)
            .map_or(false, |class| class.kind == ClassKind::Class)
    }

    fn is_phantom(&self, class_name: &str) -> bool {
        self.read().get(class_name).map_or(true, |class| class.phantom)
    }

    fn direct_subclasses(&self, class_name: &str) -> Vec<String> {
        self.read().children(class_name, Inheritance::Extends, false)
    }

    fn direct_implementers(&self, interface_name: &str) -> Vec<String> {
        self.read()
            .children(interface_name, Inheritance::Implements, false)
    }

    fn direct_subinterfaces(&self, interface_name: &str) -> Vec<String> {
        self.read()
            .children(interface_name, Inheritance::Extends, true)
    }

    fn is_subtype(&self, child: &str, parent: &str) -> bool {
        child == parent || self.all_parents(child).contains(parent)
    }
}
