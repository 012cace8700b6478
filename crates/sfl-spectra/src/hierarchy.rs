//! Hierarchical spectra: coarser levels derived from a child level.
//!
//! A hierarchical level owns no traces. Its trace count and outcomes are those
//! of the child level, and a parent node is involved in a trace exactly when
//! at least one of its mapped children is. Nothing is materialized, so edits
//! to the leaf are visible at every level above it.

use crate::error::{Result, SpectraError};
use crate::spectra::Spectra;
use crate::spectrum::{scan_counts, CountCache, NodeId, Spectrum};
use indexmap::IndexSet;
use sfl_math::NodeCounts;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A spectra level over parent identifiers `P`, derived from child level `S`.
pub struct HierarchicalSpectra<P: NodeId, S: Spectrum + ?Sized> {
    child: Rc<S>,
    nodes: RefCell<IndexSet<P>>,
    relation: RefCell<HashMap<P, IndexSet<S::Id>>>,
    revision: Cell<u64>,
    counts: CountCache<P>,
}

impl<P: NodeId, S: Spectrum + ?Sized> HierarchicalSpectra<P, S> {
    pub fn new(child: Rc<S>) -> Self {
        Self {
            child,
            nodes: RefCell::new(IndexSet::new()),
            relation: RefCell::new(HashMap::new()),
            revision: Cell::new(0),
            counts: CountCache::default(),
        }
    }

    /// Map `child` under `parent`, registering both nodes if needed.
    pub fn set_parent(&self, parent: P, child: S::Id) {
        self.register_node(&parent);
        self.child.register_node(&child);
        self.relation
            .borrow_mut()
            .entry(parent)
            .or_default()
            .insert(child);
        self.revision.set(self.revision.get() + 1);
    }

    /// Children mapped under `parent`, in insertion order.
    pub fn children_of(&self, parent: &P) -> Vec<S::Id> {
        self.relation
            .borrow()
            .get(parent)
            .map(|kids| kids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn child_spectra(&self) -> &Rc<S> {
        &self.child
    }

    /// Always fails: traces can only be added at the leaf level.
    pub fn add_trace(&self, _successful: bool) -> Result<()> {
        tracing::warn!("rejected add_trace on a hierarchical spectra level");
        Err(SpectraError::TraceOnHierarchicalLevel)
    }
}

impl<P: NodeId, S: Spectrum + ?Sized> Spectrum for HierarchicalSpectra<P, S> {
    type Id = P;

    fn node_ids(&self) -> Vec<P> {
        self.nodes.borrow().iter().cloned().collect()
    }

    fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    fn has_node(&self, id: &P) -> bool {
        self.nodes.borrow().contains(id)
    }

    fn register_node(&self, id: &P) {
        if !self.has_node(id) {
            self.nodes.borrow_mut().insert(id.clone());
        }
    }

    fn trace_count(&self) -> usize {
        self.child.trace_count()
    }

    fn is_successful(&self, trace: usize) -> bool {
        self.child.is_successful(trace)
    }

    fn is_involved(&self, trace: usize, id: &P) -> bool {
        self.relation.borrow().get(id).is_some_and(|kids| {
            kids.iter()
                .any(|child| self.child.is_involved(trace, child))
        })
    }

    fn revision(&self) -> u64 {
        self.revision.get() + self.child.revision()
    }

    fn counts(&self, id: &P) -> NodeCounts {
        self.counts
            .get_or_compute(id, self.revision(), || scan_counts(self, id))
    }
}

impl<P: NodeId, S: Spectrum + ?Sized> fmt::Debug for HierarchicalSpectra<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HierarchicalSpectra")
            .field("nodes", &self.node_count())
            .field("children", &self.child.node_count())
            .field("traces", &self.trace_count())
            .finish()
    }
}

/// A spectra level that can be walked towards the leaves without knowing the
/// concrete type of each level.
///
/// All levels of one walk share the identifier type.
pub trait SpectrumLevel: Spectrum {
    fn as_spectrum(&self) -> &dyn Spectrum<Id = Self::Id>;

    fn as_level(&self) -> &dyn SpectrumLevel<Id = Self::Id>;

    /// The next level towards the leaves, `None` at the leaf.
    fn child_level(&self) -> Option<&dyn SpectrumLevel<Id = Self::Id>>;

    /// Nodes of [`SpectrumLevel::child_level`] mapped under `parent`.
    fn children_of(&self, parent: &Self::Id) -> Vec<Self::Id>;

    /// Number of levels from this one down to the leaf, inclusive.
    fn depth(&self) -> usize {
        1 + self.child_level().map_or(0, |child| child.depth())
    }
}

impl<T: NodeId> SpectrumLevel for Spectra<T> {
    fn as_spectrum(&self) -> &dyn Spectrum<Id = T> {
        self
    }

    fn as_level(&self) -> &dyn SpectrumLevel<Id = T> {
        self
    }

    fn child_level(&self) -> Option<&dyn SpectrumLevel<Id = T>> {
        None
    }

    fn children_of(&self, _parent: &T) -> Vec<T> {
        Vec::new()
    }
}

impl<T, S> SpectrumLevel for HierarchicalSpectra<T, S>
where
    T: NodeId,
    S: SpectrumLevel<Id = T> + ?Sized,
{
    fn as_spectrum(&self) -> &dyn Spectrum<Id = T> {
        self
    }

    fn as_level(&self) -> &dyn SpectrumLevel<Id = T> {
        self
    }

    fn child_level(&self) -> Option<&dyn SpectrumLevel<Id = T>> {
        Some(self.child.as_level())
    }

    fn children_of(&self, parent: &T) -> Vec<T> {
        HierarchicalSpectra::children_of(self, parent)
    }
}
