//! The read side shared by every spectra level.
//!
//! [`Spectrum`] is object safe so localizers can work on
//! `&dyn Spectrum<Id = T>` regardless of whether the spectra is a leaf or a
//! hierarchical level. Convenience views ([`Node`], [`TraceRef`]) live on the
//! blanket [`SpectrumExt`] extension trait.

use sfl_math::NodeCounts;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Bounds every node identifier satisfies.
pub trait NodeId: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

impl<T> NodeId for T where T: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

/// A matrix of node involvement over pass/fail traces.
pub trait Spectrum {
    type Id: NodeId;

    /// Identifiers of all registered nodes, in registration order.
    fn node_ids(&self) -> Vec<Self::Id>;

    fn node_count(&self) -> usize;

    fn has_node(&self, id: &Self::Id) -> bool;

    /// Register `id` as a node if it is not known yet.
    fn register_node(&self, id: &Self::Id);

    fn trace_count(&self) -> usize;

    /// Outcome of the trace at `trace`. Panics on an out-of-range index.
    fn is_successful(&self, trace: usize) -> bool;

    /// Whether node `id` was involved in the trace at `trace`.
    fn is_involved(&self, trace: usize, id: &Self::Id) -> bool;

    /// Monotonic counter bumped by every mutation visible through this level.
    fn revision(&self) -> u64;

    /// Involvement counts of `id` over all traces.
    fn counts(&self, id: &Self::Id) -> NodeCounts;
}

/// Count `id` by scanning every trace of `spectra`.
pub fn scan_counts<S: Spectrum + ?Sized>(spectra: &S, id: &S::Id) -> NodeCounts {
    let mut counts = NodeCounts::default();
    for trace in 0..spectra.trace_count() {
        counts.record(spectra.is_successful(trace), spectra.is_involved(trace, id));
    }
    counts
}

/// Per-node count cache, valid for one spectra revision.
#[derive(Debug)]
pub(crate) struct CountCache<T> {
    entries: RefCell<HashMap<T, (u64, NodeCounts)>>,
}

impl<T> Default for CountCache<T> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }
}

impl<T: NodeId> CountCache<T> {
    pub(crate) fn get_or_compute(
        &self,
        id: &T,
        revision: u64,
        compute: impl FnOnce() -> NodeCounts,
    ) -> NodeCounts {
        if let Some(&(cached_at, counts)) = self.entries.borrow().get(id) {
            if cached_at == revision {
                return counts;
            }
        }
        let counts = compute();
        self.entries
            .borrow_mut()
            .insert(id.clone(), (revision, counts));
        counts
    }
}

/// A node of a spectra: an identifier plus a borrow of its owner.
pub struct Node<'a, S: Spectrum + ?Sized> {
    spectra: &'a S,
    id: S::Id,
}

impl<'a, S: Spectrum + ?Sized> Node<'a, S> {
    pub fn identifier(&self) -> &S::Id {
        &self.id
    }

    pub fn spectra(&self) -> &'a S {
        self.spectra
    }

    pub fn counts(&self) -> NodeCounts {
        self.spectra.counts(&self.id)
    }

    pub fn involved_failing(&self) -> usize {
        self.counts().involved_failing
    }

    pub fn not_involved_failing(&self) -> usize {
        self.counts().not_involved_failing
    }

    pub fn involved_successful(&self) -> usize {
        self.counts().involved_successful
    }

    pub fn not_involved_successful(&self) -> usize {
        self.counts().not_involved_successful
    }
}

impl<S: Spectrum + ?Sized> Clone for Node<'_, S> {
    fn clone(&self) -> Self {
        Self {
            spectra: self.spectra,
            id: self.id.clone(),
        }
    }
}

impl<S: Spectrum + ?Sized> fmt::Debug for Node<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node").field("id", &self.id).finish()
    }
}

impl<S: Spectrum + ?Sized> fmt::Display for Node<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id.fmt(f)
    }
}

/// Read-only view of one trace, addressed by index.
pub struct TraceRef<'a, S: Spectrum + ?Sized> {
    spectra: &'a S,
    index: usize,
}

impl<S: Spectrum + ?Sized> TraceRef<'_, S> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_successful(&self) -> bool {
        self.spectra.is_successful(self.index)
    }

    pub fn is_involved(&self, id: &S::Id) -> bool {
        self.spectra.is_involved(self.index, id)
    }
}

impl<S: Spectrum + ?Sized> Clone for TraceRef<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: Spectrum + ?Sized> Copy for TraceRef<'_, S> {}

impl<S: Spectrum + ?Sized> fmt::Debug for TraceRef<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceRef")
            .field("index", &self.index)
            .field("successful", &self.is_successful())
            .finish()
    }
}

/// Node and trace views available on every [`Spectrum`], including trait objects.
pub trait SpectrumExt: Spectrum {
    /// Get-or-create: registers `id` if it is unseen.
    fn node(&self, id: Self::Id) -> Node<'_, Self> {
        self.register_node(&id);
        Node { spectra: self, id }
    }

    fn nodes(&self) -> Vec<Node<'_, Self>> {
        self.node_ids()
            .into_iter()
            .map(|id| Node { spectra: self, id })
            .collect()
    }

    fn traces(&self) -> Vec<TraceRef<'_, Self>> {
        (0..self.trace_count())
            .map(|index| TraceRef {
                spectra: self,
                index,
            })
            .collect()
    }

    fn failing_traces(&self) -> Vec<TraceRef<'_, Self>> {
        self.traces()
            .into_iter()
            .filter(|t| !t.is_successful())
            .collect()
    }

    fn successful_traces(&self) -> Vec<TraceRef<'_, Self>> {
        self.traces()
            .into_iter()
            .filter(|t| t.is_successful())
            .collect()
    }
}

impl<S: Spectrum + ?Sized> SpectrumExt for S {}
