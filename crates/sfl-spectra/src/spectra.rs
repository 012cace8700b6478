//! Leaf spectra: the level that actually owns traces.

use crate::error::{Result, SpectraError};
use crate::spectrum::{scan_counts, CountCache, NodeId, Spectrum};
use indexmap::IndexSet;
use sfl_math::NodeCounts;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// One execution: an outcome plus sparse node involvement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace<T: NodeId> {
    successful: bool,
    involvement: HashMap<T, bool>,
}

impl<T: NodeId> Trace<T> {
    fn new(successful: bool) -> Self {
        Self {
            successful,
            involvement: HashMap::new(),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.successful
    }

    /// Nodes default to not involved.
    pub fn is_involved(&self, id: &T) -> bool {
        self.involvement.get(id).copied().unwrap_or(false)
    }

    /// Number of nodes involved in this trace.
    pub fn involved_count(&self) -> usize {
        self.involvement.values().filter(|&&v| v).count()
    }
}

/// Leaf spectra over node identifiers of type `T`.
///
/// All mutation goes through `&self` so a spectra shared with hierarchical
/// levels (via `Rc`) stays editable; every edit bumps [`Spectrum::revision`]
/// and with it every cached node count above.
#[derive(Debug)]
pub struct Spectra<T: NodeId> {
    nodes: RefCell<IndexSet<T>>,
    traces: RefCell<Vec<Trace<T>>>,
    revision: Cell<u64>,
    counts: CountCache<T>,
}

impl<T: NodeId> Default for Spectra<T> {
    fn default() -> Self {
        Self {
            nodes: RefCell::new(IndexSet::new()),
            traces: RefCell::new(Vec::new()),
            revision: Cell::new(0),
            counts: CountCache::default(),
        }
    }
}

impl<T: NodeId> Spectra<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a trace and return a handle for setting its involvement.
    pub fn add_trace(&self, successful: bool) -> TraceMut<'_, T> {
        let index = {
            let mut traces = self.traces.borrow_mut();
            traces.push(Trace::new(successful));
            traces.len() - 1
        };
        self.bump();
        TraceMut {
            spectra: self,
            index,
        }
    }

    /// Reopen an existing trace for mutation.
    pub fn trace_mut(&self, index: usize) -> Result<TraceMut<'_, T>> {
        let len = self.traces.borrow().len();
        if index >= len {
            return Err(SpectraError::TraceOutOfRange { index, len });
        }
        Ok(TraceMut {
            spectra: self,
            index,
        })
    }

    /// Snapshot of the trace at `index`.
    pub fn trace(&self, index: usize) -> Option<Trace<T>> {
        self.traces.borrow().get(index).cloned()
    }

    fn set_involvement(&self, index: usize, id: T, involved: bool) {
        self.register_node(&id);
        if let Some(trace) = self.traces.borrow_mut().get_mut(index) {
            trace.involvement.insert(id, involved);
        }
        self.bump();
    }

    fn bump(&self) {
        self.revision.set(self.revision.get() + 1);
    }
}

impl<T: NodeId> Spectrum for Spectra<T> {
    type Id = T;

    fn node_ids(&self) -> Vec<T> {
        self.nodes.borrow().iter().cloned().collect()
    }

    fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    fn has_node(&self, id: &T) -> bool {
        self.nodes.borrow().contains(id)
    }

    fn register_node(&self, id: &T) {
        if !self.has_node(id) {
            self.nodes.borrow_mut().insert(id.clone());
        }
    }

    fn trace_count(&self) -> usize {
        self.traces.borrow().len()
    }

    fn is_successful(&self, trace: usize) -> bool {
        self.traces.borrow()[trace].is_successful()
    }

    fn is_involved(&self, trace: usize, id: &T) -> bool {
        self.traces.borrow()[trace].is_involved(id)
    }

    fn revision(&self) -> u64 {
        self.revision.get()
    }

    fn counts(&self, id: &T) -> NodeCounts {
        self.counts
            .get_or_compute(id, self.revision(), || scan_counts(self, id))
    }
}

/// Mutable handle on one trace of a leaf [`Spectra`].
#[derive(Debug)]
pub struct TraceMut<'a, T: NodeId> {
    spectra: &'a Spectra<T>,
    index: usize,
}

impl<T: NodeId> TraceMut<'_, T> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_successful(&self) -> bool {
        self.spectra.is_successful(self.index)
    }

    /// Set involvement of one node, registering it if needed.
    pub fn set_involvement(&self, id: T, involved: bool) -> &Self {
        self.spectra.set_involvement(self.index, id, involved);
        self
    }

    /// Bulk form of [`TraceMut::set_involvement`].
    pub fn set_involvement_for<I>(&self, involvement: I) -> &Self
    where
        I: IntoIterator<Item = (T, bool)>,
    {
        for (id, involved) in involvement {
            self.spectra.set_involvement(self.index, id, involved);
        }
        self
    }

    /// Mark every node in `ids` as involved.
    pub fn involve<I>(&self, ids: I) -> &Self
    where
        I: IntoIterator<Item = T>,
    {
        self.set_involvement_for(ids.into_iter().map(|id| (id, true)))
    }
}
