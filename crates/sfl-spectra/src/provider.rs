//! Spectra providers and the JSON spectra dump.
//!
//! Coverage-format parsers live outside this crate; they plug in through
//! [`SpectraProvider`] and [`HierarchicalSpectraProvider`]. The JSON dump is
//! the one format loaded here:
//!
//! ```json
//! {
//!   "traces": [ { "successful": false, "involved": ["S1", "S2"] } ],
//!   "levels": [ { "method_a": ["S1"], "method_b": ["S2"] } ]
//! }
//! ```
//!
//! `levels` is ordered from the level directly above the leaves outwards.

use crate::error::{Result, SpectraError};
use crate::hierarchy::{HierarchicalSpectra, SpectrumLevel};
use crate::spectra::Spectra;
use crate::spectrum::{NodeId, Spectrum};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Log target of the warning for a dumped trace that involves no node.
pub const TRACE_SKIPPED_EVENT: &str = "spectra.trace_skipped";

/// Source of a leaf spectra.
pub trait SpectraProvider<T: NodeId> {
    fn load_spectra(&self) -> Result<Spectra<T>>;
}

/// Source of a full level stack.
pub trait HierarchicalSpectraProvider<T: NodeId + 'static> {
    fn load_hierarchical_spectra(&self) -> Result<LoadedHierarchy<T>>;
}

/// A level stack plus a handle on its leaf.
pub struct LoadedHierarchy<T: NodeId + 'static> {
    pub leaf: Rc<Spectra<T>>,
    pub top: Rc<dyn SpectrumLevel<Id = T>>,
}

impl<T: NodeId + 'static> LoadedHierarchy<T> {
    pub fn depth(&self) -> usize {
        self.top.depth()
    }
}

impl<T: NodeId + 'static> std::fmt::Debug for LoadedHierarchy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedHierarchy")
            .field("leaf", &self.leaf)
            .field("depth", &self.depth())
            .finish()
    }
}

/// One trace of the dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub successful: bool,
    #[serde(default)]
    pub involved: Vec<String>,
}

/// Serialized form of a spectra and its parent levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectraDump {
    #[serde(default)]
    pub traces: Vec<TraceRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub levels: Vec<IndexMap<String, Vec<String>>>,
}

impl SpectraDump {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Capture the traces of a leaf spectra. Only involved nodes are listed.
    pub fn capture<T: NodeId>(spectra: &Spectra<T>) -> Self {
        let ids = spectra.node_ids();
        let traces = (0..spectra.trace_count())
            .map(|trace| TraceRecord {
                successful: spectra.is_successful(trace),
                involved: ids
                    .iter()
                    .filter(|id| spectra.is_involved(trace, id))
                    .map(ToString::to_string)
                    .collect(),
            })
            .collect();
        Self {
            traces,
            levels: Vec::new(),
        }
    }

    /// Build the leaf spectra. Traces that involve no node are skipped.
    pub fn to_spectra(&self) -> Spectra<String> {
        let spectra = Spectra::new();
        let mut skipped = 0usize;
        for (index, record) in self.traces.iter().enumerate() {
            if record.involved.is_empty() {
                tracing::warn!(
                    target: TRACE_SKIPPED_EVENT,
                    trace = index,
                    "skipping trace without involved nodes"
                );
                skipped += 1;
                continue;
            }
            spectra
                .add_trace(record.successful)
                .involve(record.involved.iter().cloned());
        }
        tracing::debug!(
            traces = spectra.trace_count(),
            nodes = spectra.node_count(),
            skipped,
            "loaded spectra dump"
        );
        spectra
    }

    /// Build the leaf and stack every dumped level on top of it.
    ///
    /// A mapping to a node the level below does not know is skipped with a
    /// warning.
    pub fn to_hierarchy(&self) -> LoadedHierarchy<String> {
        let leaf = Rc::new(self.to_spectra());
        let mut top: Rc<dyn SpectrumLevel<Id = String>> = leaf.clone();
        for (depth, level) in self.levels.iter().enumerate() {
            let next: HierarchicalSpectra<String, dyn SpectrumLevel<Id = String>> =
                HierarchicalSpectra::new(Rc::clone(&top));
            for (parent, children) in level {
                for child in children {
                    if !top.has_node(child) {
                        tracing::warn!(
                            level = depth + 1,
                            parent = %parent,
                            child = %child,
                            "skipping mapping to unknown child node"
                        );
                        continue;
                    }
                    next.set_parent(parent.clone(), child.clone());
                }
            }
            top = Rc::new(next);
        }
        LoadedHierarchy { leaf, top }
    }
}

/// Loads a [`SpectraDump`] from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonSpectraProvider {
    path: PathBuf,
}

impl JsonSpectraProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_dump(&self) -> Result<SpectraDump> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| SpectraError::Io {
            path: self.path.clone(),
            source,
        })?;
        SpectraDump::from_json_str(&content)
    }
}

impl SpectraProvider<String> for JsonSpectraProvider {
    fn load_spectra(&self) -> Result<Spectra<String>> {
        Ok(self.read_dump()?.to_spectra())
    }
}

impl HierarchicalSpectraProvider<String> for JsonSpectraProvider {
    fn load_hierarchical_spectra(&self) -> Result<LoadedHierarchy<String>> {
        Ok(self.read_dump()?.to_hierarchy())
    }
}
