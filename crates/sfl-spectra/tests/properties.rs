//! Property tests for the spectra count invariants.

use proptest::prelude::*;
use sfl_spectra::{HierarchicalSpectra, Spectra, Spectrum, SpectrumExt};
use std::rc::Rc;

const NODES: u8 = 6;

fn trace_strategy() -> impl Strategy<Value = (bool, Vec<bool>)> {
    (any::<bool>(), prop::collection::vec(any::<bool>(), NODES as usize))
}

fn build(traces: &[(bool, Vec<bool>)]) -> Spectra<u8> {
    let spectra = Spectra::new();
    for id in 0..NODES {
        spectra.node(id);
    }
    for (successful, involvement) in traces {
        spectra
            .add_trace(*successful)
            .set_involvement_for((0..NODES).zip(involvement.iter().copied()));
    }
    spectra
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn leaf_counts_cover_every_trace(traces in prop::collection::vec(trace_strategy(), 0..20)) {
        let spectra = build(&traces);
        let failing = traces.iter().filter(|(ok, _)| !ok).count();
        for node in spectra.nodes() {
            let c = node.counts();
            prop_assert_eq!(c.total(), spectra.trace_count());
            prop_assert_eq!(c.failing(), failing);
        }
    }

    #[test]
    fn parent_counts_cover_every_trace(
        traces in prop::collection::vec(trace_strategy(), 0..20),
        mapping in prop::collection::vec(0u8..3, NODES as usize),
    ) {
        let leaf = Rc::new(build(&traces));
        let level = HierarchicalSpectra::new(Rc::clone(&leaf));
        for (child, parent) in mapping.iter().enumerate() {
            level.set_parent(*parent, child as u8);
        }
        for parent in level.nodes() {
            let c = parent.counts();
            prop_assert_eq!(c.total(), leaf.trace_count());
            // a parent is involved at least as often as any of its children
            for child in level.children_of(parent.identifier()) {
                prop_assert!(c.involved_failing >= leaf.counts(&child).involved_failing);
                prop_assert!(c.involved_successful >= leaf.counts(&child).involved_successful);
            }
        }
    }

    #[test]
    fn counts_track_late_edits(
        traces in prop::collection::vec(trace_strategy(), 1..10),
        extra in trace_strategy(),
    ) {
        let spectra = build(&traces);
        for node in spectra.nodes() {
            node.counts();
        }
        spectra
            .add_trace(extra.0)
            .set_involvement_for((0..NODES).zip(extra.1.iter().copied()));
        let fresh = build(&[traces.clone(), vec![extra]].concat());
        for id in 0..NODES {
            prop_assert_eq!(spectra.counts(&id), fresh.counts(&id));
        }
    }
}
