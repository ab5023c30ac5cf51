//! Per-region placeholder state.
//!
//! A region (an editable element such as a spoiler content) shows its
//! placeholder only while its state is active and it holds a single empty
//! block. State is keyed by the region's `NodeId`, so several regions never
//! share a flag.

use std::collections::BTreeMap;

use crate::model::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlaceholderState {
    region: NodeId,
    active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PlaceholderRegistry {
    regions: BTreeMap<NodeId, PlaceholderState>,
}

impl PlaceholderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&mut self, region: NodeId) {
        self.regions
            .insert(region, PlaceholderState { region, active: true });
    }

    pub fn disable(&mut self, region: NodeId) {
        if let Some(state) = self.regions.get_mut(&region) {
            state.active = false;
        }
    }

    pub fn is_active(&self, region: NodeId) -> bool {
        self.regions.get(&region).is_some_and(|s| s.active)
    }

    /// Whether the placeholder of `region` should be visible right now.
    pub fn is_visible(&self, doc: &Document, region: NodeId) -> bool {
        self.is_active(region) && is_blank(doc, region)
    }

    /// Forget removed regions and switch off regions that received content.
    pub fn sync(&mut self, doc: &Document) {
        self.regions.retain(|&region, _| doc.contains(region));
        for state in self.regions.values_mut() {
            if state.active && !is_blank(doc, state.region) {
                state.active = false;
            }
        }
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// A region holding exactly one child, which is empty.
pub fn is_blank(doc: &Document, region: NodeId) -> bool {
    match doc.children(region) {
        [only] => doc.is_empty(*only),
        _ => false,
    }
}
