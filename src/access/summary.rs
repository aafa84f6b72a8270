//! Collapses per-stage access masks into the shortest faithful textual form.
//!
//! A stage whose observed accesses cover every access it can legally produce is printed as
//! `all accesses at <stage>`. Everything else is printed literally, as
//! `<access>|<access> accesses at <stage>`. Meta-stages are printed in place of their members
//! when every supported member saw the same accesses.
//!
//! Compaction only kicks in from [`MIN_COMPACT_BITS`] distinct access bits onwards. Two bits are
//! always spelled out, since "all accesses" would suggest a broader hazard than the one that occurred.

use std::collections::BTreeMap;

use ash::vk;

use crate::access::catalog::StageAccessCatalog;
use crate::access::names::{access_mask_names, bits, stage_name};

/// Minimum number of distinct access bits before a stage or meta-stage is compacted.
pub const MIN_COMPACT_BITS: u32 = 3;

/// Observed accesses, split up per pipeline stage.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StageAccessMap {
    /// Simple stages known to the catalog, keyed by raw stage bit.
    stages: BTreeMap<u64, vk::AccessFlags2>,
    /// Stages the catalog does not recognize under the current capabilities, with the full access mask.
    unsupported: BTreeMap<u64, vk::AccessFlags2>,
}

impl StageAccessMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split up a `(stage_mask, access_mask)` pair. Meta-stage bits are expanded into their supported members,
    /// and every stage keeps only the accesses it can legally produce.
    pub fn from_masks(catalog: &StageAccessCatalog, stage_mask: vk::PipelineStageFlags2, access_mask: vk::AccessFlags2) -> Self {
        let mut map = Self::new();
        let expanded = catalog.expand_accesses(access_mask);
        for bit in bits(stage_mask.as_raw()) {
            let stage = vk::PipelineStageFlags2::from_raw(bit);
            match (catalog.meta_stage_members(stage), catalog.legal_accesses(stage)) {
                (Some(members), Some(_)) => {
                    for member in bits(members.as_raw()) {
                        let member = vk::PipelineStageFlags2::from_raw(member);
                        if let Some(legal) = catalog.legal_accesses(member) {
                            map.insert(member, expanded & legal);
                        }
                    }
                }
                (None, Some(legal)) => {
                    map.insert(stage, expanded & legal);
                }
                _ => {
                    map.insert_unsupported(stage, access_mask);
                }
            }
        }
        map
    }

    /// Add accesses for a simple stage. Empty masks are ignored.
    pub fn insert(&mut self, stage: vk::PipelineStageFlags2, access: vk::AccessFlags2) {
        if access.is_empty() {
            return;
        }
        let entry = self.stages.entry(stage.as_raw()).or_insert(vk::AccessFlags2::empty());
        *entry |= access;
    }

    /// Add accesses for a stage the catalog does not recognize.
    pub fn insert_unsupported(&mut self, stage: vk::PipelineStageFlags2, access: vk::AccessFlags2) {
        let entry = self.unsupported.entry(stage.as_raw()).or_insert(vk::AccessFlags2::empty());
        *entry |= access;
    }

    /// Accesses recorded for a simple stage.
    pub fn get(&self, stage: vk::PipelineStageFlags2) -> Option<vk::AccessFlags2> {
        self.stages.get(&stage.as_raw()).copied()
    }

    /// True if no accesses were recorded at all.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty() && self.unsupported.is_empty()
    }
}

/// Renders a [`StageAccessMap`] into text, using a [`StageAccessCatalog`] to decide what can be compacted.
#[derive(Debug, Copy, Clone)]
pub struct AccessMaskSummarizer<'c> {
    catalog: &'c StageAccessCatalog,
}

impl<'c> AccessMaskSummarizer<'c> {
    /// Create a summarizer over a catalog.
    pub fn new(catalog: &'c StageAccessCatalog) -> Self {
        Self {
            catalog,
        }
    }

    /// Summarize a raw `(stage_mask, access_mask)` pair.
    pub fn summarize_masks(&self, stage_mask: vk::PipelineStageFlags2, access_mask: vk::AccessFlags2) -> String {
        let map = StageAccessMap::from_masks(self.catalog, stage_mask, access_mask);
        if map.is_empty() {
            return format!("{} accesses at {}", access_mask_names(access_mask), stage_mask_names(stage_mask));
        }
        self.summarize(&map)
    }

    /// Summarize a stage to access map. Entries are ordered by stage bit and joined by `", "`.
    pub fn summarize(&self, map: &StageAccessMap) -> String {
        let mut remaining = map.stages.clone();
        let mut entries = BTreeMap::new();

        for meta in self.catalog.meta_stages() {
            if let Some(access) = self.collapsible(meta, &remaining) {
                if let Some(members) = self.catalog.meta_stage_members(meta) {
                    for member in bits(members.as_raw()) {
                        remaining.remove(&member);
                    }
                }
                entries.insert(meta.as_raw(), access);
            }
        }
        entries.extend(remaining);

        entries
            .into_iter()
            .map(|(stage, access)| self.describe(vk::PipelineStageFlags2::from_raw(stage), access))
            .chain(map.unsupported.iter().map(|(stage, access)| {
                format!("{} accesses at {}", access_mask_names(*access), stage_name(vk::PipelineStageFlags2::from_raw(*stage)))
            }))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// A meta-stage is collapsible if every supported member saw the exact same accesses, and those
    /// accesses span enough bits. Returns the shared access mask.
    fn collapsible(&self, meta: vk::PipelineStageFlags2, stages: &BTreeMap<u64, vk::AccessFlags2>) -> Option<vk::AccessFlags2> {
        let members = self.catalog.meta_stage_members(meta)?;
        if members.is_empty() {
            return None;
        }
        let mut shared = None;
        for member in bits(members.as_raw()) {
            let access = *stages.get(&member)?;
            match shared {
                None => shared = Some(access),
                Some(prev) if prev != access => return None,
                Some(_) => {}
            }
        }
        shared.filter(|access| access.as_raw().count_ones() >= MIN_COMPACT_BITS)
    }

    fn describe(&self, stage: vk::PipelineStageFlags2, access: vk::AccessFlags2) -> String {
        let name = stage_name(stage);
        let is_all = self.catalog.legal_accesses(stage) == Some(access) && access.as_raw().count_ones() >= MIN_COMPACT_BITS;
        if is_all {
            format!("all accesses at {name}")
        } else {
            format!("{} accesses at {name}", access_mask_names(access))
        }
    }
}

fn stage_mask_names(mask: vk::PipelineStageFlags2) -> String {
    bits(mask.as_raw())
        .map(|bit| stage_name(vk::PipelineStageFlags2::from_raw(bit)))
        .collect::<Vec<_>>()
        .join("|")
}
