//! Resolves where the two accesses of a hazard happened.

use anyhow::Result;

use crate::access::catalog::StageAccessCatalog;
use crate::access::summary::AccessMaskSummarizer;
use crate::command_buffer::{AccessRecord, AccessRecordRef};
use crate::label::NO_LABEL_REGION;
use crate::resource::{ResourceId, ResourceTable};
use crate::sync::hazard::{HazardKind, HazardResult};
use crate::sync::timeline::SubmissionTimeline;
use crate::Error;

/// State of a referenced access in the command buffer that recorded it.
#[derive(Debug, Clone)]
pub enum LiveRecord {
    /// The command buffer still holds the access in the generation the reference was captured in.
    Current(AccessRecord),
    /// The command buffer was reset (or freed) since the reference was captured.
    Stale,
    /// The command buffer was never seen, or never recorded an access with this sequence index.
    Unknown,
}

/// Source of accesses that were recorded but not necessarily submitted yet.
pub trait RecordSource {
    /// Look up a reference in the live command buffer logs.
    fn live_record(&self, handle: &AccessRecordRef) -> Result<LiveRecord>;
}

/// Where an access happened, in terms meaningful to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// The resource that was accessed.
    pub resource: ResourceId,
    /// Label path of the access, or `"no label region"`.
    pub label: String,
    /// Debug name of the resource at report time. Empty if it has none.
    pub object_name: String,
    /// Summary of the stages and accesses involved, if the access could still be found.
    pub access: Option<String>,
    /// True if the access was recorded in a command buffer that was reset before the access was ever
    /// submitted, so its label path could no longer be resolved.
    pub degraded: bool,
}

/// Resolved locations of both sides of a hazard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    /// The kind of hazard.
    pub kind: HazardKind,
    /// Where the current access happened.
    pub current: Location,
    /// Where the prior access happened.
    pub prior: Location,
}

/// Looks up both accesses of a hazard and resolves their label path, object name and access summary.
///
/// Only the resources of the two referenced accesses are ever named, never other resources used by the
/// same command.
pub struct HazardAttributor<'a> {
    catalog: &'a StageAccessCatalog,
    resources: &'a ResourceTable,
    timeline: &'a SubmissionTimeline,
    source: &'a dyn RecordSource,
}

impl<'a> HazardAttributor<'a> {
    /// Create an attributor over the validator's state.
    pub fn new(
        catalog: &'a StageAccessCatalog,
        resources: &'a ResourceTable,
        timeline: &'a SubmissionTimeline,
        source: &'a dyn RecordSource,
    ) -> Self {
        Self {
            catalog,
            resources,
            timeline,
            source,
        }
    }

    /// Resolve both sides of a hazard.
    /// # Errors
    /// * Fails with [`Error::UnknownAccessRecord`] if either reference was never recorded.
    pub fn attribute(&self, hazard: &HazardResult) -> Result<Attribution> {
        Ok(Attribution {
            kind: hazard.kind,
            current: self.locate(&hazard.current)?,
            prior: self.locate(&hazard.prior)?,
        })
    }

    /// Resolve a single access.
    pub fn locate(&self, handle: &AccessRecordRef) -> Result<Location> {
        let submitted = self.timeline.lookup(handle)?;
        match self.source.live_record(handle)? {
            LiveRecord::Current(record) => self.location(&submitted.unwrap_or(record)),
            LiveRecord::Stale => match submitted {
                Some(record) => self.location(&record),
                None => {
                    debug!(
                        "Access #{} of {} refers to generation {}, which was reset before submission",
                        handle.sequence, handle.command_buffer, handle.generation
                    );
                    Ok(Location {
                        resource: handle.resource,
                        label: NO_LABEL_REGION.to_owned(),
                        object_name: self.resources.name_of(handle.resource)?,
                        access: None,
                        degraded: true,
                    })
                }
            },
            LiveRecord::Unknown => match submitted {
                Some(record) => self.location(&record),
                None => Err(Error::UnknownAccessRecord {
                    command_buffer: handle.command_buffer.0,
                    generation: handle.generation,
                    sequence: handle.sequence,
                }
                .into()),
            },
        }
    }

    fn location(&self, record: &AccessRecord) -> Result<Location> {
        Ok(Location {
            resource: record.resource,
            label: record.label_path.to_string(),
            object_name: self.resources.name_of(record.resource)?,
            access: Some(self.summarize(record)),
            degraded: false,
        })
    }

    fn summarize(&self, record: &AccessRecord) -> String {
        AccessMaskSummarizer::new(self.catalog).summarize_masks(record.stage_mask, record.access_mask)
    }
}
