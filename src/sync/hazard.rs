//! Hazards as handed over by the detection engine.

use std::fmt;

use crate::command_buffer::AccessRecordRef;

/// The kind of conflict between two accesses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HazardKind {
    /// A read that is not ordered after a prior write.
    ReadAfterWrite,
    /// A write that is not ordered after a prior read.
    WriteAfterRead,
    /// A write that is not ordered after a prior write.
    WriteAfterWrite,
    /// A read racing a write submitted on another queue.
    ReadRacingWrite,
    /// A write racing a write submitted on another queue.
    WriteRacingWrite,
    /// A write racing a read submitted on another queue.
    WriteRacingRead,
    /// A write to a swapchain image that is still being presented.
    WriteAfterPresent,
    /// A read from a swapchain image that is still being presented.
    ReadAfterPresent,
    /// A present of an image that is still being read.
    PresentAfterRead,
    /// A present of an image that is still being written.
    PresentAfterWrite,
}

impl HazardKind {
    /// Name of the hazard as used in validation messages.
    pub fn name(&self) -> &'static str {
        match self {
            HazardKind::ReadAfterWrite => "READ_AFTER_WRITE",
            HazardKind::WriteAfterRead => "WRITE_AFTER_READ",
            HazardKind::WriteAfterWrite => "WRITE_AFTER_WRITE",
            HazardKind::ReadRacingWrite => "READ_RACING_WRITE",
            HazardKind::WriteRacingWrite => "WRITE_RACING_WRITE",
            HazardKind::WriteRacingRead => "WRITE_RACING_READ",
            HazardKind::WriteAfterPresent => "WRITE_AFTER_PRESENT",
            HazardKind::ReadAfterPresent => "READ_AFTER_PRESENT",
            HazardKind::PresentAfterRead => "PRESENT_AFTER_READ",
            HazardKind::PresentAfterWrite => "PRESENT_AFTER_WRITE",
        }
    }

    /// True if the prior access only read the resource. Such hazards cannot corrupt data that was already
    /// written, and are reported with a lower severity.
    pub fn prior_is_read(&self) -> bool {
        matches!(self, HazardKind::WriteAfterRead | HazardKind::WriteRacingRead | HazardKind::PresentAfterRead)
    }
}

impl fmt::Display for HazardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A hazard between two recorded accesses, as established by the detector.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HazardResult {
    /// What kind of conflict this is.
    pub kind: HazardKind,
    /// The access being recorded or submitted when the hazard was found.
    pub current: AccessRecordRef,
    /// The earlier access it conflicts with.
    pub prior: AccessRecordRef,
}
