pub use ash::vk;

pub use crate::core::app_info::*;
pub use crate::core::error::Error;

pub use crate::label::{LabelFrame, LabelPath, LabelStack, NO_LABEL_REGION};
pub use crate::resource::{ResourceId, ResourceIdentity, ResourceKind, ResourceTable};

pub use crate::command_buffer::{AccessRecord, AccessRecordRef, CommandBufferId, CommandBufferLevel, Position};
pub use crate::command_buffer::buffer_log::CommandBufferLog;

pub use crate::sync::{BatchTag, QueueId};
pub use crate::sync::hazard::{HazardKind, HazardResult};
pub use crate::sync::timeline::{OpenRegion, SubmissionTimeline};

pub use crate::access::catalog::StageAccessCatalog;
pub use crate::access::summary::{AccessMaskSummarizer, StageAccessMap};

pub use crate::report::attributor::{Attribution, HazardAttributor, Location};
pub use crate::report::format::ReportFormatter;
pub use crate::report::sink::{LogSink, ReportSink};

pub use crate::validator::SyncValidator;
