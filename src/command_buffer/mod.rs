//! Per command buffer bookkeeping of debug labels and resource accesses.
//!
//! Every command buffer owns a [`CommandBufferLog`](buffer_log::CommandBufferLog). While recording, the log's
//! [`AccessRecorder`](recorder::AccessRecorder) stamps each resource access with the label regions that are
//! open at that point, and label begin/end commands are stored as [`LabelEvent`]s numbered against the same
//! sequence as the accesses. This allows secondary command buffers to be spliced into primaries, and the
//! timeline to re-resolve paths once it knows which regions were still open from earlier submissions.
//!
//! # Generations
//!
//! Resetting a command buffer bumps the generation of its log. An [`AccessRecordRef`] captured in an older
//! generation is never used to look up labels in the live log again.

use std::fmt;

use ash::vk;
use ash::vk::Handle;

use crate::label::LabelPath;
use crate::resource::ResourceId;
use crate::sync::BatchTag;

pub mod buffer_log;
pub mod recorder;

/// Identifies a command buffer by its raw Vulkan handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandBufferId(pub u64);

impl From<vk::CommandBuffer> for CommandBufferId {
    fn from(value: vk::CommandBuffer) -> Self {
        CommandBufferId(value.as_raw())
    }
}

impl fmt::Display for CommandBufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VkCommandBuffer {:#x}", self.0)
    }
}

/// Level of a command buffer.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum CommandBufferLevel {
    /// Can be submitted to a queue.
    #[default]
    Primary,
    /// Can only be executed from a primary command buffer.
    Secondary,
}

impl From<vk::CommandBufferLevel> for CommandBufferLevel {
    fn from(value: vk::CommandBufferLevel) -> Self {
        if value == vk::CommandBufferLevel::SECONDARY {
            CommandBufferLevel::Secondary
        } else {
            CommandBufferLevel::Primary
        }
    }
}

/// Where an access was recorded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    /// Command buffer the access was recorded into.
    pub command_buffer: CommandBufferId,
    /// Generation of that command buffer's log at record time.
    pub generation: u32,
    /// Index of the access inside the command buffer.
    pub sequence: u32,
}

/// A single access of a resource by a recorded command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    /// The resource that was accessed.
    pub resource: ResourceId,
    /// Stages the access happened at.
    pub stage_mask: vk::PipelineStageFlags2,
    /// Types of the access.
    pub access_mask: vk::AccessFlags2,
    /// Label regions the access was recorded in. Before submission this only holds regions opened inside
    /// the command buffer itself; the timeline prefixes regions carried over from earlier command buffers.
    pub label_path: LabelPath,
    /// Where the access lives.
    pub position: Position,
    /// Where the access was originally recorded, if it was spliced in from a secondary command buffer.
    pub origin: Option<Position>,
    /// Submission batch this access was ingested with.
    pub batch: Option<BatchTag>,
}

impl AccessRecord {
    /// Reference to this record.
    pub fn handle(&self) -> AccessRecordRef {
        AccessRecordRef {
            command_buffer: self.position.command_buffer,
            generation: self.position.generation,
            sequence: self.position.sequence,
            resource: self.resource,
        }
    }
}

/// Small copyable reference to an [`AccessRecord`], handed to the hazard detector.
///
/// The resource is stored in the reference itself so a report can still name the object after the
/// command buffer that recorded it was reset.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AccessRecordRef {
    /// Command buffer the access lives in.
    pub command_buffer: CommandBufferId,
    /// Generation of the command buffer when the access was recorded.
    pub generation: u32,
    /// Index of the access inside the command buffer.
    pub sequence: u32,
    /// Resource that was accessed.
    pub resource: ResourceId,
}

const_assert_eq!(std::mem::size_of::<AccessRecordRef>(), 24);

/// Begin or end of a label region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelOp {
    /// `vkCmdBeginDebugUtilsLabelEXT`
    Push(String),
    /// `vkCmdEndDebugUtilsLabelEXT`
    Pop,
}

/// A label command, positioned relative to the accesses of the command buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEvent {
    /// Number of accesses recorded before this event.
    pub at: u32,
    /// What happened.
    pub op: LabelOp,
}
