//! The sync module tracks what happens to recorded command buffers once they are submitted.
//!
//! - The [`timeline`] module keeps the per-queue history of submitted command buffers, and carries label
//!   regions that were left open across command buffer, batch and submission boundaries.
//! - The [`hazard`] module defines the hazards handed to the validator by the detection engine.

use std::fmt;

use ash::vk;
use ash::vk::Handle;

pub mod hazard;
pub mod timeline;

/// Identifies a queue by its raw Vulkan handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueueId(pub u64);

impl From<vk::Queue> for QueueId {
    fn from(value: vk::Queue) -> Self {
        QueueId(value.as_raw())
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VkQueue {:#x}", self.0)
    }
}

/// Identifies the batch an access was submitted with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BatchTag {
    /// Queue the batch was submitted to.
    pub queue: QueueId,
    /// Index of the submit call on that queue.
    pub submission: u64,
    /// Index of the batch (`VkSubmitInfo`) inside the submit call.
    pub batch_index: u32,
}
