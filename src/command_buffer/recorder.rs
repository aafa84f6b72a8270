//! Stamps resource accesses with the label regions open at record time.

use ash::vk;

use crate::command_buffer::{AccessRecord, AccessRecordRef, Position};
use crate::label::LabelStack;
use crate::resource::ResourceId;

/// Records accesses for a single command buffer. Recording into one command buffer is single-threaded,
/// so the recorder needs no synchronization of its own.
#[derive(Debug, Default, Clone)]
pub struct AccessRecorder {
    pub(crate) stack: LabelStack,
    pub(crate) records: Vec<AccessRecord>,
}

impl AccessRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence index the next access will receive.
    pub fn next_sequence(&self) -> u32 {
        self.records.len() as u32
    }

    /// The label stack of the command buffer being recorded.
    pub fn stack(&self) -> &LabelStack {
        &self.stack
    }

    /// Mutable access to the label stack.
    pub fn stack_mut(&mut self) -> &mut LabelStack {
        &mut self.stack
    }

    /// All accesses recorded so far, in sequence order.
    pub fn records(&self) -> &[AccessRecord] {
        &self.records
    }

    /// Append an access, stamped with a snapshot of the current label stack.
    pub fn record_access(
        &mut self,
        position: Position,
        resource: ResourceId,
        stage_mask: vk::PipelineStageFlags2,
        access_mask: vk::AccessFlags2,
    ) -> AccessRecordRef {
        let record = AccessRecord {
            resource,
            stage_mask,
            access_mask,
            label_path: self.stack.snapshot(),
            position,
            origin: None,
            batch: None,
        };
        let handle = record.handle();
        self.records.push(record);
        handle
    }

    /// Forget all accesses and open regions.
    pub fn clear(&mut self) {
        self.stack.clear();
        self.records.clear();
    }
}
