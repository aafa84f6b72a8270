//! The [`CommandBufferLog`] holds everything recorded into one command buffer that matters for attribution.

use std::ops::Range;

use anyhow::Result;
use ash::vk;

use crate::command_buffer::recorder::AccessRecorder;
use crate::command_buffer::{AccessRecord, AccessRecordRef, CommandBufferId, CommandBufferLevel, LabelEvent, LabelOp, Position};
use crate::label::{LabelPath, LabelStack};
use crate::resource::ResourceId;
use crate::Error;

/// Label paths of a log resolved against the regions that were open before it started.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolvedLog {
    /// Full label path of every access, in sequence order.
    pub paths: Vec<LabelPath>,
    /// Regions still open once the log has been fully walked.
    pub open: LabelPath,
    /// Number of carried regions this log closed. Carried regions are closed oldest first, so these are
    /// always the outermost carried regions.
    pub closed_carried: usize,
    /// Position of the begin command of every region in `open` that was opened by this log. These are always
    /// the innermost regions of `open`.
    pub opened_at: Vec<u32>,
    /// Number of label end commands that found no open region at all.
    pub dropped_pops: u32,
}

/// Accesses and label commands recorded into a single command buffer.
///
/// # Example
/// ```
/// # use syncval_attrib::*;
/// # use syncval_attrib::command_buffer::buffer_log::CommandBufferLog;
/// let mut log = CommandBufferLog::new(CommandBufferId(1), CommandBufferLevel::Primary);
/// log.record_label_push("A");
/// log.record_label_push("B");
/// let access = log.record_access(ResourceId(7), vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_WRITE);
/// log.record_label_pop();
/// assert_eq!(log.record(access.sequence).unwrap().label_path.to_string(), "A::B");
/// ```
#[derive(Debug, Clone)]
pub struct CommandBufferLog {
    id: CommandBufferId,
    level: CommandBufferLevel,
    generation: u32,
    recorder: AccessRecorder,
    events: Vec<LabelEvent>,
}

impl CommandBufferLog {
    /// Create an empty log in generation zero.
    pub fn new(id: CommandBufferId, level: CommandBufferLevel) -> Self {
        Self {
            id,
            level,
            generation: 0,
            recorder: AccessRecorder::new(),
            events: Vec::new(),
        }
    }

    /// The command buffer this log belongs to.
    pub fn id(&self) -> CommandBufferId {
        self.id
    }

    /// Level of the command buffer.
    pub fn level(&self) -> CommandBufferLevel {
        self.level
    }

    /// Current generation. Bumped on every reset.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Number of accesses in the log.
    pub fn len(&self) -> u32 {
        self.recorder.next_sequence()
    }

    /// True if no accesses were recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All accesses, in sequence order.
    pub fn records(&self) -> &[AccessRecord] {
        self.recorder.records()
    }

    /// Access with the given sequence index.
    pub fn record(&self, sequence: u32) -> Option<&AccessRecord> {
        self.recorder.records().get(sequence as usize)
    }

    /// Look up a reference, but only if it was captured in the current generation.
    pub fn lookup(&self, handle: &AccessRecordRef) -> Option<&AccessRecord> {
        if handle.command_buffer != self.id || handle.generation != self.generation {
            return None;
        }
        self.record(handle.sequence)
    }

    /// All label commands, ordered by position.
    pub fn events(&self) -> &[LabelEvent] {
        &self.events
    }

    /// Label regions currently open in this command buffer.
    pub fn current_path(&self) -> LabelPath {
        self.recorder.stack().snapshot()
    }

    /// Record an access of `resource`.
    pub fn record_access(
        &mut self,
        resource: ResourceId,
        stage_mask: vk::PipelineStageFlags2,
        access_mask: vk::AccessFlags2,
    ) -> AccessRecordRef {
        let position = Position {
            command_buffer: self.id,
            generation: self.generation,
            sequence: self.recorder.next_sequence(),
        };
        #[cfg(feature = "log-events")]
        trace!("{} #{}: {:?} {:?} on {}", self.id, position.sequence, stage_mask, access_mask, resource);
        self.recorder.record_access(position, resource, stage_mask, access_mask)
    }

    /// Record the beginning of a label region.
    pub fn record_label_push(&mut self, name: impl Into<String>) {
        let name = name.into();
        #[cfg(feature = "log-events")]
        trace!("{} #{}: begin label `{}`", self.id, self.len(), name);
        self.events.push(LabelEvent {
            at: self.len(),
            op: LabelOp::Push(name.clone()),
        });
        self.recorder.stack_mut().push(name);
    }

    /// Record the end of a label region. Ending a region that was not begun in this command buffer is allowed,
    /// it will be matched against regions left open on the queue at submission time.
    pub fn record_label_pop(&mut self) {
        #[cfg(feature = "log-events")]
        trace!("{} #{}: end label", self.id, self.len());
        self.events.push(LabelEvent {
            at: self.len(),
            op: LabelOp::Pop,
        });
        self.recorder.stack_mut().pop();
    }

    /// Walk all accesses and label commands in order, starting with `stack`. Calls `on_access` with every
    /// sequence index and the stack at that point, and returns the stack after the last command.
    fn walk(&self, mut stack: LabelStack, mut on_access: impl FnMut(u32, &LabelStack)) -> LabelStack {
        let mut events = self.events.iter().peekable();
        for sequence in 0..self.len() {
            while let Some(event) = events.next_if(|event| event.at <= sequence) {
                apply(&mut stack, event);
            }
            on_access(sequence, &stack);
        }
        for event in events {
            apply(&mut stack, event);
        }
        stack
    }

    /// Label regions opened in this command buffer that are open right before the access at `at`.
    /// Label commands recorded at exactly `at` are included.
    pub fn label_path_at(&self, at: u32) -> LabelPath {
        let mut stack = LabelStack::new();
        for event in self.events.iter().take_while(|event| event.at <= at) {
            apply(&mut stack, event);
        }
        stack.snapshot()
    }

    /// Resolve the full label path of every access, given the regions that were already open on the queue
    /// when this command buffer started executing. Ending a region with no region open in the command buffer
    /// closes the oldest carried region.
    pub fn resolve(&self, carried: &LabelPath) -> ResolvedLog {
        let mut paths = Vec::with_capacity(self.len() as usize);
        let stack = self.walk(LabelStack::with_path(carried), |_, stack| paths.push(stack.snapshot()));
        let mut opened_at = Vec::new();
        for event in &self.events {
            match event.op {
                LabelOp::Push(_) => opened_at.push(event.at),
                LabelOp::Pop => {
                    opened_at.pop();
                }
            }
        }
        ResolvedLog {
            paths,
            open: stack.snapshot(),
            closed_carried: carried.depth() - stack.carried(),
            opened_at,
            dropped_pops: stack.unmatched_pops(),
        }
    }

    /// Splice a secondary command buffer into this one, as if its commands were recorded at `at_index`.
    ///
    /// The secondary's accesses are copied in with their sequence indices rebased, and their label paths are
    /// prefixed with the regions open in this command buffer at `at_index`. Accesses and label commands
    /// recorded after `at_index` move back by the secondary's length. The secondary itself is left untouched,
    /// so the same secondary can be spliced into any number of primaries.
    ///
    /// Returns the sequence range the spliced accesses now occupy.
    /// # Errors
    /// * Fails if this is not a primary command buffer, `secondary` is not a secondary command buffer,
    ///   or `at_index` lies past the end of this log.
    pub fn splice_secondary(&mut self, at_index: u32, secondary: &CommandBufferLog) -> Result<Range<u32>> {
        if self.level != CommandBufferLevel::Primary {
            return Err(Error::InvalidSplice(format!("{} is not a primary command buffer", self.id)).into());
        }
        if secondary.level != CommandBufferLevel::Secondary {
            return Err(Error::InvalidSplice(format!("{} is not a secondary command buffer", secondary.id)).into());
        }
        if at_index > self.len() {
            return Err(Error::InvalidSplice(format!(
                "splice position {} lies past the end of {} ({} accesses)",
                at_index,
                self.id,
                self.len()
            ))
            .into());
        }

        let count = secondary.len();
        let split = self.events.partition_point(|event| event.at <= at_index);
        let tail = self.events.split_off(split);
        self.events.extend(secondary.events.iter().map(|event| LabelEvent {
            at: event.at + at_index,
            op: event.op.clone(),
        }));
        self.events.extend(tail.into_iter().map(|event| LabelEvent {
            at: event.at + count,
            op: event.op,
        }));

        let tail = self.recorder.records.split_off(at_index as usize);
        self.recorder.records.extend(secondary.records().iter().map(|record| AccessRecord {
            origin: record.origin.or(Some(record.position)),
            ..record.clone()
        }));
        self.recorder.records.extend(tail);

        let paths = self.resolve(&LabelPath::new()).paths;
        for (sequence, (record, path)) in self
            .recorder
            .records
            .iter_mut()
            .zip(paths)
            .enumerate()
            .skip(at_index as usize)
        {
            record.position = Position {
                command_buffer: self.id,
                generation: self.generation,
                sequence: sequence as u32,
            };
            record.label_path = path;
        }

        let stack = self.walk(LabelStack::new(), |_, _| {});
        self.recorder.stack = stack;

        Ok(at_index..at_index + count)
    }

    /// Reset the log for new recording, possibly changing the level of the command buffer.
    pub fn reset_with_level(&mut self, level: CommandBufferLevel) {
        self.reset();
        self.level = level;
    }

    /// Reset the log for new recording. All references into the previous generation become stale.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.recorder.clear();
        self.events.clear();
    }
}

fn apply(stack: &mut LabelStack, event: &LabelEvent) {
    match &event.op {
        LabelOp::Push(name) => stack.push(name.clone()),
        LabelOp::Pop => {
            stack.pop();
        }
    }
}
