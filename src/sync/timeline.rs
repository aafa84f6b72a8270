//! Per-queue history of submitted command buffers.
//!
//! A label region may be begun in one command buffer and ended in another one that executes later on the
//! same queue, even in a later submit call. The timeline resolves this by keeping, per queue, the stack of
//! regions that were left open by everything submitted so far. When a command buffer is ingested, its
//! accesses are re-resolved against that stack, and the regions it leaves open become the new stack.
//!
//! Regions never carry over between queues.
//!
//! # Ownership
//! Ingesting copies every access of the command buffer into the timeline, together with its resolved label
//! path. The timeline's copy outlives resets of the command buffer, and is only dropped when the queue is destroyed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use anyhow::Result;

use crate::command_buffer::buffer_log::CommandBufferLog;
use crate::command_buffer::{AccessRecord, AccessRecordRef, CommandBufferId, Position};
use crate::label::LabelPath;
use crate::sync::{BatchTag, QueueId};
use crate::Error;

/// A label region that was begun but not yet ended on a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRegion {
    /// Name of the region.
    pub name: String,
    /// Where the region was begun.
    pub opened_at: Position,
}

/// One command buffer, as it was submitted.
#[derive(Debug, Clone)]
struct IngestedLog {
    /// Global ingest order, used to find the most recent submission of a command buffer across queues.
    order: u64,
    command_buffer: CommandBufferId,
    generation: u32,
    records: Vec<AccessRecord>,
}

/// Timeline of a single queue. Created on first submission to the queue and dropped with the queue.
#[derive(Debug)]
pub struct QueueTimeline {
    queue: QueueId,
    submission: u64,
    open: Vec<OpenRegion>,
    logs: Vec<IngestedLog>,
    /// Most recent ingest of every `(command buffer, generation)` pair.
    latest: HashMap<(CommandBufferId, u32), usize>,
}

impl QueueTimeline {
    /// Create an empty timeline for a queue.
    pub fn new(queue: QueueId) -> Self {
        Self {
            queue,
            submission: 0,
            open: Vec::new(),
            logs: Vec::new(),
            latest: HashMap::new(),
        }
    }

    /// The queue this timeline belongs to.
    pub fn queue(&self) -> QueueId {
        self.queue
    }

    /// Regions currently left open on this queue, outermost first.
    pub fn open_regions(&self) -> &[OpenRegion] {
        &self.open
    }

    /// Regions currently left open, as a path.
    pub fn open_path(&self) -> LabelPath {
        self.open.iter().map(|region| region.name.clone()).collect()
    }

    /// Start a new submit call. Batches ingested afterwards are tagged with the new submission index.
    pub fn begin_submission(&mut self) -> u64 {
        self.submission += 1;
        self.submission
    }

    /// Number of command buffers ingested so far.
    pub fn len(&self) -> usize {
        self.logs.len()
    }

    /// True if nothing was ingested yet.
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    fn ingest(&mut self, order: u64, batch_index: u32, log: &CommandBufferLog) -> BatchTag {
        let tag = BatchTag {
            queue: self.queue,
            submission: self.submission,
            batch_index,
        };

        let resolved = log.resolve(&self.open_path());
        if resolved.dropped_pops > 0 {
            debug!(
                "{} ends {} label region(s) that were never begun on {}, ignoring",
                log.id(),
                resolved.dropped_pops,
                self.queue
            );
        }

        let records = log
            .records()
            .iter()
            .zip(resolved.paths)
            .map(|(record, label_path)| AccessRecord {
                label_path,
                batch: Some(tag),
                ..record.clone()
            })
            .collect();

        self.open.drain(..resolved.closed_carried.min(self.open.len()));
        let survivors = self.open.len();
        for (name, at) in resolved.open.names().skip(survivors).zip(resolved.opened_at) {
            self.open.push(OpenRegion {
                name: name.to_owned(),
                opened_at: Position {
                    command_buffer: log.id(),
                    generation: log.generation(),
                    sequence: at,
                },
            });
        }
        if !self.open.is_empty() {
            debug!("{} leaves label region(s) `{}` open on {}", log.id(), self.open_path(), self.queue);
        }

        self.latest.insert((log.id(), log.generation()), self.logs.len());
        self.logs.push(IngestedLog {
            order,
            command_buffer: log.id(),
            generation: log.generation(),
            records,
        });
        tag
    }

    /// Most recently ingested copy of a record, together with its ingest order.
    fn lookup(&self, handle: &AccessRecordRef) -> Option<(u64, &AccessRecord)> {
        let index = *self.latest.get(&(handle.command_buffer, handle.generation))?;
        let log = self.logs.get(index)?;
        debug_assert!(log.command_buffer == handle.command_buffer && log.generation == handle.generation);
        log.records.get(handle.sequence as usize).map(|record| (log.order, record))
    }
}

/// Submission history of all queues.
#[derive(Debug, Default)]
pub struct SubmissionTimeline {
    queues: RwLock<HashMap<QueueId, Mutex<QueueTimeline>>>,
    order: AtomicU64,
}

impl SubmissionTimeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_queue<R>(&self, queue: QueueId, f: impl FnOnce(&mut QueueTimeline) -> R) -> Result<R> {
        {
            let queues = self.queues.read().map_err(|_| Error::PoisonError)?;
            if let Some(timeline) = queues.get(&queue) {
                let mut timeline = timeline.lock().map_err(|_| Error::PoisonError)?;
                return Ok(f(&mut timeline));
            }
        }
        let mut queues = self.queues.write().map_err(|_| Error::PoisonError)?;
        let timeline = queues.entry(queue).or_insert_with(|| Mutex::new(QueueTimeline::new(queue)));
        let timeline = timeline.get_mut().map_err(|_| Error::PoisonError)?;
        Ok(f(timeline))
    }

    /// Start a new submit call on a queue. Returns the submission index.
    pub fn begin_submission(&self, queue: QueueId) -> Result<u64> {
        self.with_queue(queue, |timeline| timeline.begin_submission())
    }

    /// Ingest a command buffer submitted to `queue` as part of batch `batch_index` of the current submission.
    /// Command buffers must be ingested in submission order.
    pub fn ingest(&self, queue: QueueId, batch_index: u32, log: &CommandBufferLog) -> Result<BatchTag> {
        let order = self.order.fetch_add(1, Ordering::Relaxed);
        self.with_queue(queue, |timeline| timeline.ingest(order, batch_index, log))
    }

    /// Find the most recently submitted copy of a record, on any queue.
    pub fn lookup(&self, handle: &AccessRecordRef) -> Result<Option<AccessRecord>> {
        let queues = self.queues.read().map_err(|_| Error::PoisonError)?;
        let mut found: Option<(u64, AccessRecord)> = None;
        for timeline in queues.values() {
            let timeline = timeline.lock().map_err(|_| Error::PoisonError)?;
            if let Some((order, record)) = timeline.lookup(handle) {
                if found.as_ref().map_or(true, |(best, _)| order > *best) {
                    found = Some((order, record.clone()));
                }
            }
        }
        Ok(found.map(|(_, record)| record))
    }

    /// Regions currently left open on a queue, outermost first. Empty for queues that never had a submission.
    pub fn open_regions(&self, queue: QueueId) -> Result<Vec<OpenRegion>> {
        let queues = self.queues.read().map_err(|_| Error::PoisonError)?;
        match queues.get(&queue) {
            None => Ok(Vec::new()),
            Some(timeline) => Ok(timeline.lock().map_err(|_| Error::PoisonError)?.open_regions().to_vec()),
        }
    }

    /// Regions currently left open on a queue, as a path.
    pub fn open_path(&self, queue: QueueId) -> Result<LabelPath> {
        Ok(self.open_regions(queue)?.into_iter().map(|region| region.name).collect())
    }

    /// Number of command buffers ingested on a queue.
    pub fn ingested(&self, queue: QueueId) -> Result<usize> {
        let queues = self.queues.read().map_err(|_| Error::PoisonError)?;
        match queues.get(&queue) {
            None => Ok(0),
            Some(timeline) => Ok(timeline.lock().map_err(|_| Error::PoisonError)?.len()),
        }
    }

    /// Drop all history and open regions of a destroyed queue.
    pub fn destroy_queue(&self, queue: QueueId) -> Result<()> {
        let mut queues = self.queues.write().map_err(|_| Error::PoisonError)?;
        if let Some(timeline) = queues.remove(&queue) {
            let timeline = timeline.into_inner().map_err(|_| Error::PoisonError)?;
            if !timeline.open.is_empty() {
                debug!("{} destroyed with label region(s) `{}` still open", queue, timeline.open_path());
            }
        }
        Ok(())
    }
}
