//! Exposes the [`SyncValidator`], which receives every recording and submission event and produces hazard reports.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use anyhow::Result;
use ash::vk;
use multimap::MultiMap;

use crate::access::catalog::StageAccessCatalog;
use crate::command_buffer::buffer_log::CommandBufferLog;
use crate::command_buffer::{AccessRecordRef, CommandBufferId, CommandBufferLevel};
use crate::core::app_info::ValidatorSettings;
use crate::label::LabelPath;
use crate::report::attributor::{Attribution, HazardAttributor, LiveRecord, RecordSource};
use crate::report::format::ReportFormatter;
use crate::report::sink::ReportSink;
use crate::resource::{ResourceId, ResourceKind, ResourceTable};
use crate::sync::hazard::HazardResult;
use crate::sync::timeline::SubmissionTimeline;
use crate::sync::{BatchTag, QueueId};
use crate::util::string::wrap_c_str;
use crate::Error;

/// The sync validator tracks debug labels and resource accesses as commands are recorded and submitted,
/// so that hazards found by the detection engine can be reported with the label regions and object names
/// the application knows them by.
///
/// All methods take `&self`. Different command buffers may be recorded from different threads at the same time.
///
/// # Example
/// ```
/// use syncval_attrib::*;
///
/// let validator = SyncValidator::new(ValidatorBuilder::new().build());
/// let buffer = validator.register_resource(ResourceKind::Buffer, 0x10)?;
/// validator.set_debug_name(buffer, "vertices")?;
///
/// let cmd = CommandBufferId(1);
/// validator.on_begin(cmd, CommandBufferLevel::Primary)?;
/// validator.on_label_push(cmd, "Upload")?;
/// let write = validator.on_resource_access(cmd, buffer, vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_WRITE)?;
/// validator.on_label_pop(cmd)?;
/// let read = validator.on_resource_access(cmd, buffer, vk::PipelineStageFlags2::VERTEX_ATTRIBUTE_INPUT, vk::AccessFlags2::VERTEX_ATTRIBUTE_READ)?;
///
/// let message = validator.format_hazard_message(&HazardResult {
///     kind: HazardKind::ReadAfterWrite,
///     current: read,
///     prior: write,
/// })?;
/// assert!(message.contains("Prior access in Upload"));
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Derivative)]
#[derivative(Debug)]
pub struct SyncValidator {
    name: String,
    catalog: StageAccessCatalog,
    resources: ResourceTable,
    command_buffers: RwLock<HashMap<CommandBufferId, Mutex<CommandBufferLog>>>,
    /// Primaries every secondary was executed from since it was last reset.
    executions: Mutex<MultiMap<CommandBufferId, CommandBufferId>>,
    timeline: SubmissionTimeline,
    #[derivative(Debug = "ignore")]
    sink: Box<dyn ReportSink + Send + Sync>,
}

assert_impl_all!(SyncValidator: Send, Sync);

impl SyncValidator {
    /// Create a new validator.
    pub fn new(settings: ValidatorSettings) -> Self {
        info!("Created sync validator `{}` with capabilities {:?}", settings.name, settings.capabilities);
        Self {
            name: settings.name,
            catalog: StageAccessCatalog::new(settings.capabilities),
            resources: ResourceTable::new(),
            command_buffers: RwLock::new(HashMap::new()),
            executions: Mutex::new(MultiMap::new()),
            timeline: SubmissionTimeline::new(),
            sink: settings.sink,
        }
    }

    /// Name of this validator.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stage/access catalog for the enabled capabilities.
    pub fn catalog(&self) -> &StageAccessCatalog {
        &self.catalog
    }

    /// All known resources.
    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    /// Submission history of all queues.
    pub fn timeline(&self) -> &SubmissionTimeline {
        &self.timeline
    }

    /// Register a newly created resource.
    pub fn register_resource(&self, kind: ResourceKind, handle: u64) -> Result<ResourceId> {
        self.resources.register(kind, handle)
    }

    /// Set the debug name of a resource.
    pub fn set_debug_name(&self, resource: ResourceId, name: impl Into<String>) -> Result<()> {
        self.resources.set_debug_name(resource, name)
    }

    /// Handle `vkSetDebugUtilsObjectNameEXT`.
    /// # Safety
    /// `info.p_object_name` must be null or point to a valid null-terminated string.
    pub unsafe fn set_object_name(&self, info: &vk::DebugUtilsObjectNameInfoEXT) -> Result<ResourceId> {
        self.resources.set_object_name(info)
    }

    /// Forget a destroyed resource. Reports against it will no longer carry a name.
    pub fn destroy_resource(&self, resource: ResourceId) -> Result<()> {
        self.resources.destroy(resource)?;
        Ok(())
    }

    /// Run `f` on the log of a command buffer. Command buffers that were never begun are created as primaries.
    fn with_log<R>(&self, cmd: CommandBufferId, f: impl FnOnce(&mut CommandBufferLog) -> R) -> Result<R> {
        {
            let command_buffers = self.command_buffers.read().map_err(|_| Error::PoisonError)?;
            if let Some(log) = command_buffers.get(&cmd) {
                let mut log = log.lock().map_err(|_| Error::PoisonError)?;
                return Ok(f(&mut log));
            }
        }
        let mut command_buffers = self.command_buffers.write().map_err(|_| Error::PoisonError)?;
        let log = command_buffers
            .entry(cmd)
            .or_insert_with(|| Mutex::new(CommandBufferLog::new(cmd, CommandBufferLevel::Primary)));
        let log = log.get_mut().map_err(|_| Error::PoisonError)?;
        Ok(f(log))
    }

    /// Run `f` on the log of a command buffer that must already be known.
    fn with_known_log<R>(&self, cmd: CommandBufferId, f: impl FnOnce(&mut CommandBufferLog) -> R) -> Result<R> {
        let command_buffers = self.command_buffers.read().map_err(|_| Error::PoisonError)?;
        let log = command_buffers.get(&cmd).ok_or(Error::UnknownCommandBuffer(cmd.0))?;
        let mut log = log.lock().map_err(|_| Error::PoisonError)?;
        Ok(f(&mut log))
    }

    /// Forget which primaries executed `cmd`, warning about primaries that are invalidated by this.
    fn forget_executions(&self, cmd: CommandBufferId) -> Result<()> {
        let mut executions = self.executions.lock().map_err(|_| Error::PoisonError)?;
        if let Some(primaries) = executions.remove(&cmd) {
            warn!(
                "{} was reset while it is recorded into {} primary command buffer(s): {:?}. These are now invalid.",
                cmd,
                primaries.len(),
                primaries
            );
        }
        executions.retain(|_, primary| *primary != cmd);
        Ok(())
    }

    /// Handle `vkBeginCommandBuffer`. A command buffer that was recorded before is implicitly reset.
    pub fn on_begin(&self, cmd: CommandBufferId, level: CommandBufferLevel) -> Result<()> {
        let known = self.with_known_log(cmd, |log| log.reset_with_level(level)).is_ok();
        if known {
            self.forget_executions(cmd)?;
            return Ok(());
        }
        let mut command_buffers = self.command_buffers.write().map_err(|_| Error::PoisonError)?;
        command_buffers
            .entry(cmd)
            .or_insert_with(|| Mutex::new(CommandBufferLog::new(cmd, level)));
        Ok(())
    }

    /// Handle `vkResetCommandBuffer`. References captured before the reset become stale.
    pub fn on_reset(&self, cmd: CommandBufferId) -> Result<()> {
        match self.with_known_log(cmd, |log| log.reset()) {
            Ok(()) => self.forget_executions(cmd),
            Err(_) => {
                debug!("Reset of {}, which was never recorded", cmd);
                Ok(())
            }
        }
    }

    /// Handle `vkFreeCommandBuffers`. The command buffer stays known, so references into it degrade
    /// instead of becoming unknown.
    pub fn on_free(&self, cmd: CommandBufferId) -> Result<()> {
        self.on_reset(cmd)
    }

    /// Handle `vkCmdBeginDebugUtilsLabelEXT`.
    pub fn on_label_push(&self, cmd: CommandBufferId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.with_log(cmd, |log| log.record_label_push(name))
    }

    /// Handle `vkCmdBeginDebugUtilsLabelEXT` with the raw label structure.
    /// # Safety
    /// `label.p_label_name` must be null or point to a valid null-terminated string.
    pub unsafe fn on_begin_debug_utils_label(&self, cmd: CommandBufferId, label: &vk::DebugUtilsLabelEXT) -> Result<()> {
        self.on_label_push(cmd, wrap_c_str(label.p_label_name))
    }

    /// Handle `vkCmdEndDebugUtilsLabelEXT`.
    pub fn on_label_pop(&self, cmd: CommandBufferId) -> Result<()> {
        self.with_log(cmd, |log| log.record_label_pop())
    }

    /// Record that a command in `cmd` accesses `resource`. Commands touching several resources record one
    /// access per resource. The returned reference identifies this access to the hazard detector.
    pub fn on_resource_access(
        &self,
        cmd: CommandBufferId,
        resource: ResourceId,
        stage_mask: vk::PipelineStageFlags2,
        access_mask: vk::AccessFlags2,
    ) -> Result<AccessRecordRef> {
        self.with_log(cmd, |log| log.record_access(resource, stage_mask, access_mask))
    }

    /// Handle `vkCmdExecuteCommands`: splice the accesses and labels of `secondary` into `primary` at `at_index`.
    /// Returns references to the spliced accesses, which live in the primary.
    pub fn on_execute_secondary(&self, primary: CommandBufferId, secondary: CommandBufferId, at_index: u32) -> Result<Vec<AccessRecordRef>> {
        if primary == secondary {
            return Err(Error::InvalidSplice(format!("{} cannot execute itself", primary)).into());
        }
        let secondary_log = self.with_known_log(secondary, |log| log.clone())?;
        let refs = self.with_log(primary, |log| -> Result<Vec<AccessRecordRef>> {
            if at_index < log.len() {
                warn!(
                    "Executing {} at #{} of {} renumbers {} later access(es)",
                    secondary,
                    at_index,
                    primary,
                    log.len() - at_index
                );
            }
            let range = log.splice_secondary(at_index, &secondary_log)?;
            Ok(range
                .filter_map(|sequence| log.record(sequence).map(|record| record.handle()))
                .collect())
        })??;
        self.executions
            .lock()
            .map_err(|_| Error::PoisonError)?
            .insert(secondary, primary);
        Ok(refs)
    }

    /// Ingest a command buffer submitted to `queue` as part of batch `batch_index` of the current submit call.
    pub fn on_submit(&self, queue: QueueId, batch_index: u32, cmd: CommandBufferId) -> Result<BatchTag> {
        let command_buffers = self.command_buffers.read().map_err(|_| Error::PoisonError)?;
        let log = command_buffers.get(&cmd).ok_or(Error::UnknownCommandBuffer(cmd.0))?;
        let log = log.lock().map_err(|_| Error::PoisonError)?;
        if log.level() != CommandBufferLevel::Primary {
            warn!("{} submitted to {} is not a primary command buffer", cmd, queue);
        }
        self.timeline.ingest(queue, batch_index, &log)
    }

    /// Handle `vkQueueSubmit`: every slice in `batches` is one `VkSubmitInfo` with its command buffers in order.
    /// Returns the submission index.
    /// # Errors
    /// * Fails with [`Error::UnknownCommandBuffer`] if any command buffer in any batch was never begun. Nothing
    ///   is ingested in that case.
    pub fn on_queue_submit(&self, queue: QueueId, batches: &[&[CommandBufferId]]) -> Result<u64> {
        {
            let command_buffers = self.command_buffers.read().map_err(|_| Error::PoisonError)?;
            let unknown = batches
                .iter()
                .flat_map(|batch| batch.iter())
                .find(|cmd| !command_buffers.contains_key(*cmd));
            if let Some(cmd) = unknown {
                return Err(Error::UnknownCommandBuffer(cmd.0).into());
            }
        }
        let submission = self.timeline.begin_submission(queue)?;
        for (batch_index, batch) in batches.iter().enumerate() {
            for cmd in batch.iter() {
                self.on_submit(queue, batch_index as u32, *cmd)?;
            }
        }
        Ok(submission)
    }

    /// Handle destruction of a queue, dropping its history and open regions.
    pub fn on_queue_destroyed(&self, queue: QueueId) -> Result<()> {
        self.timeline.destroy_queue(queue)
    }

    /// Label regions left open on a queue by everything submitted so far.
    pub fn open_regions(&self, queue: QueueId) -> Result<LabelPath> {
        self.timeline.open_path(queue)
    }

    /// Resolve both sides of a hazard.
    pub fn attribute(&self, hazard: &HazardResult) -> Result<Attribution> {
        HazardAttributor::new(&self.catalog, &self.resources, &self.timeline, self).attribute(hazard)
    }

    /// Format the message for a hazard.
    pub fn format_hazard_message(&self, hazard: &HazardResult) -> Result<String> {
        let attribution = self.attribute(hazard)?;
        Ok(ReportFormatter::format(attribution.kind, &attribution.prior, &attribution.current))
    }

    /// Format the message for a hazard and send it to the configured sink.
    pub fn report_hazard(&self, hazard: &HazardResult) -> Result<String> {
        let message = self.format_hazard_message(hazard)?;
        self.sink.report(hazard.kind, &message);
        Ok(message)
    }
}

impl RecordSource for SyncValidator {
    fn live_record(&self, handle: &AccessRecordRef) -> Result<LiveRecord> {
        let command_buffers = self.command_buffers.read().map_err(|_| Error::PoisonError)?;
        let Some(log) = command_buffers.get(&handle.command_buffer) else {
            return Ok(LiveRecord::Unknown);
        };
        let log = log.lock().map_err(|_| Error::PoisonError)?;
        if handle.generation < log.generation() {
            return Ok(LiveRecord::Stale);
        }
        Ok(match log.lookup(handle) {
            Some(record) => LiveRecord::Current(record.clone()),
            None => LiveRecord::Unknown,
        })
    }
}
