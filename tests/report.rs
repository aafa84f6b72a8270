use std::ffi::CString;

use anyhow::Result;
use ash::vk;

use syncval_attrib::{
    CommandBufferId, CommandBufferLevel, Error, HazardKind, HazardResult, Location, QueueId, ReportFormatter, ResourceId, ResourceKind,
};

mod framework;

#[test]
pub fn message_names_labels_and_objects() -> Result<()> {
    let validator = framework::make_validator()?;
    let queue = QueueId(1);
    let dst = validator.register_resource(ResourceKind::Buffer, 0x200)?;
    validator.set_debug_name(dst, "dst")?;

    let cmd = CommandBufferId(1);
    validator.on_begin(cmd, CommandBufferLevel::Primary)?;
    validator.on_label_push(cmd, "A")?;
    validator.on_label_push(cmd, "B")?;
    let prior = validator.on_resource_access(cmd, dst, vk::PipelineStageFlags2::COMPUTE_SHADER, vk::AccessFlags2::SHADER_STORAGE_READ)?;
    validator.on_label_pop(cmd)?;
    validator.on_label_pop(cmd)?;
    let current = validator.on_resource_access(cmd, dst, vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_WRITE)?;
    validator.on_queue_submit(queue, &[&[cmd]])?;

    let message = validator.format_hazard_message(&HazardResult {
        kind: HazardKind::WriteAfterRead,
        current,
        prior,
    })?;
    assert_eq!(
        message,
        "WRITE_AFTER_READ hazard detected. \
         Current access in no label region: VK_ACCESS_2_TRANSFER_WRITE_BIT accesses at VK_PIPELINE_STAGE_2_COPY_BIT (dst). \
         Prior access in A::B: VK_ACCESS_2_SHADER_STORAGE_READ_BIT accesses at VK_PIPELINE_STAGE_2_COMPUTE_SHADER_BIT (dst)."
    );
    Ok(())
}

#[test]
pub fn only_hazard_resources_are_named() -> Result<()> {
    let validator = framework::make_validator()?;
    let buffer_a = validator.register_resource(ResourceKind::Buffer, 0xa)?;
    let buffer_b = validator.register_resource(ResourceKind::Buffer, 0xb)?;
    validator.set_debug_name(buffer_a, "buffer_a")?;
    validator.set_debug_name(buffer_b, "buffer_b")?;

    let cmd = CommandBufferId(1);
    validator.on_begin(cmd, CommandBufferLevel::Primary)?;
    validator.on_label_push(cmd, "Dispatch")?;
    let read = validator.on_resource_access(cmd, buffer_a, vk::PipelineStageFlags2::COMPUTE_SHADER, vk::AccessFlags2::SHADER_STORAGE_READ)?;
    validator.on_resource_access(cmd, buffer_b, vk::PipelineStageFlags2::COMPUTE_SHADER, vk::AccessFlags2::SHADER_STORAGE_WRITE)?;
    validator.on_label_pop(cmd)?;
    let write = validator.on_resource_access(cmd, buffer_a, vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_WRITE)?;

    let message = validator.format_hazard_message(&HazardResult {
        kind: HazardKind::WriteAfterRead,
        current: write,
        prior: read,
    })?;
    assert!(message.contains("Prior access in Dispatch"), "{message}");
    assert!(message.contains("(buffer_a)"), "{message}");
    assert!(!message.contains("buffer_b"), "Resources not involved in the hazard should not be named: {message}");
    Ok(())
}

#[test]
pub fn names_are_looked_up_at_report_time() -> Result<()> {
    let validator = framework::make_validator()?;
    let image = validator.register_resource(ResourceKind::Image, 0x30)?;
    let cmd = CommandBufferId(1);
    validator.on_begin(cmd, CommandBufferLevel::Primary)?;
    let access = validator.on_resource_access(cmd, image, vk::PipelineStageFlags2::CLEAR, vk::AccessFlags2::TRANSFER_WRITE)?;

    assert_eq!(framework::locate(&validator, access)?.object_name, "");
    let hazard = HazardResult {
        kind: HazardKind::WriteAfterWrite,
        current: access,
        prior: access,
    };
    assert!(!validator.format_hazard_message(&hazard)?.contains('('), "Unnamed objects should not print a name.");

    validator.set_debug_name(image, "late name")?;
    assert!(validator.format_hazard_message(&hazard)?.contains("(late name)"));

    validator.destroy_resource(image)?;
    assert_eq!(framework::locate(&validator, access)?.object_name, "");
    Ok(())
}

#[test]
pub fn reset_command_buffer_degrades_report() -> Result<()> {
    let validator = framework::make_validator()?;
    let buffer = validator.register_resource(ResourceKind::Buffer, 0x40)?;
    validator.set_debug_name(buffer, "staging")?;
    let cmd = CommandBufferId(1);

    validator.on_begin(cmd, CommandBufferLevel::Primary)?;
    validator.on_label_push(cmd, "Upload")?;
    let stale = validator.on_resource_access(cmd, buffer, vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_WRITE)?;
    validator.on_reset(cmd)?;

    let location = framework::locate(&validator, stale)?;
    assert_eq!(
        location,
        Location {
            resource: buffer,
            label: String::from("no label region"),
            object_name: String::from("staging"),
            access: None,
            degraded: true,
        },
        "A reset command buffer should still name the object, but not its old labels."
    );

    let message = validator.format_hazard_message(&HazardResult {
        kind: HazardKind::ReadAfterWrite,
        current: stale,
        prior: stale,
    })?;
    assert!(message.ends_with("Prior access in no label region (staging)."), "{message}");
    Ok(())
}

#[test]
pub fn submitted_then_reset_keeps_labels() -> Result<()> {
    let validator = framework::make_validator()?;
    let buffer = validator.register_resource(ResourceKind::Buffer, 0x40)?;
    let cmd = CommandBufferId(1);

    validator.on_begin(cmd, CommandBufferLevel::Primary)?;
    validator.on_label_push(cmd, "Upload")?;
    let access = validator.on_resource_access(cmd, buffer, vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_WRITE)?;
    validator.on_label_pop(cmd)?;
    validator.on_queue_submit(QueueId(1), &[&[cmd]])?;

    validator.on_begin(cmd, CommandBufferLevel::Primary)?;
    let current = validator.on_resource_access(cmd, buffer, vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_READ)?;
    let attribution = validator.attribute(&HazardResult {
        kind: HazardKind::ReadAfterWrite,
        current,
        prior: access,
    })?;
    assert!(
        !attribution.prior.degraded,
        "The submitted copy of last frame's access should outlive the re-recording."
    );
    assert_eq!(attribution.prior.label, "Upload");
    assert_eq!(
        attribution.prior.access.as_deref(),
        Some("VK_ACCESS_2_TRANSFER_WRITE_BIT accesses at VK_PIPELINE_STAGE_2_COPY_BIT")
    );
    assert_eq!(attribution.current.label, "no label region");

    validator.on_free(cmd)?;
    let location = framework::locate(&validator, access)?;
    assert!(!location.degraded);
    assert_eq!(location.label, "Upload");
    Ok(())
}

#[test]
pub fn unknown_reference_is_an_error() -> Result<()> {
    let validator = framework::make_validator()?;
    let cmd = CommandBufferId(1);
    validator.on_begin(cmd, CommandBufferLevel::Primary)?;
    let access = validator.on_resource_access(cmd, ResourceId(1), vk::PipelineStageFlags2::HOST, vk::AccessFlags2::HOST_WRITE)?;

    let mut unknown = access;
    unknown.command_buffer = CommandBufferId(99);
    let err = framework::locate(&validator, unknown).unwrap_err();
    assert!(
        matches!(err.downcast_ref::<Error>(), Some(Error::UnknownAccessRecord { command_buffer: 99, .. })),
        "{err}"
    );

    let mut past_end = access;
    past_end.sequence = 10;
    let err = framework::locate(&validator, past_end).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::UnknownAccessRecord { sequence: 10, .. })));
    Ok(())
}

#[test]
pub fn reports_reach_the_sink() -> Result<()> {
    let (validator, sink) = framework::make_validator_with_sink()?;
    let buffer = validator.register_resource(ResourceKind::Buffer, 0x50)?;
    let cmd = CommandBufferId(1);
    validator.on_begin(cmd, CommandBufferLevel::Primary)?;
    let write = validator.on_resource_access(cmd, buffer, vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_WRITE)?;
    let read = validator.on_resource_access(cmd, buffer, vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_READ)?;

    let message = validator.report_hazard(&HazardResult {
        kind: HazardKind::ReadAfterWrite,
        current: read,
        prior: write,
    })?;

    let reports = sink.reports.lock().unwrap();
    assert_eq!(reports.len(), 1, "Every reported hazard should reach the sink once.");
    assert_eq!(reports[0], (HazardKind::ReadAfterWrite, message));
    assert!(reports[0].1.starts_with("READ_AFTER_WRITE hazard detected."));
    Ok(())
}

#[test]
pub fn hazard_severity() -> Result<()> {
    assert!(HazardKind::WriteAfterRead.prior_is_read());
    assert!(HazardKind::WriteRacingRead.prior_is_read());
    assert!(HazardKind::PresentAfterRead.prior_is_read());
    assert!(!HazardKind::ReadAfterWrite.prior_is_read());
    assert!(!HazardKind::WriteAfterPresent.prior_is_read());
    assert_eq!(HazardKind::WriteRacingWrite.to_string(), "WRITE_RACING_WRITE");
    Ok(())
}

#[test]
pub fn formatter_leaves_out_missing_parts() -> Result<()> {
    let current = Location {
        resource: ResourceId(1),
        label: String::from("Pass"),
        object_name: String::from("target"),
        access: Some(String::from("all accesses at VK_PIPELINE_STAGE_2_COMPUTE_SHADER_BIT")),
        degraded: false,
    };
    let prior = Location {
        resource: ResourceId(1),
        label: String::from("no label region"),
        object_name: String::new(),
        access: None,
        degraded: true,
    };
    assert_eq!(
        ReportFormatter::format(HazardKind::WriteAfterWrite, &prior, &current),
        "WRITE_AFTER_WRITE hazard detected. Current access in Pass: all accesses at VK_PIPELINE_STAGE_2_COMPUTE_SHADER_BIT (target). Prior access in no label region."
    );
    Ok(())
}

#[test]
pub fn raw_object_names() -> Result<()> {
    let validator = framework::make_validator()?;
    let name = CString::new("vertex buffer")?;
    let info = vk::DebugUtilsObjectNameInfoEXT::builder()
        .object_type(vk::ObjectType::BUFFER)
        .object_handle(0x60)
        .object_name(&name)
        .build();
    let id = unsafe { validator.set_object_name(&info)? };

    assert_eq!(id, ResourceId(0x60));
    let identity = validator.resources().identity(id)?.unwrap();
    assert_eq!(identity.kind, ResourceKind::Buffer, "The object type should be taken from the name info.");
    assert_eq!(identity.debug_name.as_deref(), Some("vertex buffer"));
    Ok(())
}
