use anyhow::Result;
use ash::vk;

use syncval_attrib::command_buffer::LabelOp;
use syncval_attrib::{CommandBufferId, CommandBufferLevel, CommandBufferLog, Error, LabelPath, Position, ResourceId, ResourceKind};

mod framework;

#[test]
pub fn accesses_snapshot_open_regions() -> Result<()> {
    let validator = framework::make_validator()?;
    let buffer = validator.register_resource(ResourceKind::Buffer, 0x100)?;
    let cmd = CommandBufferId(1);
    validator.on_begin(cmd, CommandBufferLevel::Primary)?;

    let outside = validator.on_resource_access(cmd, buffer, vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_WRITE)?;
    validator.on_label_push(cmd, "A")?;
    validator.on_label_push(cmd, "B")?;
    let inner = validator.on_resource_access(cmd, buffer, vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_READ)?;
    validator.on_label_pop(cmd)?;
    let outer = validator.on_resource_access(cmd, buffer, vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_READ)?;
    validator.on_label_pop(cmd)?;

    assert_eq!(framework::label_of(&validator, outside)?, "no label region");
    assert_eq!(framework::label_of(&validator, inner)?, "A::B");
    assert_eq!(framework::label_of(&validator, outer)?, "A");
    assert_eq!(
        (outside.sequence, inner.sequence, outer.sequence),
        (0, 1, 2),
        "Accesses should be numbered in recording order."
    );
    Ok(())
}

#[test]
pub fn secondary_in_two_primaries() -> Result<()> {
    let validator = framework::make_validator()?;
    let texture = validator.register_resource(ResourceKind::Image, 0x200)?;
    validator.set_debug_name(texture, "albedo")?;

    let secondary = CommandBufferId(3);
    validator.on_begin(secondary, CommandBufferLevel::Secondary)?;
    validator.on_label_push(secondary, "Draw")?;
    let original = validator.on_resource_access(
        secondary,
        texture,
        vk::PipelineStageFlags2::FRAGMENT_SHADER,
        vk::AccessFlags2::SHADER_SAMPLED_READ,
    )?;
    validator.on_label_pop(secondary)?;

    let mut spliced = Vec::new();
    for (primary, pass) in [(CommandBufferId(1), "PassA"), (CommandBufferId(2), "PassB")] {
        validator.on_begin(primary, CommandBufferLevel::Primary)?;
        validator.on_label_push(primary, pass)?;
        let refs = validator.on_execute_secondary(primary, secondary, 0)?;
        validator.on_label_pop(primary)?;
        assert_eq!(refs.len(), 1, "The secondary recorded a single access.");
        spliced.push(refs[0]);
    }

    assert_eq!(framework::label_of(&validator, spliced[0])?, "PassA::Draw");
    assert_eq!(framework::label_of(&validator, spliced[1])?, "PassB::Draw");
    assert_eq!(
        framework::label_of(&validator, original)?,
        "Draw",
        "Splicing should leave the secondary itself untouched."
    );
    assert_eq!(framework::locate(&validator, spliced[1])?.object_name, "albedo");
    Ok(())
}

#[test]
pub fn spliced_copies_survive_secondary_reset() -> Result<()> {
    let validator = framework::make_validator()?;
    let buffer = validator.register_resource(ResourceKind::Buffer, 0x100)?;
    let primary = CommandBufferId(1);
    let secondary = CommandBufferId(2);
    validator.on_begin(secondary, CommandBufferLevel::Secondary)?;
    validator.on_label_push(secondary, "Draw")?;
    validator.on_resource_access(secondary, buffer, vk::PipelineStageFlags2::VERTEX_SHADER, vk::AccessFlags2::UNIFORM_READ)?;
    validator.on_label_pop(secondary)?;

    validator.on_begin(primary, CommandBufferLevel::Primary)?;
    validator.on_label_push(primary, "Pass")?;
    let refs = validator.on_execute_secondary(primary, secondary, 0)?;
    validator.on_label_pop(primary)?;

    validator.on_reset(secondary)?;
    assert_eq!(framework::label_of(&validator, refs[0])?, "Pass::Draw");
    Ok(())
}

#[test]
pub fn secondary_unmatched_pop_closes_primary_region() -> Result<()> {
    let validator = framework::make_validator()?;
    let buffer = validator.register_resource(ResourceKind::Buffer, 0x100)?;
    let primary = CommandBufferId(1);
    let secondary = CommandBufferId(2);

    validator.on_begin(secondary, CommandBufferLevel::Secondary)?;
    validator.on_label_pop(secondary)?;
    validator.on_resource_access(secondary, buffer, vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_READ)?;

    validator.on_begin(primary, CommandBufferLevel::Primary)?;
    validator.on_label_push(primary, "Outer")?;
    validator.on_label_push(primary, "Inner")?;
    let refs = validator.on_execute_secondary(primary, secondary, 0)?;
    let after = validator.on_resource_access(primary, buffer, vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_WRITE)?;

    assert_eq!(framework::label_of(&validator, refs[0])?, "Outer");
    assert_eq!(
        framework::label_of(&validator, after)?,
        "Outer",
        "The region closed by the secondary should stay closed in the primary."
    );
    Ok(())
}

#[test]
pub fn secondary_open_region_stays_open() -> Result<()> {
    let validator = framework::make_validator()?;
    let buffer = validator.register_resource(ResourceKind::Buffer, 0x100)?;
    let primary = CommandBufferId(1);
    let secondary = CommandBufferId(2);

    validator.on_begin(secondary, CommandBufferLevel::Secondary)?;
    validator.on_label_push(secondary, "Open")?;
    validator.on_resource_access(secondary, buffer, vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_READ)?;

    validator.on_begin(primary, CommandBufferLevel::Primary)?;
    validator.on_execute_secondary(primary, secondary, 0)?;
    let after = validator.on_resource_access(primary, buffer, vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_WRITE)?;
    assert_eq!(framework::label_of(&validator, after)?, "Open");
    Ok(())
}

#[test]
pub fn splice_in_the_middle() -> Result<()> {
    let mut secondary = CommandBufferLog::new(CommandBufferId(2), CommandBufferLevel::Secondary);
    secondary.record_label_push("Draw");
    let original = secondary.record_access(ResourceId(5), vk::PipelineStageFlags2::FRAGMENT_SHADER, vk::AccessFlags2::UNIFORM_READ);
    secondary.record_label_pop();

    let mut primary = CommandBufferLog::new(CommandBufferId(1), CommandBufferLevel::Primary);
    primary.record_label_push("Pass");
    primary.record_access(ResourceId(4), vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_WRITE);
    let moved = primary.record_access(ResourceId(6), vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_READ);
    primary.record_label_pop();

    let range = primary.splice_secondary(1, &secondary)?;
    assert_eq!(range, 1..2);
    assert_eq!(primary.len(), 3);

    let spliced = primary.record(1).unwrap();
    assert_eq!(spliced.resource, ResourceId(5));
    assert_eq!(spliced.label_path.to_string(), "Pass::Draw");
    assert_eq!(spliced.position.command_buffer, CommandBufferId(1), "Spliced accesses should live in the primary.");
    assert_eq!(
        spliced.origin,
        Some(Position {
            command_buffer: CommandBufferId(2),
            generation: 0,
            sequence: original.sequence,
        }),
        "Spliced accesses should remember where they were recorded."
    );

    let shifted = primary.record(2).unwrap();
    assert_eq!(shifted.resource, ResourceId(6));
    assert_eq!(shifted.position.sequence, 2);
    assert_eq!(shifted.label_path.to_string(), "Pass");
    assert_eq!(
        primary.lookup(&moved).map(|record| record.resource),
        Some(ResourceId(5)),
        "A reference captured before a middle splice now points at the spliced access."
    );

    let ats = primary.events().iter().map(|event| event.at).collect::<Vec<_>>();
    assert_eq!(ats, vec![0, 1, 2, 3], "Later label commands should move back by the secondary's length.");
    assert!(matches!(primary.events()[3].op, LabelOp::Pop));
    assert!(primary.current_path().is_empty());
    Ok(())
}

#[test]
pub fn invalid_splices_are_rejected() -> Result<()> {
    let validator = framework::make_validator()?;
    let primary = CommandBufferId(1);
    let other_primary = CommandBufferId(2);
    let secondary = CommandBufferId(3);
    validator.on_begin(primary, CommandBufferLevel::Primary)?;
    validator.on_begin(other_primary, CommandBufferLevel::Primary)?;
    validator.on_begin(secondary, CommandBufferLevel::Secondary)?;

    let err = validator.on_execute_secondary(primary, other_primary, 0).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidSplice(_))), "Primaries cannot be executed: {err}");

    let err = validator.on_execute_secondary(primary, secondary, 5).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidSplice(_))), "Out of range splice: {err}");

    let err = validator.on_execute_secondary(secondary, secondary, 0).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidSplice(_))));

    let err = validator.on_execute_secondary(primary, CommandBufferId(42), 0).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::UnknownCommandBuffer(42))));
    Ok(())
}

#[test]
pub fn resolve_against_carried_regions() -> Result<()> {
    let mut log = CommandBufferLog::new(CommandBufferId(1), CommandBufferLevel::Primary);
    log.record_label_pop();
    log.record_access(ResourceId(1), vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_READ);
    log.record_label_pop();
    log.record_label_push("X");
    log.record_access(ResourceId(1), vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_WRITE);

    let carried: LabelPath = ["A", "B"].into_iter().collect();
    let resolved = log.resolve(&carried);
    assert_eq!(
        resolved.paths.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec!["B", "X"],
        "The leading pop should close the oldest carried region."
    );
    assert_eq!(resolved.open.to_string(), "X");
    assert_eq!(resolved.closed_carried, 2);
    assert_eq!(resolved.opened_at, vec![1]);
    assert_eq!(resolved.dropped_pops, 0);

    let carried: LabelPath = ["A"].into_iter().collect();
    let resolved = log.resolve(&carried);
    assert_eq!(resolved.paths[0].to_string(), "no label region");
    assert_eq!(resolved.dropped_pops, 1, "The second pop has nothing left to close.");

    assert_eq!(log.label_path_at(1).to_string(), "X");
    Ok(())
}

#[test]
pub fn reset_bumps_generation() -> Result<()> {
    let mut log = CommandBufferLog::new(CommandBufferId(1), CommandBufferLevel::Primary);
    log.record_label_push("A");
    let old = log.record_access(ResourceId(1), vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_READ);
    log.reset();

    assert_eq!(log.generation(), 1);
    assert!(log.is_empty());
    assert!(log.events().is_empty());
    assert!(log.current_path().is_empty(), "Reset should close every open region.");

    let new = log.record_access(ResourceId(1), vk::PipelineStageFlags2::COPY, vk::AccessFlags2::TRANSFER_READ);
    assert_eq!(new.sequence, old.sequence);
    assert_eq!(new.generation, 1);
    assert!(log.lookup(&old).is_none(), "References into an older generation should not resolve.");
    assert!(log.lookup(&new).is_some());
    Ok(())
}
