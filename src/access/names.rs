//! Vulkan enumerant names for synchronization2 stage and access bits.

use ash::vk;

const STAGE_NAMES: &[(vk::PipelineStageFlags2, &str)] = &[
    (vk::PipelineStageFlags2::TOP_OF_PIPE, "VK_PIPELINE_STAGE_2_TOP_OF_PIPE_BIT"),
    (vk::PipelineStageFlags2::DRAW_INDIRECT, "VK_PIPELINE_STAGE_2_DRAW_INDIRECT_BIT"),
    (vk::PipelineStageFlags2::VERTEX_INPUT, "VK_PIPELINE_STAGE_2_VERTEX_INPUT_BIT"),
    (vk::PipelineStageFlags2::VERTEX_SHADER, "VK_PIPELINE_STAGE_2_VERTEX_SHADER_BIT"),
    (
        vk::PipelineStageFlags2::TESSELLATION_CONTROL_SHADER,
        "VK_PIPELINE_STAGE_2_TESSELLATION_CONTROL_SHADER_BIT",
    ),
    (
        vk::PipelineStageFlags2::TESSELLATION_EVALUATION_SHADER,
        "VK_PIPELINE_STAGE_2_TESSELLATION_EVALUATION_SHADER_BIT",
    ),
    (vk::PipelineStageFlags2::GEOMETRY_SHADER, "VK_PIPELINE_STAGE_2_GEOMETRY_SHADER_BIT"),
    (vk::PipelineStageFlags2::FRAGMENT_SHADER, "VK_PIPELINE_STAGE_2_FRAGMENT_SHADER_BIT"),
    (vk::PipelineStageFlags2::EARLY_FRAGMENT_TESTS, "VK_PIPELINE_STAGE_2_EARLY_FRAGMENT_TESTS_BIT"),
    (vk::PipelineStageFlags2::LATE_FRAGMENT_TESTS, "VK_PIPELINE_STAGE_2_LATE_FRAGMENT_TESTS_BIT"),
    (
        vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT,
        "VK_PIPELINE_STAGE_2_COLOR_ATTACHMENT_OUTPUT_BIT",
    ),
    (vk::PipelineStageFlags2::COMPUTE_SHADER, "VK_PIPELINE_STAGE_2_COMPUTE_SHADER_BIT"),
    (vk::PipelineStageFlags2::ALL_TRANSFER, "VK_PIPELINE_STAGE_2_ALL_TRANSFER_BIT"),
    (vk::PipelineStageFlags2::BOTTOM_OF_PIPE, "VK_PIPELINE_STAGE_2_BOTTOM_OF_PIPE_BIT"),
    (vk::PipelineStageFlags2::HOST, "VK_PIPELINE_STAGE_2_HOST_BIT"),
    (vk::PipelineStageFlags2::ALL_GRAPHICS, "VK_PIPELINE_STAGE_2_ALL_GRAPHICS_BIT"),
    (vk::PipelineStageFlags2::ALL_COMMANDS, "VK_PIPELINE_STAGE_2_ALL_COMMANDS_BIT"),
    (vk::PipelineStageFlags2::COPY, "VK_PIPELINE_STAGE_2_COPY_BIT"),
    (vk::PipelineStageFlags2::RESOLVE, "VK_PIPELINE_STAGE_2_RESOLVE_BIT"),
    (vk::PipelineStageFlags2::BLIT, "VK_PIPELINE_STAGE_2_BLIT_BIT"),
    (vk::PipelineStageFlags2::CLEAR, "VK_PIPELINE_STAGE_2_CLEAR_BIT"),
    (vk::PipelineStageFlags2::INDEX_INPUT, "VK_PIPELINE_STAGE_2_INDEX_INPUT_BIT"),
    (
        vk::PipelineStageFlags2::VERTEX_ATTRIBUTE_INPUT,
        "VK_PIPELINE_STAGE_2_VERTEX_ATTRIBUTE_INPUT_BIT",
    ),
    (
        vk::PipelineStageFlags2::PRE_RASTERIZATION_SHADERS,
        "VK_PIPELINE_STAGE_2_PRE_RASTERIZATION_SHADERS_BIT",
    ),
    (
        vk::PipelineStageFlags2::ACCELERATION_STRUCTURE_BUILD_KHR,
        "VK_PIPELINE_STAGE_2_ACCELERATION_STRUCTURE_BUILD_BIT_KHR",
    ),
    (
        vk::PipelineStageFlags2::RAY_TRACING_SHADER_KHR,
        "VK_PIPELINE_STAGE_2_RAY_TRACING_SHADER_BIT_KHR",
    ),
    (vk::PipelineStageFlags2::TASK_SHADER_EXT, "VK_PIPELINE_STAGE_2_TASK_SHADER_BIT_EXT"),
    (vk::PipelineStageFlags2::MESH_SHADER_EXT, "VK_PIPELINE_STAGE_2_MESH_SHADER_BIT_EXT"),
    (
        vk::PipelineStageFlags2::ACCELERATION_STRUCTURE_COPY_KHR,
        "VK_PIPELINE_STAGE_2_ACCELERATION_STRUCTURE_COPY_BIT_KHR",
    ),
    (vk::PipelineStageFlags2::MICROMAP_BUILD_EXT, "VK_PIPELINE_STAGE_2_MICROMAP_BUILD_BIT_EXT"),
];

const ACCESS_NAMES: &[(vk::AccessFlags2, &str)] = &[
    (vk::AccessFlags2::INDIRECT_COMMAND_READ, "VK_ACCESS_2_INDIRECT_COMMAND_READ_BIT"),
    (vk::AccessFlags2::INDEX_READ, "VK_ACCESS_2_INDEX_READ_BIT"),
    (vk::AccessFlags2::VERTEX_ATTRIBUTE_READ, "VK_ACCESS_2_VERTEX_ATTRIBUTE_READ_BIT"),
    (vk::AccessFlags2::UNIFORM_READ, "VK_ACCESS_2_UNIFORM_READ_BIT"),
    (vk::AccessFlags2::INPUT_ATTACHMENT_READ, "VK_ACCESS_2_INPUT_ATTACHMENT_READ_BIT"),
    (vk::AccessFlags2::SHADER_READ, "VK_ACCESS_2_SHADER_READ_BIT"),
    (vk::AccessFlags2::SHADER_WRITE, "VK_ACCESS_2_SHADER_WRITE_BIT"),
    (vk::AccessFlags2::COLOR_ATTACHMENT_READ, "VK_ACCESS_2_COLOR_ATTACHMENT_READ_BIT"),
    (vk::AccessFlags2::COLOR_ATTACHMENT_WRITE, "VK_ACCESS_2_COLOR_ATTACHMENT_WRITE_BIT"),
    (
        vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_READ,
        "VK_ACCESS_2_DEPTH_STENCIL_ATTACHMENT_READ_BIT",
    ),
    (
        vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_WRITE,
        "VK_ACCESS_2_DEPTH_STENCIL_ATTACHMENT_WRITE_BIT",
    ),
    (vk::AccessFlags2::TRANSFER_READ, "VK_ACCESS_2_TRANSFER_READ_BIT"),
    (vk::AccessFlags2::TRANSFER_WRITE, "VK_ACCESS_2_TRANSFER_WRITE_BIT"),
    (vk::AccessFlags2::HOST_READ, "VK_ACCESS_2_HOST_READ_BIT"),
    (vk::AccessFlags2::HOST_WRITE, "VK_ACCESS_2_HOST_WRITE_BIT"),
    (vk::AccessFlags2::MEMORY_READ, "VK_ACCESS_2_MEMORY_READ_BIT"),
    (vk::AccessFlags2::MEMORY_WRITE, "VK_ACCESS_2_MEMORY_WRITE_BIT"),
    (
        vk::AccessFlags2::ACCELERATION_STRUCTURE_READ_KHR,
        "VK_ACCESS_2_ACCELERATION_STRUCTURE_READ_BIT_KHR",
    ),
    (
        vk::AccessFlags2::ACCELERATION_STRUCTURE_WRITE_KHR,
        "VK_ACCESS_2_ACCELERATION_STRUCTURE_WRITE_BIT_KHR",
    ),
    (vk::AccessFlags2::SHADER_SAMPLED_READ, "VK_ACCESS_2_SHADER_SAMPLED_READ_BIT"),
    (vk::AccessFlags2::SHADER_STORAGE_READ, "VK_ACCESS_2_SHADER_STORAGE_READ_BIT"),
    (vk::AccessFlags2::SHADER_STORAGE_WRITE, "VK_ACCESS_2_SHADER_STORAGE_WRITE_BIT"),
    (
        vk::AccessFlags2::SHADER_BINDING_TABLE_READ_KHR,
        "VK_ACCESS_2_SHADER_BINDING_TABLE_READ_BIT_KHR",
    ),
    (vk::AccessFlags2::MICROMAP_READ_EXT, "VK_ACCESS_2_MICROMAP_READ_BIT_EXT"),
    (vk::AccessFlags2::MICROMAP_WRITE_EXT, "VK_ACCESS_2_MICROMAP_WRITE_BIT_EXT"),
];

/// Iterate over every set bit of a 64 bit mask, lowest bit first.
pub(crate) fn bits(mask: u64) -> impl Iterator<Item = u64> {
    (0..64u32).map(|shift| 1u64 << shift).filter(move |bit| mask & bit != 0)
}

/// Name of a single pipeline stage bit. Bits without a known name are printed in hex.
pub fn stage_name(stage: vk::PipelineStageFlags2) -> String {
    STAGE_NAMES
        .iter()
        .find(|(flag, _)| *flag == stage)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("{:#x}", stage.as_raw()))
}

/// Name of a single access bit. Bits without a known name are printed in hex.
pub fn access_name(access: vk::AccessFlags2) -> String {
    ACCESS_NAMES
        .iter()
        .find(|(flag, _)| *flag == access)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("{:#x}", access.as_raw()))
}

/// Names of every bit in an access mask joined by `|`, lowest bit first.
pub fn access_mask_names(mask: vk::AccessFlags2) -> String {
    bits(mask.as_raw())
        .map(|bit| access_name(vk::AccessFlags2::from_raw(bit)))
        .collect::<Vec<_>>()
        .join("|")
}
