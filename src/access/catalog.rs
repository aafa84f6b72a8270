//! Static table of the access types every pipeline stage can produce.
//!
//! The legal access set of a stage depends on the optional capabilities enabled on the device.
//! Enabling acceleration structure support for example lets every shader stage read acceleration
//! structures through ray queries, so those stages gain [`vk::AccessFlags2::ACCELERATION_STRUCTURE_READ_KHR`].
//! Stages that belong to an extension which is not enabled are not recognized by the catalog at all.

use ash::vk;

use crate::core::app_info::Capabilities;

/// Optional capability a stage or access type depends on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Always available.
    Core,
    /// `VK_KHR_acceleration_structure`
    AccelerationStructure,
    /// `VK_KHR_ray_tracing_pipeline`
    RayTracingPipeline,
    /// `VK_KHR_ray_tracing_maintenance1`
    RayTracingMaintenance1,
    /// `VK_EXT_mesh_shader`
    MeshShader,
    /// `VK_EXT_opacity_micromap`
    Micromap,
}

impl Capabilities {
    /// Whether the given requirement is satisfied by this capability set.
    pub fn satisfies(&self, requirement: Requirement) -> bool {
        match requirement {
            Requirement::Core => true,
            Requirement::AccelerationStructure => self.acceleration_structure,
            Requirement::RayTracingPipeline => self.ray_tracing_pipeline,
            Requirement::RayTracingMaintenance1 => self.ray_tracing_maintenance1,
            Requirement::MeshShader => self.mesh_shader,
            Requirement::Micromap => self.micromap,
        }
    }
}

const fn accesses(flags: &[vk::AccessFlags2]) -> vk::AccessFlags2 {
    let mut raw = 0;
    let mut i = 0;
    while i < flags.len() {
        raw |= flags[i].as_raw();
        i += 1;
    }
    vk::AccessFlags2::from_raw(raw)
}

const fn stages(flags: &[vk::PipelineStageFlags2]) -> vk::PipelineStageFlags2 {
    let mut raw = 0;
    let mut i = 0;
    while i < flags.len() {
        raw |= flags[i].as_raw();
        i += 1;
    }
    vk::PipelineStageFlags2::from_raw(raw)
}

const SHADER_ACCESSES: vk::AccessFlags2 = accesses(&[
    vk::AccessFlags2::UNIFORM_READ,
    vk::AccessFlags2::SHADER_SAMPLED_READ,
    vk::AccessFlags2::SHADER_STORAGE_READ,
    vk::AccessFlags2::SHADER_STORAGE_WRITE,
]);

const TRANSFER_ACCESSES: vk::AccessFlags2 = accesses(&[vk::AccessFlags2::TRANSFER_READ, vk::AccessFlags2::TRANSFER_WRITE]);

const ACCELERATION_STRUCTURE_ACCESSES: vk::AccessFlags2 = accesses(&[
    vk::AccessFlags2::ACCELERATION_STRUCTURE_READ_KHR,
    vk::AccessFlags2::ACCELERATION_STRUCTURE_WRITE_KHR,
]);

const RAY_QUERY: &[(Requirement, vk::AccessFlags2)] = &[(
    Requirement::AccelerationStructure,
    vk::AccessFlags2::ACCELERATION_STRUCTURE_READ_KHR,
)];

struct StageEntry {
    stage: vk::PipelineStageFlags2,
    requires: Requirement,
    accesses: vk::AccessFlags2,
    extra: &'static [(Requirement, vk::AccessFlags2)],
}

const STAGES: &[StageEntry] = &[
    StageEntry {
        stage: vk::PipelineStageFlags2::DRAW_INDIRECT,
        requires: Requirement::Core,
        accesses: vk::AccessFlags2::INDIRECT_COMMAND_READ,
        extra: &[],
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::INDEX_INPUT,
        requires: Requirement::Core,
        accesses: vk::AccessFlags2::INDEX_READ,
        extra: &[],
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::VERTEX_ATTRIBUTE_INPUT,
        requires: Requirement::Core,
        accesses: vk::AccessFlags2::VERTEX_ATTRIBUTE_READ,
        extra: &[],
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::VERTEX_SHADER,
        requires: Requirement::Core,
        accesses: SHADER_ACCESSES,
        extra: RAY_QUERY,
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::TESSELLATION_CONTROL_SHADER,
        requires: Requirement::Core,
        accesses: SHADER_ACCESSES,
        extra: RAY_QUERY,
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::TESSELLATION_EVALUATION_SHADER,
        requires: Requirement::Core,
        accesses: SHADER_ACCESSES,
        extra: RAY_QUERY,
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::GEOMETRY_SHADER,
        requires: Requirement::Core,
        accesses: SHADER_ACCESSES,
        extra: RAY_QUERY,
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::TASK_SHADER_EXT,
        requires: Requirement::MeshShader,
        accesses: SHADER_ACCESSES,
        extra: RAY_QUERY,
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::MESH_SHADER_EXT,
        requires: Requirement::MeshShader,
        accesses: SHADER_ACCESSES,
        extra: RAY_QUERY,
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::FRAGMENT_SHADER,
        requires: Requirement::Core,
        accesses: accesses(&[SHADER_ACCESSES, vk::AccessFlags2::INPUT_ATTACHMENT_READ]),
        extra: RAY_QUERY,
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::EARLY_FRAGMENT_TESTS,
        requires: Requirement::Core,
        accesses: accesses(&[
            vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_READ,
            vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_WRITE,
        ]),
        extra: &[],
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::LATE_FRAGMENT_TESTS,
        requires: Requirement::Core,
        accesses: accesses(&[
            vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_READ,
            vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_WRITE,
        ]),
        extra: &[],
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT,
        requires: Requirement::Core,
        accesses: accesses(&[
            vk::AccessFlags2::COLOR_ATTACHMENT_READ,
            vk::AccessFlags2::COLOR_ATTACHMENT_WRITE,
        ]),
        extra: &[],
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::COMPUTE_SHADER,
        requires: Requirement::Core,
        accesses: SHADER_ACCESSES,
        extra: RAY_QUERY,
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::COPY,
        requires: Requirement::Core,
        accesses: TRANSFER_ACCESSES,
        extra: &[],
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::BLIT,
        requires: Requirement::Core,
        accesses: TRANSFER_ACCESSES,
        extra: &[],
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::RESOLVE,
        requires: Requirement::Core,
        accesses: TRANSFER_ACCESSES,
        extra: &[],
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::CLEAR,
        requires: Requirement::Core,
        accesses: vk::AccessFlags2::TRANSFER_WRITE,
        extra: &[],
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::HOST,
        requires: Requirement::Core,
        accesses: accesses(&[vk::AccessFlags2::HOST_READ, vk::AccessFlags2::HOST_WRITE]),
        extra: &[],
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::ACCELERATION_STRUCTURE_BUILD_KHR,
        requires: Requirement::AccelerationStructure,
        accesses: accesses(&[
            vk::AccessFlags2::INDIRECT_COMMAND_READ,
            TRANSFER_ACCESSES,
            ACCELERATION_STRUCTURE_ACCESSES,
        ]),
        extra: &[(Requirement::Micromap, vk::AccessFlags2::MICROMAP_READ_EXT)],
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::ACCELERATION_STRUCTURE_COPY_KHR,
        requires: Requirement::RayTracingMaintenance1,
        accesses: accesses(&[TRANSFER_ACCESSES, ACCELERATION_STRUCTURE_ACCESSES]),
        extra: &[],
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::RAY_TRACING_SHADER_KHR,
        requires: Requirement::RayTracingPipeline,
        accesses: accesses(&[SHADER_ACCESSES, vk::AccessFlags2::ACCELERATION_STRUCTURE_READ_KHR]),
        extra: &[(
            Requirement::RayTracingMaintenance1,
            vk::AccessFlags2::SHADER_BINDING_TABLE_READ_KHR,
        )],
    },
    StageEntry {
        stage: vk::PipelineStageFlags2::MICROMAP_BUILD_EXT,
        requires: Requirement::Micromap,
        accesses: accesses(&[vk::AccessFlags2::MICROMAP_READ_EXT, vk::AccessFlags2::MICROMAP_WRITE_EXT]),
        extra: &[],
    },
];

/// A meta-stage stands for every member stage that is supported on the device.
struct MetaStage {
    stage: vk::PipelineStageFlags2,
    members: vk::PipelineStageFlags2,
}

/// Meta-stages in ascending bit order.
const META_STAGES: &[MetaStage] = &[
    MetaStage {
        stage: vk::PipelineStageFlags2::VERTEX_INPUT,
        members: stages(&[
            vk::PipelineStageFlags2::INDEX_INPUT,
            vk::PipelineStageFlags2::VERTEX_ATTRIBUTE_INPUT,
        ]),
    },
    MetaStage {
        stage: vk::PipelineStageFlags2::ALL_TRANSFER,
        members: stages(&[
            vk::PipelineStageFlags2::COPY,
            vk::PipelineStageFlags2::BLIT,
            vk::PipelineStageFlags2::RESOLVE,
            vk::PipelineStageFlags2::CLEAR,
            vk::PipelineStageFlags2::ACCELERATION_STRUCTURE_COPY_KHR,
        ]),
    },
    MetaStage {
        stage: vk::PipelineStageFlags2::PRE_RASTERIZATION_SHADERS,
        members: stages(&[
            vk::PipelineStageFlags2::VERTEX_SHADER,
            vk::PipelineStageFlags2::TESSELLATION_CONTROL_SHADER,
            vk::PipelineStageFlags2::TESSELLATION_EVALUATION_SHADER,
            vk::PipelineStageFlags2::GEOMETRY_SHADER,
            vk::PipelineStageFlags2::TASK_SHADER_EXT,
            vk::PipelineStageFlags2::MESH_SHADER_EXT,
        ]),
    },
];

const fn meta_stages_sorted() -> bool {
    let mut i = 1;
    while i < META_STAGES.len() {
        if META_STAGES[i - 1].stage.as_raw() >= META_STAGES[i].stage.as_raw() {
            return false;
        }
        i += 1;
    }
    true
}

const_assert!(meta_stages_sorted());

const READ_ACCESSES: vk::AccessFlags2 = accesses(&[
    vk::AccessFlags2::INDIRECT_COMMAND_READ,
    vk::AccessFlags2::INDEX_READ,
    vk::AccessFlags2::VERTEX_ATTRIBUTE_READ,
    vk::AccessFlags2::UNIFORM_READ,
    vk::AccessFlags2::INPUT_ATTACHMENT_READ,
    vk::AccessFlags2::COLOR_ATTACHMENT_READ,
    vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_READ,
    vk::AccessFlags2::TRANSFER_READ,
    vk::AccessFlags2::HOST_READ,
    vk::AccessFlags2::SHADER_SAMPLED_READ,
    vk::AccessFlags2::SHADER_STORAGE_READ,
    vk::AccessFlags2::ACCELERATION_STRUCTURE_READ_KHR,
    vk::AccessFlags2::SHADER_BINDING_TABLE_READ_KHR,
    vk::AccessFlags2::MICROMAP_READ_EXT,
]);

const WRITE_ACCESSES: vk::AccessFlags2 = accesses(&[
    vk::AccessFlags2::COLOR_ATTACHMENT_WRITE,
    vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_WRITE,
    vk::AccessFlags2::TRANSFER_WRITE,
    vk::AccessFlags2::HOST_WRITE,
    vk::AccessFlags2::SHADER_STORAGE_WRITE,
    vk::AccessFlags2::ACCELERATION_STRUCTURE_WRITE_KHR,
    vk::AccessFlags2::MICROMAP_WRITE_EXT,
]);

/// Lookup table from pipeline stage to the access types it can legally produce, given a
/// set of enabled capabilities.
#[derive(Debug, Clone)]
pub struct StageAccessCatalog {
    capabilities: Capabilities,
}

impl StageAccessCatalog {
    /// Create a catalog for the given capability set.
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
        }
    }

    /// The capabilities this catalog was created with.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn entry(&self, stage: vk::PipelineStageFlags2) -> Option<&'static StageEntry> {
        STAGES
            .iter()
            .find(|entry| entry.stage == stage && self.capabilities.satisfies(entry.requires))
    }

    fn meta(&self, stage: vk::PipelineStageFlags2) -> Option<&'static MetaStage> {
        META_STAGES.iter().find(|meta| meta.stage == stage)
    }

    /// Whether the stage is a meta-stage, standing for a family of simple stages.
    pub fn is_meta_stage(&self, stage: vk::PipelineStageFlags2) -> bool {
        self.meta(stage).is_some()
    }

    /// Whether this simple or meta stage is recognized under the enabled capabilities.
    pub fn is_supported(&self, stage: vk::PipelineStageFlags2) -> bool {
        self.entry(stage).is_some() || self.meta(stage).is_some()
    }

    /// Every meta-stage known to the catalog, in ascending bit order.
    pub fn meta_stages(&self) -> impl Iterator<Item = vk::PipelineStageFlags2> {
        META_STAGES.iter().map(|meta| meta.stage)
    }

    /// The supported member stages of a meta-stage, or `None` if `stage` is not a meta-stage.
    pub fn meta_stage_members(&self, stage: vk::PipelineStageFlags2) -> Option<vk::PipelineStageFlags2> {
        let meta = self.meta(stage)?;
        let supported = super::names::bits(meta.members.as_raw())
            .filter(|bit| self.entry(vk::PipelineStageFlags2::from_raw(*bit)).is_some())
            .fold(0, |acc, bit| acc | bit);
        Some(vk::PipelineStageFlags2::from_raw(supported))
    }

    /// The full set of access types the stage can produce. For a meta-stage, this is the
    /// union over all of its supported members. Returns `None` for unrecognized stages.
    pub fn legal_accesses(&self, stage: vk::PipelineStageFlags2) -> Option<vk::AccessFlags2> {
        if let Some(members) = self.meta_stage_members(stage) {
            let union = super::names::bits(members.as_raw())
                .filter_map(|bit| self.legal_accesses(vk::PipelineStageFlags2::from_raw(bit)))
                .fold(vk::AccessFlags2::empty(), |acc, flags| acc | flags);
            return Some(union);
        }

        let entry = self.entry(stage)?;
        let extra = entry
            .extra
            .iter()
            .filter(|(requirement, _)| self.capabilities.satisfies(*requirement))
            .fold(vk::AccessFlags2::empty(), |acc, (_, flags)| acc | *flags);
        Some(entry.accesses | extra)
    }

    /// Replace the umbrella access bits (`SHADER_READ`, `SHADER_WRITE`, `MEMORY_READ`, `MEMORY_WRITE`)
    /// by the specific access bits they stand for.
    pub fn expand_accesses(&self, access: vk::AccessFlags2) -> vk::AccessFlags2 {
        let umbrella = vk::AccessFlags2::SHADER_READ
            | vk::AccessFlags2::SHADER_WRITE
            | vk::AccessFlags2::MEMORY_READ
            | vk::AccessFlags2::MEMORY_WRITE;
        let mut expanded = vk::AccessFlags2::from_raw(access.as_raw() & !umbrella.as_raw());
        if access.contains(vk::AccessFlags2::SHADER_READ) {
            expanded |= vk::AccessFlags2::SHADER_SAMPLED_READ
                | vk::AccessFlags2::SHADER_STORAGE_READ
                | vk::AccessFlags2::SHADER_BINDING_TABLE_READ_KHR;
        }
        if access.contains(vk::AccessFlags2::SHADER_WRITE) {
            expanded |= vk::AccessFlags2::SHADER_STORAGE_WRITE;
        }
        if access.contains(vk::AccessFlags2::MEMORY_READ) {
            expanded |= READ_ACCESSES;
        }
        if access.contains(vk::AccessFlags2::MEMORY_WRITE) {
            expanded |= WRITE_ACCESSES;
        }
        expanded
    }
}
