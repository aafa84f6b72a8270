//! Exposes all structs needed to store validator initialization parameters.

use crate::report::sink::{LogSink, ReportSink};

/// Optional device capabilities that change which stages exist and which access types
/// each stage can produce.
///
/// # Example
/// ```
/// # use syncval_attrib::*;
/// let caps = Capabilities {
///     acceleration_structure: true,
///     ..Default::default()
/// };
/// ```
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct Capabilities {
    /// `VK_KHR_acceleration_structure` is enabled. Adds the acceleration structure build stage,
    /// and lets every shader stage read acceleration structures.
    pub acceleration_structure: bool,
    /// `VK_KHR_ray_tracing_pipeline` is enabled. Adds the ray tracing shader stage.
    pub ray_tracing_pipeline: bool,
    /// `VK_KHR_ray_tracing_maintenance1` is enabled. Adds the acceleration structure copy stage
    /// and shader binding table reads.
    pub ray_tracing_maintenance1: bool,
    /// `VK_EXT_mesh_shader` is enabled. Adds the task and mesh shader stages.
    pub mesh_shader: bool,
    /// `VK_EXT_opacity_micromap` is enabled. Adds the micromap build stage and micromap reads
    /// during acceleration structure builds.
    pub micromap: bool,
}

/// Settings used to create a [`SyncValidator`](crate::SyncValidator).
#[derive(Derivative)]
#[derivative(Debug)]
pub struct ValidatorSettings {
    /// Name of the validator instance, used in log output.
    pub name: String,
    /// Capabilities enabled on the device being validated.
    pub capabilities: Capabilities,
    /// Where formatted hazard reports are sent.
    #[derivative(Debug = "ignore")]
    pub sink: Box<dyn ReportSink + Send + Sync>,
}

/// The validator builder is a convenience struct to easily create [`ValidatorSettings`].
///
/// # Example
/// ```
/// # use syncval_attrib::*;
/// let settings = ValidatorBuilder::new()
///     .name("frame validator")
///     .acceleration_structure(true)
///     .mesh_shader(true)
///     .build();
/// ```
pub struct ValidatorBuilder {
    inner: ValidatorSettings,
}

impl Default for ValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidatorBuilder {
    /// Create a new builder with default settings. No optional capabilities are enabled and
    /// reports go to the [`log`] facade.
    pub fn new() -> Self {
        ValidatorBuilder {
            inner: ValidatorSettings {
                name: String::from("syncval"),
                capabilities: Capabilities::default(),
                sink: Box::new(LogSink),
            },
        }
    }

    /// Sets the validator name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = name.into();
        self
    }

    /// Replace the full capability set.
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.inner.capabilities = capabilities;
        self
    }

    /// Enable `VK_KHR_acceleration_structure`.
    pub fn acceleration_structure(mut self, enabled: bool) -> Self {
        self.inner.capabilities.acceleration_structure = enabled;
        self
    }

    /// Enable `VK_KHR_ray_tracing_pipeline`. This implies acceleration structure support.
    pub fn ray_tracing_pipeline(mut self, enabled: bool) -> Self {
        self.inner.capabilities.ray_tracing_pipeline = enabled;
        self.inner.capabilities.acceleration_structure |= enabled;
        self
    }

    /// Enable `VK_KHR_ray_tracing_maintenance1`.
    pub fn ray_tracing_maintenance1(mut self, enabled: bool) -> Self {
        self.inner.capabilities.ray_tracing_maintenance1 = enabled;
        self
    }

    /// Enable `VK_EXT_mesh_shader`.
    pub fn mesh_shader(mut self, enabled: bool) -> Self {
        self.inner.capabilities.mesh_shader = enabled;
        self
    }

    /// Enable `VK_EXT_opacity_micromap`.
    pub fn micromap(mut self, enabled: bool) -> Self {
        self.inner.capabilities.micromap = enabled;
        self
    }

    /// Send hazard reports to a custom sink instead of the log.
    pub fn sink(mut self, sink: impl ReportSink + Send + Sync + 'static) -> Self {
        self.inner.sink = Box::new(sink);
        self
    }

    /// Build the resulting settings.
    pub fn build(self) -> ValidatorSettings {
        self.inner
    }
}
