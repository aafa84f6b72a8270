//! Identity and debug names of the Vulkan objects that accesses are recorded against.
//!
//! Applications may name an object with `vkSetDebugUtilsObjectNameEXT` at any time after creating it,
//! so names are only ever looked up when a report is formatted, never when an access is recorded.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use anyhow::Result;
use ash::vk;
use ash::vk::Handle;

use crate::util::string::wrap_c_str;

/// Identifies a resource by its raw Vulkan handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub u64);

impl ResourceId {
    /// Identifier of any Vulkan handle.
    pub fn of<H: Handle>(handle: H) -> Self {
        ResourceId(handle.as_raw())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// The kind of object a resource is.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    /// `VkBuffer`
    Buffer,
    /// `VkImage`
    Image,
    /// `VkBufferView`
    BufferView,
    /// `VkImageView`
    ImageView,
    /// `VkAccelerationStructureKHR`
    AccelerationStructure,
    /// Any other object type.
    Other(vk::ObjectType),
}

impl From<vk::ObjectType> for ResourceKind {
    fn from(value: vk::ObjectType) -> Self {
        match value {
            vk::ObjectType::BUFFER => ResourceKind::Buffer,
            vk::ObjectType::IMAGE => ResourceKind::Image,
            vk::ObjectType::BUFFER_VIEW => ResourceKind::BufferView,
            vk::ObjectType::IMAGE_VIEW => ResourceKind::ImageView,
            vk::ObjectType::ACCELERATION_STRUCTURE_KHR => ResourceKind::AccelerationStructure,
            other => ResourceKind::Other(other),
        }
    }
}

/// A Vulkan object with its optional debug name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentity {
    /// Type of the object.
    pub kind: ResourceKind,
    /// Raw handle value.
    pub handle: u64,
    /// Name given through `vkSetDebugUtilsObjectNameEXT`, if any.
    pub debug_name: Option<String>,
}

/// Thread-safe table of all known resources.
#[derive(Debug, Default)]
pub struct ResourceTable {
    resources: RwLock<HashMap<ResourceId, ResourceIdentity>>,
}

impl ResourceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource. Registering an id that is already known replaces it, since Vulkan may hand out
    /// the same handle value again after the old object was destroyed.
    pub fn register(&self, kind: ResourceKind, handle: u64) -> Result<ResourceId> {
        let id = ResourceId(handle);
        let mut resources = self.resources.write().map_err(|_| crate::Error::PoisonError)?;
        resources.insert(
            id,
            ResourceIdentity {
                kind,
                handle,
                debug_name: None,
            },
        );
        Ok(id)
    }

    /// Register any Vulkan handle, deriving its kind from the handle type.
    pub fn register_handle<H: Handle>(&self, handle: H) -> Result<ResourceId> {
        self.register(H::TYPE.into(), handle.as_raw())
    }

    /// Set or replace the debug name of a resource. Unknown resources are registered on the fly.
    pub fn set_debug_name(&self, id: ResourceId, name: impl Into<String>) -> Result<()> {
        let mut resources = self.resources.write().map_err(|_| crate::Error::PoisonError)?;
        let identity = resources.entry(id).or_insert_with(|| ResourceIdentity {
            kind: ResourceKind::Other(vk::ObjectType::UNKNOWN),
            handle: id.0,
            debug_name: None,
        });
        identity.debug_name = Some(name.into());
        Ok(())
    }

    /// Apply a `VkDebugUtilsObjectNameInfoEXT`, as passed to `vkSetDebugUtilsObjectNameEXT`.
    /// A null name clears the debug name.
    /// # Safety
    /// `info.p_object_name` must be null or point to a valid null-terminated string.
    pub unsafe fn set_object_name(&self, info: &vk::DebugUtilsObjectNameInfoEXT) -> Result<ResourceId> {
        let id = ResourceId(info.object_handle);
        let name = wrap_c_str(info.p_object_name);
        let mut resources = self.resources.write().map_err(|_| crate::Error::PoisonError)?;
        let identity = resources.entry(id).or_insert_with(|| ResourceIdentity {
            kind: info.object_type.into(),
            handle: info.object_handle,
            debug_name: None,
        });
        identity.debug_name = if name.is_empty() { None } else { Some(name) };
        Ok(id)
    }

    /// Forget a destroyed resource.
    pub fn destroy(&self, id: ResourceId) -> Result<Option<ResourceIdentity>> {
        let mut resources = self.resources.write().map_err(|_| crate::Error::PoisonError)?;
        Ok(resources.remove(&id))
    }

    /// Look up a resource.
    pub fn identity(&self, id: ResourceId) -> Result<Option<ResourceIdentity>> {
        let resources = self.resources.read().map_err(|_| crate::Error::PoisonError)?;
        Ok(resources.get(&id).cloned())
    }

    /// Current debug name of a resource, or an empty string if it has none or is unknown.
    pub fn name_of(&self, id: ResourceId) -> Result<String> {
        let resources = self.resources.read().map_err(|_| crate::Error::PoisonError)?;
        Ok(resources
            .get(&id)
            .and_then(|identity| identity.debug_name.clone())
            .unwrap_or_default())
    }
}
