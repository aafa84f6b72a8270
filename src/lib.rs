//! Debug label and object attribution for Vulkan synchronization hazard reports.
//!
//! When a synchronization validator finds a hazard between two recorded accesses, the raw facts (two command
//! buffer handles, two sequence numbers and a pair of stage/access masks) are of little use to an application
//! developer. This crate keeps track of the information needed to say *where* both accesses happened:
//!
//! - the debug label regions they were recorded in, including regions that were begun in an earlier command
//!   buffer, batch or submit call on the same queue, and regions of the primary a secondary command buffer was
//!   executed from,
//! - the debug names of the resources involved,
//! - a compact but exact summary of the pipeline stages and access types involved.
//!
//! Deciding *whether* two accesses conflict is not the job of this crate. The detection engine hands over a
//! [`HazardResult`](crate::HazardResult), and this crate turns it into a message.
//!
//! # Example
//! ```
//! use syncval_attrib::prelude::*;
//!
//! let validator = SyncValidator::new(ValidatorBuilder::new().build());
//! let queue = QueueId(1);
//! let image = validator.register_resource(ResourceKind::Image, 0x20)?;
//! validator.set_debug_name(image, "gbuffer")?;
//!
//! // The first command buffer opens a region it does not close.
//! let first = CommandBufferId(10);
//! validator.on_begin(first, CommandBufferLevel::Primary)?;
//! validator.on_label_push(first, "Frame")?;
//! let write = validator.on_resource_access(first, image, vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE)?;
//!
//! // The second one closes it.
//! let second = CommandBufferId(11);
//! validator.on_begin(second, CommandBufferLevel::Primary)?;
//! let read = validator.on_resource_access(second, image, vk::PipelineStageFlags2::FRAGMENT_SHADER, vk::AccessFlags2::SHADER_SAMPLED_READ)?;
//! validator.on_label_pop(second)?;
//!
//! validator.on_queue_submit(queue, &[&[first], &[second]])?;
//! let attribution = validator.attribute(&HazardResult { kind: HazardKind::ReadAfterWrite, current: read, prior: write })?;
//! assert_eq!(attribution.current.label, "Frame");
//! assert_eq!(attribution.prior.object_name, "gbuffer");
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! For further details, check out the following modules
//! - [`label`] for label stacks and paths.
//! - [`command_buffer`] for per command buffer recording and secondary command buffer splicing.
//! - [`sync`] for the per-queue submission timeline and hazard types.
//! - [`access`] for stage/access catalogs and access mask summaries.
//! - [`report`] for hazard attribution and message formatting.

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate log;
#[macro_use]
extern crate static_assertions;

pub mod prelude;
pub use crate::prelude::*;

pub mod access;
pub mod command_buffer;
pub mod core;
pub mod label;
pub mod report;
pub mod resource;
pub mod sync;
pub(crate) mod util;
pub mod validator;
