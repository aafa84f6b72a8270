//! Pipeline stage and access type bookkeeping used to describe the accesses involved in a hazard.
//!
//! - The [`catalog`] module knows which access types each stage can produce under a set of enabled capabilities.
//! - The [`summary`] module uses the catalog to print access masks as compactly as is still exact.
//! - The [`names`] module maps single bits to their Vulkan enumerant names.

pub mod catalog;
pub mod names;
pub mod summary;
