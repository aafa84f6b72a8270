//! Turns a hazard between two recorded accesses into a message an application developer can act on.
//!
//! - The [`attributor`] module looks up both accesses and resolves where they happened.
//! - The [`format`] module assembles the final message.
//! - The [`sink`] module defines where messages go.

pub mod attributor;
pub mod format;
pub mod sink;
