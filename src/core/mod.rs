//! The core module holds the error type and the settings needed to create a validator.

pub mod app_info;
pub mod error;
