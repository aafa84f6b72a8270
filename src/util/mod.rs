//! Various utilities

pub(crate) mod string;
