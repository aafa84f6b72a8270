//! Exposes the error type

use std::sync::PoisonError;

use thiserror::Error;

/// Error type that can be returned by the validator.
///
/// Most irregular input is tolerated: unbalanced debug labels are carried across command buffers,
/// stale references produce degraded reports and unsupported stages are printed literally.
/// The variants below indicate a bug in the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// A hazard referenced an access that was never recorded or ingested.
    #[error("Access #{sequence} of command buffer {command_buffer:#x} (generation {generation}) was never recorded.")]
    UnknownAccessRecord {
        /// Raw command buffer handle
        command_buffer: u64,
        /// Generation the reference was captured in
        generation: u32,
        /// Sequence index inside the command buffer
        sequence: u32,
    },
    /// A lifecycle hook referenced a command buffer that was never begun.
    #[error("Command buffer {0:#x} is not known to the validator.")]
    UnknownCommandBuffer(u64),
    /// Secondary command buffer execution could not be spliced into the primary.
    #[error("Cannot execute secondary command buffer: {0}")]
    InvalidSplice(String),
    /// Poisoned mutex
    #[error("Poisoned mutex")]
    PoisonError,
}

impl<T> From<PoisonError<T>> for Error {
    fn from(_: PoisonError<T>) -> Self {
        Error::PoisonError
    }
}
