//! Error types for delay engine construction.
//!
//! Processing never fails: out-of-range controls are clamped and the
//! buffers are allocated up front. The only thing that can go wrong is the
//! allocation itself, which the host sees as a failed `initialize()`.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that can occur while building a delay engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The sample buffer could not be allocated.
    #[error("failed to allocate a {capacity}-sample delay buffer: {source}")]
    Allocation {
        capacity: usize,
        #[source]
        source: TryReserveError,
    },
}
