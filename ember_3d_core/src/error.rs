//! Error types for the Ember3D render core
//!
//! This module defines the error types used throughout the render core,
//! including initialization, resource management and frame execution.

use std::fmt;

/// Result type for Ember3D render core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ember3D render core errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan call failure, submit failure, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (buffer, texture, mesh, pipeline, shader)
    InvalidResource(String),

    /// Initialization failed (device, swapchain, sync objects, defaults)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
