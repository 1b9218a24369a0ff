// SPDX-License-Identifier: MPL-2.0
// Camera backend with trait-based abstraction for future multi-backend support

//! Camera backend abstraction
//!
//! This module provides a trait-based abstraction for the PipeWire camera backend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │   UI Layer (App)    │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraBackendManager│  ← Shared, thread-safe enumeration
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  CameraBackend Trait│  ← Common interface
//! └──────────┬──────────┘
//!            │
//!            ▼
//!       ┌────────┐
//!       │PipeWire│  ← Concrete implementation
//!       └────────┘
//! ```

pub mod manager;
pub mod pipewire;
pub mod types;

pub use manager::CameraBackendManager;
pub use types::*;

/// Camera backend trait
///
/// Backends provide device discovery and format detection. Capture itself
/// runs through a pipeline owned by the camera subscription, not through
/// this trait, so a torn-down backend never strands an open stream.
pub trait CameraBackend: Send + Sync {
    /// Enumerate available cameras on this backend
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    /// Get supported formats for a specific camera device
    fn get_formats(&self, device: &CameraDevice) -> Vec<CameraFormat>;

    /// Check if this backend is available on the current system
    fn is_available(&self) -> bool;
}

/// Get a concrete backend instance (PipeWire only)
pub fn get_backend() -> Box<dyn CameraBackend> {
    Box::new(pipewire::PipeWireBackend::new())
}
