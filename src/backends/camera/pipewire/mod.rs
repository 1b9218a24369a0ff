// SPDX-License-Identifier: MPL-2.0

//! PipeWire camera backend
//!
//! This backend uses PipeWire for camera enumeration and capture. It's the
//! modern, recommended approach for Linux camera access.

mod enumeration;
mod pipeline;

pub use enumeration::{enumerate_pipewire_cameras, get_pipewire_formats, is_pipewire_available};
pub use pipeline::PipeWirePipeline;

use super::CameraBackend;
use super::types::*;
use tracing::info;

/// PipeWire backend implementation
///
/// Stateless: capture pipelines are created per-session by the camera
/// subscription and torn down with it.
pub struct PipeWireBackend;

impl PipeWireBackend {
    /// Create a new PipeWire backend
    pub fn new() -> Self {
        Self
    }
}

impl Default for PipeWireBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for PipeWireBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        if let Some(cameras) = enumerate_pipewire_cameras() {
            info!(count = cameras.len(), "PipeWire cameras enumerated");
            cameras
        } else {
            info!("PipeWire enumeration returned None");
            Vec::new()
        }
    }

    fn get_formats(&self, device: &CameraDevice) -> Vec<CameraFormat> {
        get_pipewire_formats(&device.path, device.node_id.as_deref())
    }

    fn is_available(&self) -> bool {
        is_pipewire_available()
    }
}
