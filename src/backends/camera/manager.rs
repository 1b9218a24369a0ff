// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend lifecycle manager
//!
//! The manager provides thread-safe, shareable access to the backend for
//! the pieces that enumerate repeatedly (hotplug poll, CLI listing).

use super::types::*;
use super::{CameraBackend, get_backend};
use std::sync::Arc;
use std::sync::Mutex;
use tracing::info;

/// Internal manager state
struct ManagerState {
    /// The active backend instance
    backend: Box<dyn CameraBackend>,
}

/// Camera backend manager
///
/// Thread-safe and can be shared across threads.
#[derive(Clone)]
pub struct CameraBackendManager {
    state: Arc<Mutex<ManagerState>>,
}

impl CameraBackendManager {
    /// Create a new backend manager
    pub fn new() -> Self {
        info!("Creating camera backend manager");

        let state = ManagerState {
            backend: get_backend(),
        };

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Check if the backend is available on this system
    pub fn is_available(&self) -> bool {
        self.state.lock().unwrap().backend.is_available()
    }

    /// Enumerate available cameras
    ///
    /// An empty device list is reported as `DeviceNotFound` so callers
    /// surface the unavailable state instead of acquiring a stream.
    pub fn enumerate_cameras(&self) -> BackendResult<Vec<CameraDevice>> {
        let state = self.state.lock().unwrap();

        // Only call enumerate once - it spawns a pw-cli subprocess
        let cameras = state.backend.enumerate_cameras();
        if cameras.is_empty() {
            Err(BackendError::DeviceNotFound("No cameras found".to_string()))
        } else {
            Ok(cameras)
        }
    }

    /// Get supported formats for a camera
    pub fn get_formats(&self, device: &CameraDevice) -> Vec<CameraFormat> {
        let state = self.state.lock().unwrap();
        state.backend.get_formats(device)
    }
}

impl Default for CameraBackendManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CameraBackendManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraBackendManager").finish_non_exhaustive()
    }
}
