// SPDX-License-Identifier: GPL-3.0-only

//! Camera control handlers
//!
//! Handles camera selection, switching, frame arrival, initialization,
//! and hotplug events.

use crate::app::state::{AppModel, Message};
use crate::backends::camera::types::{CameraDevice, CameraFormat, CameraFrame};
use crate::constants::formats::PREFERRED_SCAN_WIDTH;
use crate::constants::platform;
use cosmic::Task;
use cosmic::cosmic_config::CosmicConfigEntry;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Pick the format the capture pipeline should negotiate for scanning.
///
/// Prefers the format whose width is closest to `PREFERRED_SCAN_WIDTH`.
/// Full sensor resolution costs conversion time without helping the decoder,
/// while very small frames lose module detail at a distance. Ties go to the
/// taller format.
pub(crate) fn preferred_scan_format(available: &[CameraFormat]) -> Option<CameraFormat> {
    available
        .iter()
        .min_by_key(|f| {
            (
                f.width.abs_diff(PREFERRED_SCAN_WIDTH),
                std::cmp::Reverse(f.height),
            )
        })
        .cloned()
}

/// Copy frame pixels into a tightly packed RGBA buffer.
///
/// `image::Handle::from_rgba` expects rows without padding, while pipeline
/// frames may carry stride. When the stride already matches the row width
/// the data is handed over in a single copy.
pub(crate) fn rgba_without_stride(frame: &CameraFrame) -> Vec<u8> {
    let row_bytes = (frame.width * 4) as usize;
    let stride = frame.stride as usize;
    let data: &[u8] = &frame.data;
    let packed_len = row_bytes * frame.height as usize;

    if stride == row_bytes && data.len() >= packed_len {
        return data[..packed_len].to_vec();
    }

    let mut packed = Vec::with_capacity(packed_len);
    for row in 0..frame.height as usize {
        let start = row * stride;
        if start >= data.len() {
            break;
        }
        let end = (start + row_bytes).min(data.len());
        packed.extend_from_slice(&data[start..end]);
    }
    packed
}

impl AppModel {
    // =========================================================================
    // Camera Control Handlers
    // =========================================================================

    pub(crate) fn handle_switch_camera(&mut self) -> Task<cosmic::Action<Message>> {
        info!(
            current_index = self.current_camera_index,
            "Received SwitchCamera message"
        );
        if self.available_cameras.len() > 1 {
            let next_index = (self.current_camera_index + 1) % self.available_cameras.len();
            let camera_name = &self.available_cameras[next_index].name;
            info!(new_index = next_index, camera = %camera_name, "Switching to camera");

            info!("Setting cancellation flag for camera switch");
            self.camera_cancel_flag
                .store(true, std::sync::atomic::Ordering::Release);
            self.camera_cancel_flag =
                std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));

            self.current_camera_index = next_index;
            self.apply_camera_selection();
        } else {
            info!("Only one camera available, cannot switch");
        }
        Task::none()
    }

    pub(crate) fn handle_select_camera(&mut self, index: usize) -> Task<cosmic::Action<Message>> {
        if index < self.available_cameras.len() {
            info!(index, "Selected camera index");

            self.camera_cancel_flag
                .store(true, std::sync::atomic::Ordering::Release);
            self.camera_cancel_flag =
                std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));

            self.current_camera_index = index;
            self.apply_camera_selection();
        }
        Task::none()
    }

    /// Refresh formats for the newly selected camera and persist the choice.
    ///
    /// The previous pipeline has already been told to stop via the cancel
    /// flag; the camera subscription restarts with the new index and format.
    fn apply_camera_selection(&mut self) {
        let Some(camera) = self.available_cameras.get(self.current_camera_index) else {
            return;
        };
        let camera = camera.clone();

        let backend = crate::backends::camera::get_backend();
        self.available_formats = if camera.path.is_empty() {
            Vec::new()
        } else {
            backend.get_formats(&camera)
        };
        self.active_format = preferred_scan_format(&self.available_formats);

        if let Some(format) = &self.active_format {
            info!(format = %format, "Selected scan format");
        }

        self.config.last_camera_path = Some(camera.path);
        if let Some(handler) = self.config_handler.as_ref()
            && let Err(err) = self.config.write_entry(handler)
        {
            error!(?err, "Failed to save last camera");
        }
    }

    pub(crate) fn handle_camera_frame(
        &mut self,
        frame: Arc<CameraFrame>,
    ) -> Task<cosmic::Action<Message>> {
        static FRAME_MSG_COUNT: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
        let count = FRAME_MSG_COUNT.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        if count % 30 == 0 {
            info!(
                message = count,
                width = frame.width,
                height = frame.height,
                bytes = frame.data.len(),
                "CameraFrame message received in update()"
            );
        }

        // Warmup frames have no dimensions yet; keep the previous preview
        if frame.is_ready() {
            self.preview_handle = Some(cosmic::widget::image::Handle::from_rgba(
                frame.width,
                frame.height,
                rgba_without_stride(&frame),
            ));
        }
        self.current_frame = Some(frame);

        Task::none()
    }

    pub(crate) fn handle_cameras_initialized(
        &mut self,
        cameras: Vec<CameraDevice>,
        camera_index: usize,
        formats: Vec<CameraFormat>,
    ) -> Task<cosmic::Action<Message>> {
        info!(
            count = cameras.len(),
            camera_index, "Cameras initialized asynchronously"
        );

        if cameras.is_empty() {
            warn!("No cameras found - scanning is unavailable until one is connected");
        }

        self.available_cameras = cameras;
        self.current_camera_index = camera_index;
        self.available_formats = formats;
        self.active_format = preferred_scan_format(&self.available_formats);
        self.cameras_initialized = true;

        self.camera_dropdown_options = self
            .available_cameras
            .iter()
            .map(|cam| cam.name.clone())
            .collect();

        Task::none()
    }

    pub(crate) fn handle_camera_list_changed(
        &mut self,
        new_cameras: Vec<CameraDevice>,
    ) -> Task<cosmic::Action<Message>> {
        info!(
            old_count = self.available_cameras.len(),
            new_count = new_cameras.len(),
            "Camera list changed (hotplug event)"
        );

        let previous_camera = self
            .available_cameras
            .get(self.current_camera_index)
            .cloned();
        let current_camera_still_available = previous_camera.as_ref().is_some_and(|current| {
            new_cameras
                .iter()
                .any(|c| c.path == current.path && c.name == current.name)
        });

        self.available_cameras = new_cameras;
        self.camera_dropdown_options = self
            .available_cameras
            .iter()
            .map(|cam| cam.name.clone())
            .collect();

        if !current_camera_still_available {
            if self.available_cameras.is_empty() {
                error!("Current camera disconnected and no other cameras available");
                self.current_camera_index = 0;
                self.available_formats.clear();
                self.active_format = None;
                self.current_frame = None;
                self.preview_handle = None;
                self.camera_cancel_flag
                    .store(true, std::sync::atomic::Ordering::Release);
            } else {
                let index = platform::default_camera_index(
                    self.available_cameras.len(),
                    platform::is_mobile_platform(),
                );
                info!(index, "Current camera disconnected, switching to default");
                self.current_camera_index = index;

                // Give the dead pipeline a moment to tear down before restarting
                return Task::perform(
                    async move {
                        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                        index
                    },
                    |index| cosmic::Action::App(Message::SelectCamera(index)),
                );
            }
        } else if let Some(previous) = previous_camera
            && let Some(new_index) = self
                .available_cameras
                .iter()
                .position(|c| c.path == previous.path && c.name == previous.name)
        {
            self.current_camera_index = new_index;
        }

        Task::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::{FrameData, Framerate};
    use std::time::Instant;

    fn fmt(width: u32, height: u32) -> CameraFormat {
        CameraFormat {
            width,
            height,
            framerate: Some(Framerate::from_int(30)),
            pixel_format: "MJPG".to_string(),
        }
    }

    fn frame(width: u32, height: u32, stride: u32, data: Vec<u8>) -> CameraFrame {
        CameraFrame {
            width,
            height,
            data: FrameData::Copied(Arc::from(data)),
            stride,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn test_preferred_scan_format_picks_closest_width() {
        let available = vec![fmt(640, 480), fmt(1920, 1080), fmt(1280, 720)];
        let selected = preferred_scan_format(&available).unwrap();
        assert_eq!((selected.width, selected.height), (1280, 720));
    }

    #[test]
    fn test_preferred_scan_format_ties_go_to_taller() {
        let available = vec![fmt(1280, 720), fmt(1280, 960)];
        let selected = preferred_scan_format(&available).unwrap();
        assert_eq!(selected.height, 960);
    }

    #[test]
    fn test_preferred_scan_format_empty() {
        assert_eq!(preferred_scan_format(&[]), None);
    }

    #[test]
    fn test_rgba_without_stride_passthrough() {
        // 2x2 frame with no padding: data comes back unchanged
        let data: Vec<u8> = (0..16).collect();
        let packed = rgba_without_stride(&frame(2, 2, 8, data.clone()));
        assert_eq!(packed, data);
    }

    #[test]
    fn test_rgba_without_stride_strips_padding() {
        // 1x2 frame with 4 bytes of padding per row
        let mut data = vec![0u8; 16];
        data[0..4].copy_from_slice(&[1, 2, 3, 4]);
        data[8..12].copy_from_slice(&[5, 6, 7, 8]);
        let packed = rgba_without_stride(&frame(1, 2, 8, data));
        assert_eq!(packed, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_rgba_without_stride_truncated_data() {
        // Data shorter than advertised dimensions must not panic
        let packed = rgba_without_stride(&frame(2, 2, 8, vec![9u8; 10]));
        assert_eq!(packed.len(), 10);
    }
}
