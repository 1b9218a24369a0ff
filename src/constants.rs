// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Scan loop constants
pub mod scan {
    use std::time::Duration;

    /// Minimum interval between decode attempts on the live stream
    ///
    /// Frames arrive faster than decoding is useful; attempts are gated
    /// to this interval and intermediate frames only update the preview.
    pub const MIN_SCAN_INTERVAL: Duration = Duration::from_millis(100);

    /// How long the one-shot success notice stays visible, in milliseconds
    pub const SUCCESS_NOTICE_MS: u64 = 2000;
}

/// Auto-open countdown constants
pub mod redirect {
    /// Seconds on the countdown when a link result is first shown
    pub const COUNTDOWN_START_SECS: u8 = 5;

    /// Countdown tick length in milliseconds
    pub const COUNTDOWN_TICK_MS: u64 = 1000;
}

/// UI Constants
pub mod ui {
    /// Overlay button/container background transparency (0.0 = transparent, 1.0 = opaque)
    ///
    /// Used for semi-transparent backgrounds on panels overlaid on the camera preview.
    pub const OVERLAY_BACKGROUND_ALPHA: f32 = 0.6;

    /// Standard icon button width (for layout balancing)
    pub const ICON_BUTTON_WIDTH: f32 = 44.0;

    /// Maximum width of the result panel
    pub const RESULT_PANEL_MAX_WIDTH: f32 = 420.0;
}

/// Video format constants
pub mod formats {
    /// Common frame rates to try when exact enumeration fails
    pub const COMMON_FRAMERATES: &[u32] = &[30, 60, 15, 24];

    /// Preferred capture width for scanning
    ///
    /// 720p keeps decode latency low while leaving enough detail for
    /// dense QR codes. Larger formats are downscaled anyway.
    pub const PREFERRED_SCAN_WIDTH: u32 = 1280;
}

/// GStreamer pipeline constants
pub mod pipeline {
    /// Maximum buffer queue size (keep small for low latency)
    pub const MAX_BUFFERS: u32 = 2;

    /// Get number of threads for videoconvert based on available CPU threads
    pub fn videoconvert_threads() -> u32 {
        std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(4) // Fallback to 4 if detection fails
    }
}

/// Timing constants
pub mod timing {
    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;

    /// GStreamer state change timeout for validation
    /// Reduced to minimize startup delay - we accept async state changes
    pub const STATE_CHANGE_TIMEOUT_MS: u64 = 50;

    /// Pipeline state change timeout on stop
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// Pipeline playing state timeout on start
    pub const START_TIMEOUT_SECS: u64 = 5;
}

/// Application information utilities
pub mod app_info {
    use std::path::Path;

    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }

    /// Check if the application is running inside a Flatpak sandbox
    pub fn is_flatpak() -> bool {
        Path::new("/.flatpak-info").exists()
    }
}

/// Platform detection
pub mod platform {
    use std::path::Path;

    /// DMI chassis types for handheld (11) and tablet (30) form factors
    const MOBILE_CHASSIS_TYPES: &[&str] = &["11", "30"];

    /// Detect whether this machine is a mobile form factor
    ///
    /// Reads the SMBIOS chassis type; boards without DMI (most ARM
    /// devices) are treated as mobile when a device-tree model exists.
    pub fn is_mobile_platform() -> bool {
        match std::fs::read_to_string("/sys/class/dmi/id/chassis_type") {
            Ok(contents) => is_mobile_chassis(&contents),
            Err(_) => Path::new("/proc/device-tree/model").exists(),
        }
    }

    pub(crate) fn is_mobile_chassis(chassis_type: &str) -> bool {
        MOBILE_CHASSIS_TYPES.contains(&chassis_type.trim())
    }

    /// Pick the camera to start with
    ///
    /// Mobile devices list the user-facing camera first and the rear
    /// camera last; scanning wants the rear one. Desktops start with the
    /// first enumerated device.
    pub fn default_camera_index(camera_count: usize, mobile: bool) -> usize {
        if mobile {
            camera_count.saturating_sub(1)
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera_index() {
        assert_eq!(platform::default_camera_index(3, false), 0);
        assert_eq!(platform::default_camera_index(3, true), 2);
        assert_eq!(platform::default_camera_index(1, true), 0);
        assert_eq!(platform::default_camera_index(0, true), 0);
        assert_eq!(platform::default_camera_index(0, false), 0);
    }

    #[test]
    fn test_mobile_chassis_detection() {
        assert!(platform::is_mobile_chassis("11\n"));
        assert!(platform::is_mobile_chassis("30"));
        assert!(!platform::is_mobile_chassis("3")); // Desktop
        assert!(!platform::is_mobile_chassis("9")); // Laptop
        assert!(!platform::is_mobile_chassis(""));
    }
}
