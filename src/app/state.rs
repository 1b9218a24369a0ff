// SPDX-License-Identifier: GPL-3.0-only

//! Application state and message types
//!
//! Defines the main application model, the message enum, and the scan result
//! state machine shared by handlers and views.

use crate::backends::camera::CameraBackendManager;
use crate::backends::camera::types::{CameraDevice, CameraFormat, CameraFrame};
use crate::config::Config;
use crate::constants::redirect;
use cosmic::cosmic_config;
use cosmic::widget::about::About;
use std::sync::Arc;
use std::time::Instant;

/// Identifies a page shown in the context drawer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ContextPage {
    #[default]
    About,
    Settings,
}

/// Short-lived notice overlaid on the preview.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScanNotice {
    /// A new QR code was just decoded.
    Detected,
    /// The displayed payload was copied to the clipboard.
    Copied,
}

/// Lifecycle of a decoded scan result.
///
/// `Idle` means no result panel is open. `Shown` holds the decoded payload
/// and, when the payload is a link and auto-open is enabled, a countdown in
/// whole seconds. `Redirecting` is entered once the link is opened, either by
/// the countdown running out or by the user pressing the open button.
///
/// Every entry into `Shown` gets a fresh countdown, including a payload that
/// was displayed and dismissed earlier.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum ScanState {
    #[default]
    Idle,
    Shown {
        payload: String,
        link: Option<String>,
        countdown: Option<u8>,
    },
    Redirecting {
        payload: String,
        link: String,
    },
}

impl ScanState {
    /// Enter `Shown` for a freshly decoded payload.
    ///
    /// The countdown starts at `redirect::COUNTDOWN_START_SECS` only when the
    /// payload classified as a link and auto-open is enabled. Plain text
    /// results never count down.
    pub fn show(&mut self, payload: String, link: Option<String>, auto_open: bool) {
        let countdown = (auto_open && link.is_some()).then_some(redirect::COUNTDOWN_START_SECS);
        *self = ScanState::Shown {
            payload,
            link,
            countdown,
        };
    }

    /// Advance a running countdown by one second.
    ///
    /// Returns the link to open once the countdown reaches zero, moving to
    /// `Redirecting`. Returns `None` while seconds remain or when no
    /// countdown is active.
    pub fn tick(&mut self) -> Option<String> {
        let ScanState::Shown {
            payload,
            link: Some(link),
            countdown: Some(count),
        } = self
        else {
            return None;
        };

        *count = count.saturating_sub(1);
        if *count > 0 {
            return None;
        }

        let payload = std::mem::take(payload);
        let link = std::mem::take(link);
        *self = ScanState::Redirecting {
            payload,
            link: link.clone(),
        };
        Some(link)
    }

    /// Open the link immediately, cancelling any running countdown.
    ///
    /// Returns `None` when the displayed payload is not a link.
    pub fn open_now(&mut self) -> Option<String> {
        let ScanState::Shown {
            payload,
            link: Some(link),
            ..
        } = self
        else {
            return None;
        };

        let payload = std::mem::take(payload);
        let link = std::mem::take(link);
        *self = ScanState::Redirecting {
            payload,
            link: link.clone(),
        };
        Some(link)
    }

    /// Close the result panel and drop any pending redirect.
    pub fn dismiss(&mut self) {
        *self = ScanState::Idle;
    }

    /// Whether a result panel is open (`Shown` or `Redirecting`).
    pub fn is_open(&self) -> bool {
        !matches!(self, ScanState::Idle)
    }

    /// The payload currently displayed, if any.
    pub fn payload(&self) -> Option<&str> {
        match self {
            ScanState::Idle => None,
            ScanState::Shown { payload, .. } | ScanState::Redirecting { payload, .. } => {
                Some(payload)
            }
        }
    }

    /// The link target of the displayed payload, if it classified as one.
    pub fn link(&self) -> Option<&str> {
        match self {
            ScanState::Idle => None,
            ScanState::Shown { link, .. } => link.as_deref(),
            ScanState::Redirecting { link, .. } => Some(link),
        }
    }

    /// Seconds remaining before auto-open, if a countdown is running.
    pub fn countdown(&self) -> Option<u8> {
        match self {
            ScanState::Shown { countdown, .. } => *countdown,
            _ => None,
        }
    }
}

/// Main application state
pub struct AppModel {
    // ===== Core Application State =====
    /// COSMIC runtime core
    pub core: cosmic::Core,
    /// Currently active context drawer page
    pub context_page: ContextPage,
    /// About page widget
    pub about: About,
    /// Application configuration
    pub config: Config,
    /// Configuration handler for persistence
    pub config_handler: Option<cosmic_config::Config>,

    // ===== Camera Management =====
    /// Backend manager for camera enumeration
    pub backend_manager: Option<CameraBackendManager>,
    /// Cancel flag for the active camera subscription loop
    pub camera_cancel_flag: Arc<std::sync::atomic::AtomicBool>,
    /// Most recent camera frame, kept for the scan subscription
    pub current_frame: Option<Arc<CameraFrame>>,
    /// Cached image handle for the preview, rebuilt per frame
    pub preview_handle: Option<cosmic::widget::image::Handle>,
    /// All cameras found during enumeration
    pub available_cameras: Vec<CameraDevice>,
    /// Index into `available_cameras` of the active camera
    pub current_camera_index: usize,
    /// Formats reported by the active camera
    pub available_formats: Vec<CameraFormat>,
    /// Format the pipeline is currently negotiating
    pub active_format: Option<CameraFormat>,
    /// Set once the initial async enumeration has completed
    pub cameras_initialized: bool,
    /// Camera names for the settings dropdown
    pub camera_dropdown_options: Vec<String>,

    // ===== QR Scanning =====
    /// Scan result state machine
    pub scan: ScanState,
    /// Completion time of the last scan attempt, successful or not
    pub last_scan_time: Option<Instant>,
    /// Transient notice overlaid on the preview
    pub scan_notice: Option<ScanNotice>,
    /// Generation counter for countdown tick chains. Bumped whenever a new
    /// result is shown or the panel is dismissed so stale delayed ticks are
    /// ignored.
    pub countdown_epoch: u32,

    // ===== Settings =====
    /// Theme names for the appearance dropdown
    pub app_themes: Vec<String>,
}

impl AppModel {
    /// True once enumeration finished without finding any camera.
    ///
    /// Distinguishes "no camera attached" from "still enumerating" so the
    /// view can show the right hint.
    pub fn camera_unavailable(&self) -> bool {
        self.cameras_initialized && self.available_cameras.is_empty()
    }
}

/// Messages emitted by the application and its widgets.
#[derive(Debug, Clone)]
pub enum Message {
    // ===== UI Navigation =====
    /// Open a URL from the about page
    LaunchUrl(String),
    /// Toggle a context drawer page
    ToggleContextPage(ContextPage),
    /// Forward a surface action to the runtime (used by the menu bar)
    Surface(cosmic::surface::Action),

    // ===== Camera Control =====
    /// Cycle to the next available camera
    SwitchCamera,
    /// Select a specific camera by index
    SelectCamera(usize),
    /// A new frame arrived from the pipeline
    CameraFrame(Arc<CameraFrame>),
    /// Async camera enumeration completed
    CamerasInitialized(Vec<CameraDevice>, usize, Vec<CameraFormat>),
    /// Hotplug monitoring detected a changed camera list
    CameraListChanged(Vec<CameraDevice>),

    // ===== QR Scanning =====
    /// The preview was tapped; decode the current frame right away
    ScanNow,
    /// A scan attempt finished, with the decoded payload if any
    ScanCompleted(Option<String>),
    /// Clear the transient detection/copy notice
    ClearScanNotice,
    /// One second of the redirect countdown elapsed. Carries the epoch the
    /// tick chain was armed with.
    CountdownTick(u32),
    /// Open the displayed link now
    OpenLink,
    /// Copy the displayed payload to the clipboard
    CopyPayload,
    /// Close the result panel
    DismissResult,

    // ===== Settings =====
    /// Configuration changed on disk
    UpdateConfig(Config),
    /// Theme selected in settings
    SetAppTheme(usize),
    /// Toggle automatic opening of link results
    ToggleAutoOpenLinks,

    /// No-op message for fire-and-forget tasks
    Noop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_link_with_auto_open_starts_countdown() {
        let mut scan = ScanState::default();
        scan.show(
            "https://example.com".into(),
            Some("https://example.com".into()),
            true,
        );
        assert_eq!(scan.countdown(), Some(redirect::COUNTDOWN_START_SECS));
        assert_eq!(scan.payload(), Some("https://example.com"));
        assert!(scan.is_open());
    }

    #[test]
    fn test_show_link_without_auto_open_has_no_countdown() {
        let mut scan = ScanState::default();
        scan.show(
            "https://example.com".into(),
            Some("https://example.com".into()),
            false,
        );
        assert_eq!(scan.countdown(), None);
        assert_eq!(scan.link(), Some("https://example.com"));
    }

    #[test]
    fn test_text_payload_never_counts_down() {
        let mut scan = ScanState::default();
        scan.show("hello world".into(), None, true);
        assert_eq!(scan.countdown(), None);

        // Stray ticks must not do anything either
        for _ in 0..10 {
            assert_eq!(scan.tick(), None);
        }
        assert_eq!(scan.payload(), Some("hello world"));
        assert_eq!(scan.link(), None);
    }

    #[test]
    fn test_countdown_fires_after_five_ticks() {
        let mut scan = ScanState::default();
        scan.show(
            "https://example.com".into(),
            Some("https://example.com".into()),
            true,
        );

        // 5 -> 4 -> 3 -> 2 -> 1, still waiting
        for remaining in (1..=4u8).rev() {
            assert_eq!(scan.tick(), None);
            assert_eq!(scan.countdown(), Some(remaining));
        }

        // Fifth tick reaches zero and yields the link
        assert_eq!(scan.tick(), Some("https://example.com".to_string()));
        assert!(matches!(scan, ScanState::Redirecting { .. }));
        assert_eq!(scan.countdown(), None);
        assert_eq!(scan.link(), Some("https://example.com"));
    }

    #[test]
    fn test_dismiss_cancels_redirect_and_next_result_restarts_fresh() {
        let mut scan = ScanState::default();
        scan.show(
            "https://example.com".into(),
            Some("https://example.com".into()),
            true,
        );

        // Burn two seconds, then dismiss
        scan.tick();
        scan.tick();
        assert_eq!(scan.countdown(), Some(3));
        scan.dismiss();
        assert_eq!(scan, ScanState::Idle);
        assert_eq!(scan.tick(), None);

        // The next result starts over at the full countdown
        scan.show(
            "https://other.org".into(),
            Some("https://other.org".into()),
            true,
        );
        assert_eq!(scan.countdown(), Some(redirect::COUNTDOWN_START_SECS));
    }

    #[test]
    fn test_open_now_skips_countdown() {
        let mut scan = ScanState::default();
        scan.show(
            "example.com".into(),
            Some("https://example.com".into()),
            true,
        );
        assert_eq!(scan.open_now(), Some("https://example.com".to_string()));
        assert!(matches!(scan, ScanState::Redirecting { .. }));

        // Opening again is a no-op once redirecting
        assert_eq!(scan.open_now(), None);
    }

    #[test]
    fn test_open_now_on_text_payload_is_noop() {
        let mut scan = ScanState::default();
        scan.show("WIFI:S:net;;".into(), None, true);
        assert_eq!(scan.open_now(), None);
        assert!(matches!(scan, ScanState::Shown { .. }));
    }

    #[test]
    fn test_new_result_replaces_displayed_one() {
        let mut scan = ScanState::default();
        scan.show("first".into(), None, true);
        scan.show(
            "https://second.example".into(),
            Some("https://second.example".into()),
            true,
        );
        assert_eq!(scan.payload(), Some("https://second.example"));
        assert_eq!(scan.countdown(), Some(redirect::COUNTDOWN_START_SECS));
    }
}
