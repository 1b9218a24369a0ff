// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! This module handles all application messages by routing them to focused handler methods.
//! The main `update()` function acts as a dispatcher, while specific handlers are implemented
//! in the `handlers` submodules organized by functional domain.
//!
//! # Handler Modules
//!
//! - `handlers::ui`: Context drawer, settings, theme, external URLs
//! - `handlers::camera`: Camera selection, frame handling, hotplug
//! - `handlers::scan`: Scan results, redirect countdown, clipboard

use crate::app::state::{AppModel, Message};
use cosmic::Task;

impl AppModel {
    /// Main message handler - routes messages to appropriate handler methods.
    ///
    /// This dispatcher pattern keeps the main update function clean and makes
    /// it easy to find the handling code for any message type.
    pub fn update(&mut self, message: Message) -> Task<cosmic::Action<Message>> {
        match message {
            // ===== UI Navigation =====
            Message::LaunchUrl(url) => self.handle_launch_url(url),
            Message::ToggleContextPage(page) => self.handle_toggle_context_page(page),
            Message::Surface(action) => cosmic::task::message(cosmic::Action::Cosmic(
                cosmic::app::cosmic::Message::Surface(action),
            )),

            // ===== Camera Control =====
            Message::SwitchCamera => self.handle_switch_camera(),
            Message::SelectCamera(index) => self.handle_select_camera(index),
            Message::CameraFrame(frame) => self.handle_camera_frame(frame),
            Message::CamerasInitialized(cameras, index, formats) => {
                self.handle_cameras_initialized(cameras, index, formats)
            }
            Message::CameraListChanged(cameras) => self.handle_camera_list_changed(cameras),

            // ===== QR Scanning =====
            Message::ScanNow => self.handle_scan_now(),
            Message::ScanCompleted(payload) => self.handle_scan_completed(payload),
            Message::ClearScanNotice => self.handle_clear_scan_notice(),
            Message::CountdownTick(epoch) => self.handle_countdown_tick(epoch),
            Message::OpenLink => self.handle_open_link(),
            Message::CopyPayload => self.handle_copy_payload(),
            Message::DismissResult => self.handle_dismiss_result(),

            // ===== Settings =====
            Message::UpdateConfig(config) => self.handle_update_config(config),
            Message::SetAppTheme(index) => self.handle_set_app_theme(index),
            Message::ToggleAutoOpenLinks => self.handle_toggle_auto_open_links(),

            Message::Noop => Task::none(),
        }
    }
}
