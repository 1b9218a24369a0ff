// SPDX-License-Identifier: GPL-3.0-only

//! Scan result handlers
//!
//! Handles decoded QR payloads, the redirect countdown, clipboard copy,
//! and dismissal of the result panel.

use crate::app::state::{AppModel, Message, ScanNotice};
use crate::constants::{redirect, scan};
use crate::scanner::{QrScanner, ScanAction};
use cosmic::Task;
use cosmic::cosmic_config::CosmicConfigEntry;
use tracing::{debug, error, info};

impl AppModel {
    // =========================================================================
    // Scan Result Handlers
    // =========================================================================

    /// Create a delayed task that sends a message after the specified milliseconds
    pub(crate) fn delay_task(millis: u64, message: Message) -> Task<cosmic::Action<Message>> {
        Task::perform(
            async move {
                tokio::time::sleep(tokio::time::Duration::from_millis(millis)).await;
                message
            },
            cosmic::Action::App,
        )
    }

    /// The preview was tapped; decode the current frame without waiting
    /// out the scan interval.
    ///
    /// The result flows through the normal completion path, so dedup and
    /// notice behavior match a timed scan.
    pub(crate) fn handle_scan_now(&mut self) -> Task<cosmic::Action<Message>> {
        let Some(frame) = self.current_frame.clone() else {
            return Task::none();
        };
        if !frame.is_ready() {
            return Task::none();
        }

        debug!("Manual scan requested");
        // Close the pacing gate so the scan subscription skips this frame
        self.last_scan_time = Some(std::time::Instant::now());
        Task::perform(
            async move {
                let scanner = QrScanner::new();
                scanner.scan(frame).await
            },
            |payload| cosmic::Action::App(Message::ScanCompleted(payload)),
        )
    }

    /// A scan attempt finished.
    ///
    /// Failed attempts only refresh the pacing timestamp so the next frame
    /// can be tried; the loop itself never stops. A decoded payload is
    /// published unless it matches the one currently displayed, which keeps
    /// a code sitting in front of the camera from re-triggering every
    /// interval while its result is open.
    pub(crate) fn handle_scan_completed(
        &mut self,
        payload: Option<String>,
    ) -> Task<cosmic::Action<Message>> {
        self.last_scan_time = Some(std::time::Instant::now());

        let Some(content) = payload else {
            return Task::none();
        };

        if self.scan.payload() == Some(content.as_str()) {
            debug!("Decoded payload matches displayed result, skipping");
            return Task::none();
        }

        let action = ScanAction::classify(&content);
        let link = action.link().map(str::to_string);
        info!(
            length = content.len(),
            is_link = link.is_some(),
            "QR code decoded"
        );

        self.scan
            .show(content, link, self.config.auto_open_links);
        self.scan_notice = Some(ScanNotice::Detected);
        // Invalidate any tick chain left over from the previous result
        self.countdown_epoch = self.countdown_epoch.wrapping_add(1);

        let notice_task = Self::delay_task(scan::SUCCESS_NOTICE_MS, Message::ClearScanNotice);
        if self.scan.countdown().is_some() {
            let tick_task = Self::delay_task(
                redirect::COUNTDOWN_TICK_MS,
                Message::CountdownTick(self.countdown_epoch),
            );
            return Task::batch([notice_task, tick_task]);
        }
        notice_task
    }

    /// One second of the redirect countdown elapsed.
    ///
    /// Ticks from a superseded result carry a stale epoch and are dropped.
    /// The chain re-arms itself until the countdown runs out or the state
    /// stops carrying one (dismissed, replaced by a text result, opened
    /// manually).
    pub(crate) fn handle_countdown_tick(&mut self, epoch: u32) -> Task<cosmic::Action<Message>> {
        if epoch != self.countdown_epoch {
            debug!(epoch, current = self.countdown_epoch, "Stale countdown tick");
            return Task::none();
        }

        if let Some(link) = self.scan.tick() {
            info!(url = %link, "Countdown elapsed, opening link");
            match open::that_detached(&link) {
                Ok(()) => {
                    info!("Link opened successfully");
                }
                Err(err) => {
                    error!(url = %link, error = %err, "Failed to open link");
                }
            }
            return Task::none();
        }

        if self.scan.countdown().is_some() {
            return Self::delay_task(
                redirect::COUNTDOWN_TICK_MS,
                Message::CountdownTick(epoch),
            );
        }
        Task::none()
    }

    pub(crate) fn handle_open_link(&mut self) -> Task<cosmic::Action<Message>> {
        let Some(link) = self.scan.open_now() else {
            return Task::none();
        };

        info!(url = %link, "Opening link from result panel");
        match open::that_detached(&link) {
            Ok(()) => {
                info!("Link opened successfully");
            }
            Err(err) => {
                error!(url = %link, error = %err, "Failed to open link");
            }
        }
        Task::none()
    }

    pub(crate) fn handle_copy_payload(&mut self) -> Task<cosmic::Action<Message>> {
        let Some(payload) = self.scan.payload() else {
            return Task::none();
        };
        let payload = payload.to_string();

        info!(length = payload.len(), "Copying scan result to clipboard");
        self.scan_notice = Some(ScanNotice::Copied);

        // Use iced/cosmic clipboard API - works in both native and flatpak
        Task::batch([
            cosmic::iced::clipboard::write(payload).map(|_: ()| cosmic::Action::App(Message::Noop)),
            Self::delay_task(scan::SUCCESS_NOTICE_MS, Message::ClearScanNotice),
        ])
    }

    pub(crate) fn handle_dismiss_result(&mut self) -> Task<cosmic::Action<Message>> {
        info!("Dismissing scan result");
        self.scan.dismiss();
        // Kill any in-flight countdown tick for the dismissed result
        self.countdown_epoch = self.countdown_epoch.wrapping_add(1);
        Task::none()
    }

    pub(crate) fn handle_clear_scan_notice(&mut self) -> Task<cosmic::Action<Message>> {
        self.scan_notice = None;
        Task::none()
    }

    // =========================================================================
    // Settings Handlers
    // =========================================================================

    pub(crate) fn handle_toggle_auto_open_links(&mut self) -> Task<cosmic::Action<Message>> {
        self.config.auto_open_links = !self.config.auto_open_links;
        info!(
            auto_open_links = self.config.auto_open_links,
            "Auto-open links toggled"
        );

        if let Some(handler) = self.config_handler.as_ref()
            && let Err(err) = self.config.write_entry(handler)
        {
            error!(?err, "Failed to save auto-open setting");
        }
        Task::none()
    }
}
