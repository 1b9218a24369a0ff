// SPDX-License-Identifier: MPL-2.0

//! Main application module for Fast QR
//!
//! This module contains the application state, message handling, UI rendering,
//! and business logic for the QR scanner.
//!
//! # Architecture
//!
//! - `state`: Application state types (AppModel, Message, ScanState)
//! - `menu`: Responsive menu bar
//! - `settings`: Settings drawer UI
//! - `view`: Main view rendering
//! - `update`: Message handling
//! - `handlers`: Message handlers by functional domain
//!
//! # Main Types
//!
//! - `AppModel`: Main application state with camera and scan management
//! - `Message`: All possible user interactions and system events
//! - `ScanState`: Lifecycle of a decoded scan result

mod handlers;
mod menu;
mod settings;
mod state;
mod update;
mod view;

use crate::config::Config;
use crate::constants::{platform, scan};
use crate::fl;
use cosmic::app::context_drawer;
use cosmic::cosmic_config::{self, CosmicConfigEntry};
use cosmic::iced::Subscription;
use cosmic::widget::{self, about::About};
use cosmic::{Element, Task};
pub use state::{AppModel, ContextPage, Message, ScanNotice, ScanState};
use std::sync::Arc;
use tracing::{error, info, warn};

const REPOSITORY: &str = "https://github.com/FreddyFunk/cosmic-fastqr";
const APP_ICON: &[u8] = include_bytes!(
    "../../resources/icons/hicolor/scalable/apps/io.github.freddyfunk.cosmic-fastqr.svg"
);

impl cosmic::Application for AppModel {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// Data that your application receives to its init method.
    type Flags = ();

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = "io.github.freddyfunk.cosmic-fastqr";

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(
        core: cosmic::Core,
        _flags: Self::Flags,
    ) -> (Self, Task<cosmic::Action<Self::Message>>) {
        // Create the about widget
        let about = About::default()
            .name(fl!("app-title"))
            .icon(widget::icon::from_svg_bytes(APP_ICON))
            .version(env!("GIT_VERSION"))
            .links([(fl!("repository"), REPOSITORY)])
            .license(env!("CARGO_PKG_LICENSE"));

        // Load configuration
        let (config_handler, config) =
            match cosmic_config::Config::new(Self::APP_ID, Config::VERSION) {
                Ok(handler) => {
                    let config = match Config::get_entry(&handler) {
                        Ok(config) => config,
                        Err((errors, config)) => {
                            error!(?errors, "Errors loading config");
                            config
                        }
                    };
                    (Some(handler), config)
                }
                Err(err) => {
                    error!(%err, "Failed to create config handler");
                    (None, Config::default())
                }
            };

        // Initialize GStreamer early (required before any GStreamer calls)
        // This is safe to do on the main thread as it's a one-time initialization
        if let Err(e) = gstreamer::init() {
            error!(error = %e, "Failed to initialize GStreamer");
        }

        // Create backend manager
        let backend_manager = crate::backends::camera::CameraBackendManager::new();

        // Construct the app model with the runtime's core.
        let app = AppModel {
            core,
            context_page: ContextPage::default(),
            about,
            config,
            config_handler,
            backend_manager: Some(backend_manager),
            camera_cancel_flag: std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false)),
            current_frame: None,
            preview_handle: None,
            available_cameras: Vec::new(),
            current_camera_index: 0,
            available_formats: Vec::new(),
            active_format: None,
            cameras_initialized: false,
            camera_dropdown_options: Vec::new(),
            scan: ScanState::default(),
            last_scan_time: None,
            scan_notice: None,
            countdown_epoch: 0,
            app_themes: vec![fl!("match-desktop"), fl!("dark"), fl!("light")],
        };

        // Enumerate cameras asynchronously (non-blocking)
        let last_camera_path = app.config.last_camera_path.clone();

        let init_task = Task::perform(
            async move {
                // Enumerate cameras (can be slow, especially with multiple devices)
                info!("Enumerating cameras asynchronously");
                let backend = crate::backends::camera::get_backend();
                let cameras = backend.enumerate_cameras();
                info!(count = cameras.len(), "Found camera(s)");

                // Find the last used camera or fall back to the platform default:
                // rear camera on handhelds, first camera otherwise
                let camera_index = if let Some(ref last_path) = last_camera_path {
                    info!(path = %last_path, "Attempting to restore last camera");
                    cameras
                        .iter()
                        .enumerate()
                        .find(|(_, cam)| &cam.path == last_path)
                        .map(|(idx, _)| {
                            info!(index = idx, "Found saved camera");
                            idx
                        })
                        .unwrap_or_else(|| {
                            info!("Saved camera not found, using platform default");
                            platform::default_camera_index(
                                cameras.len(),
                                platform::is_mobile_platform(),
                            )
                        })
                } else {
                    info!("No saved camera, using platform default");
                    platform::default_camera_index(cameras.len(), platform::is_mobile_platform())
                };

                // Get formats for selected camera
                let formats = match cameras.get(camera_index) {
                    Some(camera) if !camera.path.is_empty() => backend.get_formats(camera),
                    _ => Vec::new(),
                };

                (cameras, camera_index, formats)
            },
            |(cameras, index, formats)| {
                cosmic::Action::App(Message::CamerasInitialized(cameras, index, formats))
            },
        );

        (app, init_task)
    }

    /// Elements to pack at the start of the header bar.
    fn header_start(&self) -> Vec<Element<'_, Self::Message>> {
        vec![menu::menu_bar(self.core())]
    }

    /// Elements to pack at the end of the header bar.
    fn header_end(&self) -> Vec<Element<'_, Self::Message>> {
        vec![
            widget::button::icon(widget::icon::from_name("preferences-system-symbolic"))
                .on_press(Message::ToggleContextPage(ContextPage::Settings))
                .into(),
        ]
    }

    /// Display a context drawer if the context page is requested.
    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Self::Message>> {
        if !self.core.window.show_context {
            return None;
        }

        Some(match self.context_page {
            ContextPage::About => context_drawer::about(
                &self.about,
                |url| Message::LaunchUrl(url.to_string()),
                Message::ToggleContextPage(ContextPage::About),
            ),
            ContextPage::Settings => self.settings_view(),
        })
    }

    /// Describes the interface based on the current state of the application model.
    fn view(&self) -> Element<'_, Self::Message> {
        self.view()
    }

    /// Register subscriptions for this application.
    fn subscription(&self) -> Subscription<Self::Message> {
        use cosmic::iced::futures::{SinkExt, StreamExt};

        let config_sub = self
            .core()
            .watch_config::<Config>(Self::APP_ID)
            .map(|update| Message::UpdateConfig(update.config));

        // Get current camera device and format
        let current_camera = self
            .available_cameras
            .get(self.current_camera_index)
            .cloned();
        let camera_index = self.current_camera_index;
        let current_format = self.active_format.clone();
        let cancel_flag = Arc::clone(&self.camera_cancel_flag);

        // Create a unique ID based on format properties to trigger restart when format changes
        let format_id = current_format
            .as_ref()
            .map(|f| (f.width, f.height, f.framerate, f.pixel_format.clone()));

        // Include whether cameras are initialized in the subscription ID
        // This ensures the subscription restarts when cameras become available
        let cameras_initialized = !self.available_cameras.is_empty();

        let camera_sub = Subscription::run_with_id(
            (
                "camera",
                camera_index,
                format_id,
                cameras_initialized,
            ), // Camera restarts only when format_id or camera_index changes
            cosmic::iced::stream::channel(100, move |mut output| async move {
                info!(camera_index, "Camera subscription started (PipeWire)");

                let mut frame_count = 0u64;
                loop {
                    // Check cancel flag at the start of each loop iteration
                    // This prevents creating new pipelines after a camera switch
                    if cancel_flag.load(std::sync::atomic::Ordering::Acquire) {
                        info!("Cancel flag set - subscription loop exiting");
                        break;
                    }

                    // If no camera is available yet, just exit the subscription.
                    // It restarts when cameras become available (cameras_initialized
                    // flag changes).
                    let Some(device) = current_camera.clone() else {
                        info!(
                            "No camera available - subscription will restart when cameras are initialized"
                        );
                        break;
                    };

                    info!(name = %device.name, path = %device.path, "Creating camera");
                    if let Some(fmt) = &current_format {
                        info!(format = %fmt, "Using format");
                    }

                    // Give the previous pipeline time to clean up (50ms should be enough)
                    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

                    // Check cancel flag again after brief wait
                    if cancel_flag.load(std::sync::atomic::Ordering::Acquire) {
                        info!("Cancel flag set after cleanup wait - skipping");
                        break;
                    }

                    use crate::backends::camera::pipewire::PipeWirePipeline;

                    let (sender, mut receiver) = cosmic::iced::futures::channel::mpsc::channel(100);

                    let pipeline =
                        match PipeWirePipeline::new(&device, current_format.as_ref(), sender) {
                            Ok(pipeline) => {
                                info!("Pipeline created successfully");
                                pipeline
                            }
                            Err(e) => {
                                error!(error = %e, "Failed to initialize pipeline");
                                info!("Waiting 5 seconds before retry...");
                                tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
                                continue;
                            }
                        };

                    info!("Waiting for frames from pipeline...");
                    // Keep pipeline alive and forward frames
                    loop {
                        // Check cancel flag first (set when switching cameras)
                        if cancel_flag.load(std::sync::atomic::Ordering::Acquire) {
                            info!("Cancel flag set - camera subscription being cancelled");
                            break;
                        }

                        // Check if subscription is still active before processing next frame
                        if output.is_closed() {
                            info!("Output channel closed - camera subscription being cancelled");
                            break;
                        }

                        // Wait for next frame with a timeout to periodically check cancellation
                        match tokio::time::timeout(
                            tokio::time::Duration::from_millis(16),
                            receiver.next(),
                        )
                        .await
                        {
                            Ok(Some(frame)) => {
                                frame_count += 1;
                                // Frame latency from capture to subscription delivery
                                let latency_us = frame.captured_at.elapsed().as_micros();

                                if frame_count % 30 == 0 {
                                    info!(
                                        frame = frame_count,
                                        width = frame.width,
                                        height = frame.height,
                                        latency_ms = latency_us as f64 / 1000.0,
                                        "Received frame from pipeline"
                                    );
                                }

                                // Use try_send to avoid blocking the subscription when UI is busy
                                // Dropping frames is fine for live preview - we want the latest frame
                                if let Err(e) =
                                    output.try_send(Message::CameraFrame(Arc::new(frame)))
                                {
                                    warn!(
                                        frame = frame_count,
                                        error = ?e,
                                        "Frame dropped (UI channel full)"
                                    );
                                    // Check if channel is closed (subscription cancelled)
                                    if e.is_disconnected() {
                                        info!(
                                            "Output channel disconnected - camera subscription being cancelled"
                                        );
                                        break;
                                    }
                                }
                            }
                            Ok(None) => {
                                info!("Pipeline frame stream ended");
                                break;
                            }
                            Err(_) => {
                                // Timeout - continue loop to check if channel is closed
                                continue;
                            }
                        }
                    }
                    info!("Cleaning up pipeline");
                    // Pipeline will be dropped here, stopping the camera
                    drop(pipeline);
                }
            }),
        );

        // Camera hotplug monitoring subscription
        let backend_manager = self.backend_manager.clone();
        let current_cameras = self.available_cameras.clone();
        let hotplug_sub = Subscription::run_with_id(
            "camera_hotplug",
            cosmic::iced::stream::channel(10, move |mut output| async move {
                info!("Camera hotplug monitoring started");

                let mut last_cameras = current_cameras;

                // Only run if backend_manager is available
                let Some(backend_mgr) = backend_manager else {
                    warn!("No backend manager available for hotplug monitoring");
                    return;
                };

                loop {
                    // Wait 2 seconds between checks
                    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

                    // Enumerate current cameras
                    if let Ok(new_cameras) = backend_mgr.enumerate_cameras() {
                        // Check if camera list changed (different count or different cameras)
                        let cameras_changed = last_cameras.len() != new_cameras.len()
                            || !last_cameras.iter().all(|c| {
                                new_cameras
                                    .iter()
                                    .any(|nc| nc.path == c.path && nc.name == c.name)
                            });

                        if cameras_changed {
                            info!(
                                old_count = last_cameras.len(),
                                new_count = new_cameras.len(),
                                "Camera list changed - hotplug event detected"
                            );

                            last_cameras = new_cameras.clone();

                            // Send camera list changed message
                            if output
                                .send(Message::CameraListChanged(new_cameras))
                                .await
                                .is_err()
                            {
                                warn!(
                                    "Failed to send camera list changed message - channel closed"
                                );
                                break;
                            }
                        }
                    } else {
                        // No cameras available - treat as empty list
                        if !last_cameras.is_empty() {
                            info!("All cameras disconnected");
                            last_cameras = Vec::new();
                            if output
                                .send(Message::CameraListChanged(Vec::new()))
                                .await
                                .is_err()
                            {
                                warn!(
                                    "Failed to send camera list changed message - channel closed"
                                );
                                break;
                            }
                        }
                    }
                }
            }),
        );

        // QR scanning subscription, paced by the minimum scan interval.
        // Keyed on the frame capture time so each new frame gets one attempt;
        // the interval gate keeps decoding to at most ~10 frames per second.
        let should_scan = self
            .last_scan_time
            .map(|t| t.elapsed() >= scan::MIN_SCAN_INTERVAL)
            .unwrap_or(true);

        let scan_sub = match (should_scan, &self.current_frame) {
            (true, Some(frame)) => {
                let frame = frame.clone();
                Subscription::run_with_id(
                    ("qr_scan", frame.captured_at),
                    cosmic::iced::stream::channel(1, move |mut output| async move {
                        let scanner = crate::scanner::QrScanner::new();
                        let payload = scanner.scan(frame).await;
                        let _ = output.send(Message::ScanCompleted(payload)).await;
                    }),
                )
            }
            _ => Subscription::none(),
        };

        Subscription::batch([config_sub, camera_sub, hotplug_sub, scan_sub])
    }

    /// Handles messages emitted by the application and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        self.update(message)
    }
}
