// SPDX-License-Identifier: MPL-2.0

//! PipeWire GStreamer pipeline for camera capture
//!
//! Builds a pipewiresrc pipeline that delivers RGBA frames to an appsink.
//! Whatever the device produces (MJPEG, packed YUV, planar YUV) is decoded
//! and converted in the pipeline so every consumer downstream sees plain
//! RGBA with a single stride.

use super::super::types::*;
use crate::constants::{pipeline, timing};
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Maximum retries for pipeline creation (handles PipeWire race conditions)
const PIPELINE_CREATE_RETRIES: u32 = 5;
/// Delay between retries in milliseconds (long enough for a device switch)
const PIPELINE_RETRY_DELAY_MS: u64 = 500;

/// PipeWire camera pipeline
///
/// Owns the GStreamer pipeline for one capture session. Dropping the
/// pipeline sets it to Null, which stops every element and releases the
/// camera hardware.
pub struct PipeWirePipeline {
    pipeline: gstreamer::Pipeline,
    _appsink: AppSink,
}

impl PipeWirePipeline {
    /// Create a new PipeWire pipeline bound to `device`, delivering RGBA
    /// frames through `frame_sender`.
    pub fn new(
        device: &CameraDevice,
        format: Option<&CameraFormat>,
        frame_sender: FrameSender,
    ) -> BackendResult<Self> {
        info!(device = %device.name, format = ?format.map(|f| f.to_string()), "Creating PipeWire pipeline");

        gstreamer::init().map_err(|e| BackendError::InitializationFailed(e.to_string()))?;

        gstreamer::ElementFactory::find("pipewiresrc").ok_or_else(|| {
            BackendError::NotAvailable("pipewiresrc factory not found".to_string())
        })?;

        let device_path = if device.path.is_empty() {
            None
        } else {
            Some(device.path.as_str())
        };

        let pw_path_prop = determine_pipewire_path(device_path);
        let pipeline_str = build_pipeline_string(&pw_path_prop, format);

        // Launch with retries to ride out PipeWire node races around
        // device switches
        let mut last_error = None;
        let mut pipeline = None;
        for attempt in 1..=PIPELINE_CREATE_RETRIES {
            debug!(attempt, pipeline = %pipeline_str, "Attempting to launch pipeline");
            match try_launch_pipeline(&pipeline_str) {
                Ok(p) => {
                    pipeline = Some(p);
                    break;
                }
                Err(e) => {
                    if attempt < PIPELINE_CREATE_RETRIES {
                        warn!(
                            attempt,
                            max_attempts = PIPELINE_CREATE_RETRIES,
                            error = %e,
                            "Pipeline launch failed, retrying after {}ms",
                            PIPELINE_RETRY_DELAY_MS
                        );
                        std::thread::sleep(std::time::Duration::from_millis(
                            PIPELINE_RETRY_DELAY_MS,
                        ));
                    }
                    last_error = Some(e);
                }
            }
        }

        let pipeline = pipeline.ok_or_else(|| {
            BackendError::InitializationFailed(
                last_error.unwrap_or_else(|| "Pipeline creation failed".to_string()),
            )
        })?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| BackendError::InitializationFailed("Failed to get appsink".to_string()))?
            .dynamic_cast::<AppSink>()
            .map_err(|_| {
                BackendError::InitializationFailed("Failed to cast appsink".to_string())
            })?;

        appsink.set_property("emit-signals", true);
        appsink.set_property("sync", false); // Lowest latency
        appsink.set_property("max-buffers", pipeline::MAX_BUFFERS);
        appsink.set_property("drop", true); // Drop old frames if the scanner is slow
        appsink.set_property("enable-last-sample", false);

        appsink.set_callbacks(
            gstreamer_app::AppSinkCallbacks::builder()
                .new_sample(move |appsink| {
                    let frame_start = Instant::now();
                    let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);

                    let sample = appsink.pull_sample().map_err(|e| {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            error!(frame = frame_num, error = ?e, "Failed to pull sample");
                        }
                        gstreamer::FlowError::Eos
                    })?;

                    let caps = sample.caps().ok_or_else(|| {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            error!(frame = frame_num, "No caps in sample");
                        }
                        gstreamer::FlowError::Error
                    })?;

                    let video_info = VideoInfo::from_caps(caps).map_err(|e| {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            error!(frame = frame_num, error = ?e, "Failed to get video info");
                        }
                        gstreamer::FlowError::Error
                    })?;

                    let buffer = sample
                        .buffer_owned()
                        .ok_or(gstreamer::FlowError::Error)?;

                    // Incomplete DMA transfers mark the buffer corrupted;
                    // skip such frames instead of decoding garbage
                    if buffer.flags().contains(gstreamer::BufferFlags::CORRUPTED) {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            warn!(frame = frame_num, "Buffer marked as corrupted, skipping frame");
                        }
                        return Err(gstreamer::FlowError::Error);
                    }

                    let map = buffer
                        .into_mapped_buffer_readable()
                        .map_err(|_| gstreamer::FlowError::Error)?;

                    let frame = CameraFrame {
                        width: video_info.width(),
                        height: video_info.height(),
                        data: FrameData::from_mapped_buffer(map),
                        stride: video_info.stride()[0] as u32,
                        captured_at: frame_start,
                    };

                    // Non-blocking send; dropping frames is fine for a live
                    // scanner, the next tick wants the latest frame anyway
                    let mut sender = frame_sender.clone();
                    if let Err(e) = sender.try_send(frame)
                        && frame_num % timing::FRAME_LOG_INTERVAL == 0
                    {
                        debug!(frame = frame_num, error = ?e, "Frame dropped (channel full)");
                    }

                    Ok(gstreamer::FlowSuccess::Ok)
                })
                .build(),
        );

        pipeline.set_state(gstreamer::State::Playing).map_err(|e| {
            BackendError::InitializationFailed(format!("Failed to start pipeline: {}", e))
        })?;

        let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(result = ?result, state = ?state, pending = ?pending, "Pipeline state");
        if state != gstreamer::State::Playing {
            warn!("Pipeline is not in PLAYING state yet");
        }

        info!("PipeWire camera initialization complete");

        Ok(Self {
            pipeline,
            _appsink: appsink,
        })
    }

    /// Stop the pipeline and release the camera
    pub fn stop(self) -> BackendResult<()> {
        info!("Stopping PipeWire pipeline");

        // Clear appsink callbacks to release all references
        self._appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());

        // Null state stops every element and releases the device
        self.pipeline
            .set_state(gstreamer::State::Null)
            .map_err(|e| BackendError::Other(format!("Failed to stop pipeline: {}", e)))?;

        let (result, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::STOP_TIMEOUT_SECS,
        ));
        match result {
            Ok(_) => {
                info!(state = ?state, "PipeWire pipeline stopped successfully");
            }
            Err(e) => {
                debug!(error = ?e, state = ?state, "Pipeline state change had issues");
            }
        }

        Ok(())
    }
}

impl Drop for PipeWirePipeline {
    fn drop(&mut self) {
        info!("Dropping PipeWire pipeline - explicitly stopping");
        self._appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        // Null releases the device immediately
        let _ = self.pipeline.set_state(gstreamer::State::Null);
        info!("PipeWire pipeline stopped");
    }
}

/// Determine PipeWire path property from device path
fn determine_pipewire_path(device_path: Option<&str>) -> String {
    let Some(dev_path) = device_path else {
        info!("Using default PipeWire camera");
        return String::new();
    };

    if dev_path.is_empty() {
        // Empty path = PipeWire auto-select default camera
        info!("Using default PipeWire camera (auto-select)");
        String::new()
    } else if dev_path.starts_with("pipewire-serial-") {
        let serial = dev_path
            .strip_prefix("pipewire-serial-")
            .unwrap_or(dev_path);
        info!(serial, "Using PipeWire object.serial");
        format!("target-object={} ", serial)
    } else if dev_path.starts_with("pipewire-") {
        let node_id = dev_path.strip_prefix("pipewire-").unwrap_or(dev_path);
        info!(node_id, "Using PipeWire node ID");
        format!("target-object={} ", node_id)
    } else if dev_path.starts_with("/dev/video") {
        // V4L2 device exposed through PipeWire
        info!(dev_path, "Using V4L2 device via PipeWire");
        format!("path=v4l2:{} ", dev_path)
    } else {
        warn!(dev_path, "Unknown device path format, using path property");
        format!("path={} ", dev_path)
    }
}

/// Build the GStreamer pipeline string for a device format.
///
/// Every branch ends in `videoconvert ! video/x-raw,format=RGBA` so the
/// appsink always hands out RGBA regardless of what the sensor produces.
fn build_pipeline_string(pw_path_prop: &str, format: Option<&CameraFormat>) -> String {
    let Some(format) = format else {
        // No format selected: let PipeWire negotiate, decode if needed
        info!("No format specified: using decodebin with RGBA output");
        return format!(
            "pipewiresrc {}do-timestamp=true ! decodebin ! \
             videoconvert n-threads={} ! video/x-raw,format=RGBA ! appsink name=sink",
            pw_path_prop,
            pipeline::videoconvert_threads()
        );
    };

    let caps_filter = match format.framerate {
        Some(fps) => format!(
            "width=(int){},height=(int){},framerate=(fraction){}",
            format.width,
            format.height,
            fps.as_gst_fraction()
        ),
        None => format!("width=(int){},height=(int){}", format.width, format.height),
    };

    match format.pixel_format.as_str() {
        "MJPG" | "MJPEG" => {
            let decoder = select_mjpeg_decoder();
            info!(decoder = %decoder, "MJPEG pipeline with RGBA output");
            format!(
                "pipewiresrc {}do-timestamp=true ! \
                 queue max-size-buffers={} leaky=downstream ! \
                 image/jpeg,{} ! \
                 jpegparse ! \
                 {} ! \
                 videoconvert n-threads={} ! video/x-raw,format=RGBA ! \
                 appsink name=sink",
                pw_path_prop,
                pipeline::MAX_BUFFERS,
                caps_filter,
                decoder,
                pipeline::videoconvert_threads()
            )
        }
        "H264" | "H265" | "HEVC" => {
            // Rare for webcams; decodebin picks a parser/decoder pair
            info!(format = %format.pixel_format, "Compressed pipeline via decodebin");
            format!(
                "pipewiresrc {}do-timestamp=true ! decodebin ! \
                 videoconvert n-threads={} ! video/x-raw,format=RGBA ! appsink name=sink",
                pw_path_prop,
                pipeline::videoconvert_threads()
            )
        }
        raw => {
            // GStreamer names YUYV "YUY2"
            let gst_fmt = if raw == "YUYV" { "YUY2" } else { raw };
            info!(format = gst_fmt, "Raw pipeline with RGBA conversion");
            format!(
                "pipewiresrc {}do-timestamp=true ! \
                 video/x-raw,format={},{} ! \
                 videoconvert n-threads={} ! video/x-raw,format=RGBA ! \
                 appsink name=sink",
                pw_path_prop,
                gst_fmt,
                caps_filter,
                pipeline::videoconvert_threads()
            )
        }
    }
}

/// Pick the best available MJPEG decoder element.
///
/// Hardware decoders first (VA-API, NVDEC, V4L2), then the GStreamer and
/// FFmpeg software decoders.
fn select_mjpeg_decoder() -> &'static str {
    let candidates = [
        ("vaapijpegdec", "VA-API JPEG decoder"),
        ("nvjpegdec", "NVIDIA JPEG decoder"),
        ("v4l2jpegdec", "V4L2 JPEG decoder"),
        ("jpegdec", "GStreamer software JPEG decoder"),
        ("avdec_mjpeg", "FFmpeg software MJPEG decoder"),
    ];

    for (decoder, desc) in candidates {
        if gstreamer::ElementFactory::find(decoder).is_some() {
            debug!(decoder, desc, "Selected MJPEG decoder");
            return decoder;
        }
    }

    // Nothing probed successfully; jpegdec ships with gst-plugins-good
    // so the launch error will name the real problem
    warn!("No MJPEG decoder found, defaulting to jpegdec");
    "jpegdec"
}

/// Try to launch a pipeline and check the bus for detailed errors
fn try_launch_pipeline(pipeline_str: &str) -> Result<gstreamer::Pipeline, String> {
    let parsed = gstreamer::parse::launch(pipeline_str).map_err(|e| {
        error!(error = %e, pipeline = %pipeline_str, "Failed to parse pipeline");
        e.to_string()
    })?;

    let pipeline = parsed
        .dynamic_cast::<gstreamer::Pipeline>()
        .map_err(|_| "Failed to cast to pipeline".to_string())?;

    match pipeline.set_state(gstreamer::State::Playing) {
        Ok(_) => {
            let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_mseconds(
                timing::STATE_CHANGE_TIMEOUT_MS,
            ));

            if result.is_ok() && state == gstreamer::State::Playing {
                debug!(?state, "Pipeline reached PLAYING");
                Ok(pipeline)
            } else if matches!(result, Ok(gstreamer::StateChangeSuccess::Async))
                && pending == gstreamer::State::Playing
            {
                // Async transition; frames arrive once the device is ready
                debug!(?state, ?pending, "Pipeline transitioning asynchronously");
                Ok(pipeline)
            } else {
                error!(?state, ?result, ?pending, "Pipeline failed to reach PLAYING");
                check_bus_for_errors(&pipeline);
                let _ = pipeline.set_state(gstreamer::State::Null);
                // Wait for Null so GStreamer releases all buffers
                let _ = pipeline.state(gstreamer::ClockTime::from_seconds(2));
                Err(format!(
                    "Pipeline failed to start (state: {:?}, result: {:?})",
                    state, result
                ))
            }
        }
        Err(e) => {
            error!(error = %e, "Failed to set pipeline to PLAYING state");
            check_bus_for_errors(&pipeline);
            let _ = pipeline.set_state(gstreamer::State::Null);
            let _ = pipeline.state(gstreamer::ClockTime::from_seconds(2));
            Err(format!("Failed to set pipeline to PLAYING: {}", e))
        }
    }
}

/// Check bus for error messages
fn check_bus_for_errors(pipeline: &gstreamer::Pipeline) {
    if let Some(bus) = pipeline.bus()
        && let Some(msg) = bus.timed_pop_filtered(
            gstreamer::ClockTime::from_mseconds(100),
            &[
                gstreamer::MessageType::Error,
                gstreamer::MessageType::Warning,
            ],
        )
    {
        match msg.view() {
            gstreamer::MessageView::Error(err) => {
                error!(
                    error = %err.error(),
                    debug = ?err.debug(),
                    source = ?err.src().map(|s| s.name()),
                    "GStreamer ERROR during pipeline start"
                );
            }
            gstreamer::MessageView::Warning(warn_msg) => {
                warn!(
                    warning = %warn_msg.error(),
                    debug = ?warn_msg.debug(),
                    "GStreamer WARNING during pipeline start"
                );
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_pipewire_path() {
        assert_eq!(determine_pipewire_path(None), "");
        assert_eq!(determine_pipewire_path(Some("")), "");
        assert_eq!(
            determine_pipewire_path(Some("pipewire-serial-2146")),
            "target-object=2146 "
        );
        assert_eq!(
            determine_pipewire_path(Some("pipewire-76")),
            "target-object=76 "
        );
        assert_eq!(
            determine_pipewire_path(Some("/dev/video0")),
            "path=v4l2:/dev/video0 "
        );
    }

    #[test]
    fn test_pipeline_string_always_outputs_rgba() {
        let mjpg = CameraFormat {
            width: 1280,
            height: 720,
            framerate: Some(Framerate::from_int(30)),
            pixel_format: "MJPG".to_string(),
        };
        let raw = CameraFormat {
            width: 640,
            height: 480,
            framerate: None,
            pixel_format: "YUYV".to_string(),
        };

        for format in [Some(&mjpg), Some(&raw), None] {
            let s = build_pipeline_string("", format);
            assert!(
                s.contains("video/x-raw,format=RGBA"),
                "pipeline must convert to RGBA: {}",
                s
            );
            assert!(s.ends_with("appsink name=sink"), "appsink must be named");
        }
    }

    #[test]
    fn test_pipeline_string_maps_yuyv_to_yuy2() {
        let format = CameraFormat {
            width: 640,
            height: 480,
            framerate: Some(Framerate::from_int(30)),
            pixel_format: "YUYV".to_string(),
        };
        let s = build_pipeline_string("target-object=1 ", Some(&format));
        assert!(s.contains("format=YUY2"), "YUYV must map to YUY2: {}", s);
        assert!(s.contains("framerate=(fraction)30/1"));
    }
}
