// SPDX-License-Identifier: GPL-3.0-only

//! QR code scanning
//!
//! This module decodes QR codes from camera frames using the rqrr crate.
//! Frames are converted to grayscale and downscaled before detection,
//! returning the decoded payload of the first readable symbol.

pub mod classify;

pub use classify::ScanAction;

use crate::backends::camera::types::CameraFrame;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// QR code scanner
///
/// Analyzes camera frames to detect and decode QR codes.
/// Optimized for real-time processing with frame downscaling.
pub struct QrScanner {
    /// Maximum dimension for processing (frames are downscaled to this)
    max_dimension: u32,
}

impl Default for QrScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl QrScanner {
    /// Create a new QR scanner with default settings
    pub fn new() -> Self {
        Self {
            // Process at 640px max for better performance
            // QR codes are typically large enough to be detected at this resolution
            max_dimension: 640,
        }
    }

    /// Create a QR scanner with custom max dimension
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    /// Decode the first readable QR code in a camera frame
    ///
    /// This is an async-friendly method that performs CPU-intensive work.
    /// The frame is detached from its GStreamer buffer first so the buffer
    /// can return to the pipeline pool while the blocking decode runs.
    pub async fn scan(&self, frame: Arc<CameraFrame>) -> Option<String> {
        let max_dim = self.max_dimension;
        let frame = frame.to_copied();

        // Run detection in a blocking task to avoid blocking the async runtime
        tokio::task::spawn_blocking(move || scan_sync(&frame, max_dim))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "QR scan task panicked");
                None
            })
    }
}

/// Synchronous QR decode (runs in blocking task)
fn scan_sync(frame: &CameraFrame, max_dimension: u32) -> Option<String> {
    // Streams deliver zero-dimension frames while warming up
    if !frame.is_ready() {
        return None;
    }

    let start = std::time::Instant::now();

    let width = frame.width;
    let height = frame.height;

    // Downscale large frames for faster processing
    let (proc_width, proc_height) = if width > max_dimension || height > max_dimension {
        let scale = (width as f32 / max_dimension as f32).max(height as f32 / max_dimension as f32);
        (
            (width as f32 / scale) as u32,
            (height as f32 / scale) as u32,
        )
    } else {
        (width, height)
    };

    let luma = luma_plane(frame, proc_width, proc_height);
    let image = image::GrayImage::from_raw(proc_width, proc_height, luma)?;

    let conversion_time = start.elapsed();
    trace!(
        proc_width,
        proc_height,
        conversion_ms = conversion_time.as_millis(),
        "Prepared grayscale image for processing"
    );

    let mut prepared = rqrr::PreparedImage::prepare(image);
    let grids = prepared.detect_grids();

    let detection_time = start.elapsed() - conversion_time;
    trace!(
        count = grids.len(),
        detection_ms = detection_time.as_millis(),
        "QR grid detection complete"
    );

    for grid in grids {
        match grid.decode() {
            Ok((meta, content)) => {
                debug!(
                    content = %content,
                    version = meta.version.0,
                    ecc_level = meta.ecc_level,
                    total_ms = start.elapsed().as_millis(),
                    "Decoded QR code"
                );
                return Some(content);
            }
            Err(e) => {
                debug!(error = %e, "Failed to decode QR grid");
            }
        }
    }

    None
}

/// Convert an RGBA frame to a grayscale plane at the target size
///
/// Samples nearest-neighbor and weighs channels per BT.601, skipping any
/// stride padding at row ends.
fn luma_plane(frame: &CameraFrame, dst_width: u32, dst_height: u32) -> Vec<u8> {
    let src_width = frame.width as usize;
    let src_height = frame.height as usize;
    let stride = frame.stride as usize;
    let data = frame.data.as_ref();

    let mut result = Vec::with_capacity((dst_width * dst_height) as usize);

    let x_ratio = src_width as f32 / dst_width as f32;
    let y_ratio = src_height as f32 / dst_height as f32;

    for y in 0..dst_height {
        let src_y = ((y as f32 * y_ratio) as usize).min(src_height - 1);
        let row_start = src_y * stride;
        for x in 0..dst_width {
            let src_x = ((x as f32 * x_ratio) as usize).min(src_width - 1);
            let offset = row_start + src_x * 4;

            let r = data.get(offset).copied().unwrap_or(0) as u32;
            let g = data.get(offset + 1).copied().unwrap_or(0) as u32;
            let b = data.get(offset + 2).copied().unwrap_or(0) as u32;

            // BT.601 luma, integer weights summing to 256
            result.push(((77 * r + 150 * g + 29 * b) >> 8) as u8);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::FrameData;
    use std::sync::Arc;
    use std::time::Instant;

    fn frame(width: u32, height: u32, stride: u32, data: Vec<u8>) -> CameraFrame {
        CameraFrame {
            width,
            height,
            data: FrameData::Copied(Arc::from(data.as_slice())),
            stride,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn test_luma_plane_strips_stride() {
        // 2x2 RGBA frame with 2 bytes of stride padding per row
        let data: Vec<u8> = vec![
            255, 255, 255, 255, // White pixel
            0, 0, 0, 255, // Black pixel
            0, 0, // stride padding
            255, 0, 0, 255, // Red pixel
            0, 255, 0, 255, // Green pixel
            0, 0, // stride padding
        ];

        let frame = frame(2, 2, 10, data);
        let luma = luma_plane(&frame, 2, 2);

        assert_eq!(luma.len(), 4);
        assert_eq!(luma[0], 255); // White
        assert_eq!(luma[1], 0); // Black
        assert_eq!(luma[2], 76); // Red (77 * 255 >> 8)
        assert_eq!(luma[3], 149); // Green (150 * 255 >> 8)
    }

    #[test]
    fn test_luma_plane_downscales() {
        // 4x2 frame, left half black, right half white
        let mut data = Vec::new();
        for _row in 0..2 {
            for x in 0..4 {
                let v = if x < 2 { 0 } else { 255 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }

        let frame = frame(4, 2, 16, data);
        let luma = luma_plane(&frame, 2, 1);

        assert_eq!(luma.len(), 2);
        assert_eq!(luma[0], 0); // Samples from the black half
        assert_eq!(luma[1], 255); // Samples from the white half
    }

    #[test]
    fn test_scan_sync_rejects_warmup_frame() {
        // Streams emit zero-dimension frames before the first real one
        let zero_width = frame(0, 480, 0, Vec::new());
        assert_eq!(scan_sync(&zero_width, 640), None);

        let zero_height = frame(640, 0, 0, Vec::new());
        assert_eq!(scan_sync(&zero_height, 640), None);
    }

    #[test]
    fn test_scan_sync_finds_nothing_in_flat_frame() {
        let data = vec![128u8; 64 * 64 * 4];
        let flat = frame(64, 64, 64 * 4, data);
        assert_eq!(scan_sync(&flat, 640), None);
    }
}
