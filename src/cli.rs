// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for scanner operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Decoding QR codes from image files

use fastqr::backends::camera::CameraBackendManager;
use fastqr::backends::camera::types::{CameraFrame, FrameData};
use fastqr::scanner::QrScanner;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize GStreamer
    gstreamer::init()?;

    let manager = CameraBackendManager::new();
    let cameras = match manager.enumerate_cameras() {
        Ok(cameras) => cameras,
        Err(_) => {
            println!("No cameras found.");
            return Ok(());
        }
    };

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);

        let formats = manager.get_formats(camera);
        if formats.is_empty() {
            println!();
            continue;
        }

        // Collapse per-framerate entries to one line per resolution,
        // keeping the best framerate for each
        let mut resolutions: Vec<(u32, u32, u32)> = Vec::new();
        for format in &formats {
            let fps = format.framerate.map(|f| f.as_int()).unwrap_or(30);
            match resolutions
                .iter_mut()
                .find(|(w, h, _)| *w == format.width && *h == format.height)
            {
                Some(entry) => entry.2 = entry.2.max(fps),
                None => resolutions.push((format.width, format.height, fps)),
            }
        }
        resolutions.sort_by_key(|&(w, h, _)| std::cmp::Reverse(w * h));

        let res_strs: Vec<String> = resolutions
            .iter()
            .take(3)
            .map(|(w, h, fps)| format!("{}x{}@{}fps", w, h, fps))
            .collect();

        println!("      Formats: {}", res_strs.join(", "));
        println!();
    }

    Ok(())
}

/// Decode a QR code from an image file and print its payload
pub fn decode_image(input: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    use image::GenericImageView;

    let img = image::open(&input)?;
    let (width, height) = img.dimensions();
    let rgba = img.to_rgba8();
    let data = FrameData::Copied(Arc::from(rgba.into_raw().into_boxed_slice()));

    let frame = CameraFrame {
        width,
        height,
        data,
        stride: width * 4,
        captured_at: Instant::now(),
    };

    // Camera frames get downscaled for real-time pacing, but a still image
    // has no frame budget. Decode at full resolution so small codes survive.
    let scanner = QrScanner::with_max_dimension(width.max(height).max(1));

    let rt = tokio::runtime::Runtime::new()?;
    let payload = rt.block_on(scanner.scan(Arc::new(frame)));

    match payload {
        Some(content) => {
            println!("{}", content);
            Ok(())
        }
        None => Err(format!("No QR code found in {}", input.display()).into()),
    }
}
