// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire camera enumeration and format detection
//!
//! Camera discovery and format enumeration via PipeWire. PipeWire handles
//! all device access and format negotiation internally.

use super::super::types::{CameraDevice, CameraFormat, Framerate};
use crate::constants::formats;
use tracing::{debug, info, warn};

/// Enumerate cameras using PipeWire
/// Returns list of available cameras discovered through PipeWire
pub fn enumerate_pipewire_cameras() -> Option<Vec<CameraDevice>> {
    debug!("Attempting to enumerate cameras via PipeWire");

    if gstreamer::init().is_err() {
        warn!("GStreamer init failed");
        return None;
    }

    if gstreamer::ElementFactory::make("pipewiresrc")
        .build()
        .is_err()
    {
        debug!("pipewiresrc not available");
        return None;
    }

    // Enumeration strategy:
    // 1. Discover cameras through pw-cli (rich node metadata)
    // 2. Fall back to pactl source listing
    // 3. Otherwise offer a generic entry and let PipeWire auto-select
    let cameras = try_enumerate_with_pw_cli().or_else(try_enumerate_with_pactl);

    if let Some(ref cams) = cameras {
        debug!(count = cams.len(), "Found PipeWire cameras");
        return Some(cams.clone());
    }

    info!("Using PipeWire auto-selection (default camera)");
    Some(vec![CameraDevice {
        name: "Default Camera (PipeWire)".to_string(),
        path: String::new(), // Empty path = PipeWire auto-selects
        node_id: None,
    }])
}

/// Try to enumerate cameras using pw-cli command
fn try_enumerate_with_pw_cli() -> Option<Vec<CameraDevice>> {
    debug!("Trying pw-cli for camera enumeration");

    let output = std::process::Command::new("pw-cli")
        .args(["ls", "Node"])
        .output()
        .ok()?;

    if !output.status.success() {
        debug!("pw-cli command failed");
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let cameras = parse_pw_cli_nodes(&stdout);

    if cameras.is_empty() {
        debug!("No cameras found via pw-cli");
        None
    } else {
        debug!(count = cameras.len(), "Enumerated cameras via pw-cli");
        Some(cameras)
    }
}

/// Parse `pw-cli ls Node` output for Video/Source nodes.
///
/// Enumeration order follows pw-cli output order, which is the order the
/// default-device policy and cyclic switching operate over.
fn parse_pw_cli_nodes(stdout: &str) -> Vec<CameraDevice> {
    let mut cameras = Vec::new();
    let mut current_id: Option<String> = None;
    let mut current_serial: Option<String> = None;
    let mut current_name: Option<String> = None;
    let mut is_video_source = false;

    let push_current = |id: &Option<String>,
                            serial: &Option<String>,
                            name: &Option<String>,
                            is_video: bool,
                            cameras: &mut Vec<CameraDevice>| {
        if !is_video {
            return;
        }
        let (Some(id), Some(name)) = (id.as_ref(), name.as_ref()) else {
            return;
        };

        // Prefer object.serial for target-object, fall back to node ID
        let path = if let Some(serial) = serial.as_ref() {
            format!("pipewire-serial-{}", serial)
        } else {
            format!("pipewire-{}", id)
        };

        debug!(id = %id, serial = ?serial, name = %name, path = %path, "Found video camera");
        cameras.push(CameraDevice {
            name: name.clone(),
            path,
            node_id: Some(id.clone()),
        });
    };

    for line in stdout.lines() {
        let trimmed = line.trim();

        // Node boundary (format: "id 76, type PipeWire:Interface:Node/3")
        if trimmed.starts_with("id ") && trimmed.contains("type PipeWire:Interface:Node") {
            push_current(
                &current_id,
                &current_serial,
                &current_name,
                is_video_source,
                &mut cameras,
            );

            if let Some(id_str) = trimmed.strip_prefix("id ")
                && let Some(id_num) = id_str.split(',').next()
            {
                current_id = Some(id_num.trim().to_string());
                current_serial = None;
                current_name = None;
                is_video_source = false;
            }
        }

        // media.class = "Video/Source"
        if trimmed.contains("media.class") && trimmed.contains("\"Video/Source\"") {
            is_video_source = true;
        }

        // object.serial = "2146"
        if trimmed.contains("object.serial")
            && let Some(value) = extract_quoted_value(trimmed)
        {
            current_serial = Some(value);
        }

        // node.description = "Laptop Webcam Module (2nd Gen) (V4L2)"
        if trimmed.contains("node.description")
            && let Some(value) = extract_quoted_value(trimmed)
        {
            current_name = Some(value);
        }
    }

    // Don't forget the last node
    push_current(
        &current_id,
        &current_serial,
        &current_name,
        is_video_source,
        &mut cameras,
    );

    cameras
}

/// Extract quoted value from a property line (e.g., 'property = "value"' -> "value")
fn extract_quoted_value(line: &str) -> Option<String> {
    let start = line.find('"')?;
    let end = line[start + 1..].find('"')?;
    Some(line[start + 1..start + 1 + end].to_string())
}

/// Try to enumerate cameras using pactl command (PipeWire)
fn try_enumerate_with_pactl() -> Option<Vec<CameraDevice>> {
    debug!("Trying pactl for camera enumeration");

    let output = std::process::Command::new("pactl")
        .args(["list", "sources"])
        .output()
        .ok()?;

    if !output.status.success() {
        debug!("pactl command failed");
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut cameras = Vec::new();

    // Simple parsing - look for video sources
    for line in stdout.lines() {
        if line.contains("Name:")
            && line.contains("video")
            && let Some(name) = line.split(':').nth(1)
        {
            cameras.push(CameraDevice {
                name: name.trim().to_string(),
                path: name.trim().to_string(),
                node_id: None,
            });
        }
    }

    if cameras.is_empty() {
        None
    } else {
        info!(count = cameras.len(), "Enumerated cameras via pactl");
        Some(cameras)
    }
}

/// Get supported formats for a PipeWire camera
/// Queries actual supported formats from PipeWire using pw-cli enum-params
pub fn get_pipewire_formats(device_path: &str, node_id: Option<&str>) -> Vec<CameraFormat> {
    debug!(device_path, node_id = ?node_id, "Getting PipeWire formats");

    if let Some(node_id) = node_id {
        if let Some(formats) = try_enumerate_formats_from_node(node_id) {
            info!(count = formats.len(), node_id = %node_id, "Enumerated formats via pw-cli");
            return formats;
        }
        warn!(node_id = %node_id, "Failed to enumerate formats from node, using fallback");
    } else {
        warn!(device_path, "No node ID for format enumeration, using fallback");
    }

    get_fallback_formats()
}

/// Fallback formats when PipeWire enumeration fails
fn get_fallback_formats() -> Vec<CameraFormat> {
    let mut formats = Vec::new();
    let resolutions = [
        (1920, 1080), // 1080p
        (1280, 720),  // 720p
        (640, 480),   // VGA
    ];

    for &(width, height) in &resolutions {
        for &fps in formats::COMMON_FRAMERATES {
            formats.push(CameraFormat {
                width,
                height,
                framerate: Some(Framerate::from_int(fps)),
                pixel_format: "MJPG".to_string(),
            });
        }
    }
    formats
}

/// Try to enumerate formats from a PipeWire node using pw-cli
fn try_enumerate_formats_from_node(node_id: &str) -> Option<Vec<CameraFormat>> {
    debug!(node_id, "Enumerating formats via pw-cli enum-params");

    let output = std::process::Command::new("pw-cli")
        .args(["enum-params", node_id, "EnumFormat"])
        .output()
        .ok()?;

    if !output.status.success() {
        debug!("pw-cli enum-params failed");
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let formats = parse_enum_format_output(&stdout);

    if formats.is_empty() { None } else { Some(formats) }
}

/// Parse `pw-cli enum-params <id> EnumFormat` output into format entries.
fn parse_enum_format_output(stdout: &str) -> Vec<CameraFormat> {
    let mut formats = Vec::new();
    let mut current_width: Option<u32> = None;
    let mut current_height: Option<u32> = None;
    let mut current_framerates: Vec<Framerate> = Vec::new();
    let mut current_subtype: Option<String> = None;
    let mut current_video_format: Option<String> = None;

    let flush = |width: Option<u32>,
                     height: Option<u32>,
                     subtype: &Option<String>,
                     video_format: &Option<String>,
                     framerates: &[Framerate],
                     formats: &mut Vec<CameraFormat>| {
        let (Some(w), Some(h), Some(subtype)) = (width, height, subtype.as_ref()) else {
            return;
        };

        // Raw formats carry a VideoFormat (YUY2, NV12, ...); compressed
        // formats are named by their subtype (MJPG, H264, ...)
        let pixel_format = if subtype == "raw" {
            video_format.clone().unwrap_or_else(|| "YUY2".to_string())
        } else {
            subtype.to_uppercase()
        };

        if framerates.is_empty() {
            // libcamera devices expose no framerates via EnumFormat; the
            // device negotiates its own rate per resolution.
            formats.push(CameraFormat {
                width: w,
                height: h,
                framerate: None,
                pixel_format,
            });
        } else {
            for fps in framerates {
                formats.push(CameraFormat {
                    width: w,
                    height: h,
                    framerate: Some(*fps),
                    pixel_format: pixel_format.clone(),
                });
            }
        }
    };

    for line in stdout.lines() {
        let trimmed = line.trim();

        // Format: Id 131074   (Spa:Enum:MediaSubtype:mjpg)
        if trimmed.contains("Spa:Enum:MediaSubtype:")
            && let Some(subtype_start) = trimmed.rfind(':')
        {
            let subtype = trimmed[subtype_start + 1..].trim_end_matches(')');
            current_subtype = Some(subtype.to_lowercase());
        }

        // Format: Id 4   (Spa:Enum:VideoFormat:YUY2)
        if trimmed.contains("Spa:Enum:VideoFormat:")
            && let Some(format_start) = trimmed.rfind(':')
        {
            let video_format = trimmed[format_start + 1..].trim_end_matches(')');
            current_video_format = Some(video_format.to_uppercase());
        }

        // Format: Rectangle 1920x1080
        if trimmed.starts_with("Rectangle ")
            && let Some(res_str) = trimmed.strip_prefix("Rectangle ")
            && let Some((w_str, h_str)) = res_str.split_once('x')
        {
            current_width = w_str.parse().ok();
            current_height = h_str.parse().ok();
        }

        // Format: Fraction 60/1 or Fraction 60000/1001
        if trimmed.starts_with("Fraction ")
            && let Some(frac_str) = trimmed.strip_prefix("Fraction ")
            && let Some((num_str, denom_str)) = frac_str.split_once('/')
            && let (Ok(num), Ok(denom)) = (num_str.parse::<u32>(), denom_str.parse::<u32>())
            && denom > 0
        {
            let fps = Framerate::new(num, denom);
            // Deduplicate by integer fps (60000/1001 and 60/1 both ~ 60fps)
            if !current_framerates.iter().any(|f| f.as_int() == fps.as_int()) {
                current_framerates.push(fps);
            }
        }

        // New object closes the previous format group
        if trimmed.starts_with("Object:") {
            flush(
                current_width,
                current_height,
                &current_subtype,
                &current_video_format,
                &current_framerates,
                &mut formats,
            );
            current_width = None;
            current_height = None;
            current_framerates.clear();
            current_subtype = None;
            current_video_format = None;
        }
    }

    flush(
        current_width,
        current_height,
        &current_subtype,
        &current_video_format,
        &current_framerates,
        &mut formats,
    );

    formats
}

/// Test if PipeWire is available and working
pub fn is_pipewire_available() -> bool {
    if gstreamer::init().is_err() {
        return false;
    }

    gstreamer::ElementFactory::make("pipewiresrc")
        .build()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_quoted_value() {
        assert_eq!(
            extract_quoted_value("object.serial = \"2146\""),
            Some("2146".to_string())
        );
        assert_eq!(extract_quoted_value("no quotes here"), None);
    }

    #[test]
    fn test_parse_pw_cli_nodes_filters_video_sources() {
        let output = "\
\tid 42, type PipeWire:Interface:Node/3
\t\tmedia.class = \"Audio/Source\"
\t\tnode.description = \"Built-in Microphone\"
\tid 76, type PipeWire:Interface:Node/3
\t\tobject.serial = \"2146\"
\t\tmedia.class = \"Video/Source\"
\t\tnode.description = \"Integrated Webcam\"
\tid 91, type PipeWire:Interface:Node/3
\t\tmedia.class = \"Video/Source\"
\t\tnode.description = \"USB Capture HDMI\"
";
        let cameras = parse_pw_cli_nodes(output);
        assert_eq!(cameras.len(), 2, "audio sources must be filtered out");
        assert_eq!(cameras[0].name, "Integrated Webcam");
        assert_eq!(cameras[0].path, "pipewire-serial-2146");
        assert_eq!(cameras[0].node_id.as_deref(), Some("76"));
        // Without object.serial the node ID is the path
        assert_eq!(cameras[1].path, "pipewire-91");
    }

    #[test]
    fn test_parse_pw_cli_nodes_preserves_listing_order() {
        let output = "\
\tid 10, type PipeWire:Interface:Node/3
\t\tmedia.class = \"Video/Source\"
\t\tnode.description = \"Front Camera\"
\tid 11, type PipeWire:Interface:Node/3
\t\tmedia.class = \"Video/Source\"
\t\tnode.description = \"Rear Camera\"
";
        let cameras = parse_pw_cli_nodes(output);
        assert_eq!(cameras.len(), 2);
        assert_eq!(cameras[0].name, "Front Camera");
        assert_eq!(cameras[1].name, "Rear Camera");
    }

    #[test]
    fn test_parse_enum_format_output() {
        let output = "\
  Object: size 292, type Spa:Pod:Object:Param:Format (262147), id Spa:Enum:ParamId:EnumFormat (3)
    Prop: key Spa:Pod:Object:Param:Format:mediaSubtype (2), flags 00000000
      Id 131074   (Spa:Enum:MediaSubtype:mjpg)
    Prop: key Spa:Pod:Object:Param:Format:Video:size (393217), flags 00000000
      Rectangle 1920x1080
    Prop: key Spa:Pod:Object:Param:Format:Video:framerate (393218), flags 00000000
      Fraction 30/1
      Fraction 60000/1001
  Object: size 292, type Spa:Pod:Object:Param:Format (262147), id Spa:Enum:ParamId:EnumFormat (3)
    Prop: key Spa:Pod:Object:Param:Format:mediaSubtype (2), flags 00000000
      Id 1   (Spa:Enum:MediaSubtype:raw)
    Prop: key Spa:Pod:Object:Param:Format:Video:format (393216), flags 00000000
      Id 4   (Spa:Enum:VideoFormat:YUY2)
    Prop: key Spa:Pod:Object:Param:Format:Video:size (393217), flags 00000000
      Rectangle 640x480
    Prop: key Spa:Pod:Object:Param:Format:Video:framerate (393218), flags 00000000
      Fraction 30/1
";
        let formats = parse_enum_format_output(output);
        // First group flushes when the second Object line is hit, last group
        // flushes at end of input
        assert_eq!(formats.len(), 3);
        assert_eq!(formats[0].pixel_format, "MJPG");
        assert_eq!(formats[0].width, 1920);
        assert_eq!(formats[1].framerate.map(|f| f.as_int()), Some(59));
        assert_eq!(formats[2].pixel_format, "YUY2");
        assert_eq!(formats[2].width, 640);
    }

    #[test]
    fn test_parse_enum_format_no_framerates_yields_vfr_entry() {
        let output = "\
  Object: size 292, type Spa:Pod:Object:Param:Format (262147), id Spa:Enum:ParamId:EnumFormat (3)
      Id 1   (Spa:Enum:MediaSubtype:raw)
      Id 7   (Spa:Enum:VideoFormat:NV12)
      Rectangle 1280x720
";
        let formats = parse_enum_format_output(output);
        assert_eq!(formats.len(), 1);
        assert!(formats[0].framerate.is_none(), "VFR entry has no framerate");
        assert_eq!(formats[0].pixel_format, "NV12");
    }
}
