// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use fastqr::constants::{formats, platform, redirect, scan};

#[test]
fn test_default_camera_policy() {
    // Desktops start with the first enumerated device
    assert_eq!(platform::default_camera_index(3, false), 0);
    assert_eq!(platform::default_camera_index(1, false), 0);

    // Handhelds start with the last device (rear camera)
    assert_eq!(platform::default_camera_index(3, true), 2);
    assert_eq!(platform::default_camera_index(1, true), 0);

    // No devices yet must not underflow
    assert_eq!(platform::default_camera_index(0, true), 0);
}

#[test]
fn test_camera_switching_cycles_back_to_start() {
    // Switching advances to the next device and wraps around, so n switches
    // from any starting point return to it
    for count in 1..=4usize {
        for mobile in [false, true] {
            let start = platform::default_camera_index(count, mobile);
            let mut index = start;
            for _ in 0..count {
                index = (index + 1) % count;
            }
            assert_eq!(index, start, "cycle of {} devices should wrap", count);
        }
    }
}

#[test]
fn test_countdown_totals_five_seconds() {
    let total = u64::from(redirect::COUNTDOWN_START_SECS) * redirect::COUNTDOWN_TICK_MS;
    assert_eq!(total, 5000, "Redirect countdown should run for five seconds");
}

#[test]
fn test_scan_interval_shorter_than_notice() {
    // Several scan attempts fit inside one notice window, so a new result
    // can replace the notice before it fades
    assert!(
        (scan::MIN_SCAN_INTERVAL.as_millis() as u64) < scan::SUCCESS_NOTICE_MS,
        "Scan pacing should be faster than the notice duration"
    );
}

#[test]
fn test_common_framerates_cover_standard_rates() {
    assert!(formats::COMMON_FRAMERATES.contains(&30));
    assert!(formats::COMMON_FRAMERATES.contains(&60));
}

#[test]
fn test_preferred_scan_width_above_decode_floor() {
    // Frames are downscaled to 640px for decoding; capturing below that
    // would throw away detail the decoder could use
    assert!(formats::PREFERRED_SCAN_WIDTH >= 640);
}
