// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the scan result flow
//!
//! Exercises payload classification feeding the result state machine the
//! same way the scan handler wires them together: the raw payload is
//! displayed, the normalized link (if any) is what gets opened.

use fastqr::ScanState;
use fastqr::scanner::ScanAction;

/// Publish a decoded payload the way the scan handler does
fn show_classified(scan: &mut ScanState, payload: &str, auto_open: bool) {
    let action = ScanAction::classify(payload);
    let link = action.link().map(str::to_string);
    scan.show(payload.to_string(), link, auto_open);
}

#[test]
fn test_link_payload_counts_down_to_redirect() {
    let mut scan = ScanState::default();
    show_classified(&mut scan, "https://qrco.de/abc123", true);

    let mut opened = None;
    let mut ticks = 0;
    while opened.is_none() {
        opened = scan.tick();
        ticks += 1;
        assert!(ticks <= 10, "countdown should terminate");
    }

    assert_eq!(ticks, 5, "countdown runs for five whole seconds");
    assert_eq!(opened.as_deref(), Some("https://qrco.de/abc123"));
    assert!(scan.is_open(), "panel stays open while redirecting");
}

#[test]
fn test_scheme_less_link_normalized_for_opening() {
    let mut scan = ScanState::default();
    show_classified(&mut scan, "example.com/page", true);

    // The raw payload is displayed, the normalized URL is opened
    assert_eq!(scan.payload(), Some("example.com/page"));
    assert_eq!(scan.link(), Some("https://example.com/page"));
}

#[test]
fn test_text_payload_is_copy_only() {
    let mut scan = ScanState::default();
    show_classified(&mut scan, "WIFI:S:MyNetwork;T:WPA;P:secret;;", true);

    assert!(scan.is_open());
    assert_eq!(scan.link(), None);
    assert_eq!(scan.countdown(), None, "text payloads never auto-open");
    assert_eq!(scan.open_now(), None);
}

#[test]
fn test_auto_open_disabled_keeps_link_actionable() {
    let mut scan = ScanState::default();
    show_classified(&mut scan, "https://example.com", false);

    assert_eq!(scan.countdown(), None);
    // The open button still works
    assert_eq!(scan.open_now().as_deref(), Some("https://example.com"));
}

#[test]
fn test_dismissed_payload_scans_as_new() {
    let mut scan = ScanState::default();
    show_classified(&mut scan, "https://example.com", true);
    scan.dismiss();

    // The handler dedups against the displayed payload only. After a
    // dismiss nothing is displayed, so the same code publishes again with
    // a fresh countdown.
    assert_eq!(scan.payload(), None);
    show_classified(&mut scan, "https://example.com", true);
    assert_eq!(scan.countdown(), Some(5));
}

#[test]
fn test_redirecting_result_still_dedups() {
    let mut scan = ScanState::default();
    show_classified(&mut scan, "https://example.com", true);
    for _ in 0..5 {
        scan.tick();
    }
    assert!(matches!(scan, ScanState::Redirecting { .. }));

    // The payload stays visible after the redirect fires, so a code held
    // in front of the camera cannot re-open the browser every interval
    assert_eq!(scan.payload(), Some("https://example.com"));
}
