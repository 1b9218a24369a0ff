// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use fastqr::Config;
use fastqr::config::AppTheme;

#[test]
fn test_config_default() {
    // Test that default config can be created
    let config = Config::default();

    // Check sensible defaults
    assert_eq!(
        config.auto_open_links, true,
        "Links should open automatically by default"
    );
    assert_eq!(
        config.app_theme,
        AppTheme::System,
        "Theme should follow the system by default"
    );
}

#[test]
fn test_config_no_saved_camera_initially() {
    // A fresh install has no remembered camera; the platform default policy
    // picks the starting device instead
    let config = Config::default();
    assert!(config.last_camera_path.is_none());
}
