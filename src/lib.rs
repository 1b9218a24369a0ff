// SPDX-License-Identifier: MPL-2.0

//! Fast QR - A QR code scanner for the COSMIC desktop environment
//!
//! This library provides the core functionality for the Fast QR application,
//! including camera capture, QR code detection, and scan result handling.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Main application logic and UI
//! - [`backends`]: Camera backend abstraction
//! - [`scanner`]: QR code detection and payload classification
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! // This is a GUI application, typically run via:
//! // fastqr
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod i18n;
pub mod scanner;

// Re-export commonly used types
pub use app::{AppModel, Message, ScanState};
pub use config::Config;
pub use scanner::{QrScanner, ScanAction};
