// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for camera capture
//!
//! This module provides the platform-specific backend implementation for
//! camera device enumeration and frame capture via PipeWire.
//!
//! # Architecture
//!
//! The backend layer abstracts hardware access, providing a consistent API
//! regardless of the underlying capture method:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  App Layer                   │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │           ┌──────────────────┐              │
//! │           │     Camera       │              │
//! │           │    (PipeWire)    │              │
//! │           └──────────────────┘              │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: Camera backend with device enumeration and frame capture

pub mod camera;
