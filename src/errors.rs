// SPDX-License-Identifier: GPL-3.0-only

//! Error types for camera acquisition and photo capture
//!
//! Network-side failures (timeouts, server errors) are not modelled here:
//! the submission client classifies them directly into displayable
//! [`AnalysisResult`](crate::analysis::AnalysisResult) values, so they never
//! surface as Rust errors.

use std::fmt;

/// Camera acquisition errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// No video capture devices found
    NoCameraFound,
    /// The user (or platform policy) denied access to the device
    PermissionDenied,
    /// The device cannot be opened (in use, disconnected, or missing)
    DeviceUnavailable(String),
}

/// Photo capture and encoding errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoError {
    /// No frame available for capture (stream not ready yet)
    NoFrameAvailable,
    /// Frame conversion failed
    CaptureFailed(String),
    /// JPEG encoding failed
    EncodingFailed(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NoCameraFound => write!(f, "No camera devices found"),
            CameraError::PermissionDenied => write!(f, "Camera access denied"),
            CameraError::DeviceUnavailable(msg) => write!(f, "Camera unavailable: {}", msg),
        }
    }
}

impl fmt::Display for PhotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoError::NoFrameAvailable => write!(f, "No frame available for capture"),
            PhotoError::CaptureFailed(msg) => write!(f, "Capture failed: {}", msg),
            PhotoError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
        }
    }
}

impl std::error::Error for CameraError {}
impl std::error::Error for PhotoError {}
