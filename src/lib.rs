// SPDX-License-Identifier: GPL-3.0-only

//! foodcam: capture a photo from a camera and submit it for food analysis
//!
//! The crate is organized around a small state machine
//! ([`session::CaptureSession`]) that owns the camera stream, drives the
//! photo pipeline, and talks to the analysis server through a pluggable
//! client. Backends live behind the [`backends::camera::VideoSource`] trait
//! so the same session runs against V4L2 hardware, an image file, or a test
//! double.

pub mod analysis;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;
pub mod session;

pub use analysis::{AnalysisClient, AnalysisResult, FailureCategory, HttpAnalysisClient};
pub use backends::camera::{
    CaptureDevice, FileSource, StillImage, StreamConstraints, StreamHandle, V4l2Source,
    VideoSource,
};
pub use config::Config;
pub use errors::{CameraError, PhotoError};
pub use pipelines::photo::EncodedPayload;
pub use session::{CaptureSession, SessionAction, SessionOptions, SessionState};
