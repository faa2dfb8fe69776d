// SPDX-License-Identifier: GPL-3.0-only

//! Video source backends
//!
//! All camera access goes through the [`VideoSource`] trait so the session
//! machine and pipelines never care whether frames come from V4L2, an image
//! file, or a test double.

pub mod converters;
pub mod file_source;
pub mod stream;
pub mod types;
pub mod v4l2;

pub use file_source::FileSource;
pub use stream::StreamHandle;
pub use types::{CaptureDevice, RawFrame, StillImage, StreamConstraints};
pub use v4l2::V4l2Source;

use crate::errors::CameraError;

/// Abstraction over anything that can enumerate devices and open a stream
pub trait VideoSource: Send + Sync {
    /// Discover available video input devices.
    ///
    /// Platform failures yield an empty list, never an error.
    fn list_video_devices(&self) -> Vec<CaptureDevice>;

    /// Open a stream on `device`.
    ///
    /// `constraints` are hints; the backend substitutes the nearest
    /// supported mode. The returned handle is the single owner of the
    /// binding and must be released on every exit path (its `Drop` does so
    /// as a backstop).
    fn acquire(
        &self,
        device: &CaptureDevice,
        constraints: &StreamConstraints,
    ) -> Result<StreamHandle, CameraError>;
}

/// The platform source used outside of tests
pub fn default_source() -> Box<dyn VideoSource> {
    Box::new(V4l2Source::new())
}
