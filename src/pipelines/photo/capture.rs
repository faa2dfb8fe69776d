// SPDX-License-Identifier: GPL-3.0-only

//! Still capture from a live stream

use crate::backends::camera::converters::frame_to_still;
use crate::backends::camera::{StillImage, StreamHandle};
use crate::errors::PhotoError;
use tracing::debug;

/// Grab the newest frame and convert it to RGB.
///
/// Dimensions are taken from the live frame at the moment of capture, so a
/// device that substituted a different mode than requested still produces a
/// full-resolution image. Calling this before the stream reported readiness
/// is a caller bug and yields [`PhotoError::NoFrameAvailable`].
pub fn snapshot(stream: &StreamHandle) -> Result<StillImage, PhotoError> {
    let frame = stream.latest_frame().ok_or(PhotoError::NoFrameAvailable)?;
    debug!(
        width = frame.width,
        height = frame.height,
        format = %frame.fourcc_str(),
        "Capturing still"
    );
    frame_to_still(&frame)
}
