// SPDX-License-Identifier: GPL-3.0-only

//! Photo pipeline: snapshot a live stream, encode for transport

pub mod capture;
pub mod encoding;

pub use capture::snapshot;
pub use encoding::{EncodedPayload, encode};

use crate::backends::camera::StreamHandle;
use crate::constants::capture::JPEG_QUALITY;
use crate::errors::PhotoError;

/// Snapshot and encode in one step, at the default quality
pub fn capture_photo(stream: &StreamHandle) -> Result<EncodedPayload, PhotoError> {
    let still = snapshot(stream)?;
    encode(&still, JPEG_QUALITY)
}
