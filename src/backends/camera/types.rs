// SPDX-License-Identifier: GPL-3.0-only

//! Common types shared by all video source backends

use std::fmt;
use std::sync::Arc;

/// A discoverable video input device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDevice {
    /// Stable identifier (device path for V4L2, file path for the file source)
    pub id: String,
    /// Human-readable label
    pub label: String,
}

impl fmt::Display for CaptureDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.id)
    }
}

/// Requested stream parameters.
///
/// These are hints: the backend substitutes the nearest supported mode and
/// the actual dimensions are read back from delivered frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub ideal_frame_rate: u32,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            ideal_width: crate::constants::capture::IDEAL_WIDTH,
            ideal_height: crate::constants::capture::IDEAL_HEIGHT,
            ideal_frame_rate: crate::constants::capture::IDEAL_FRAME_RATE,
        }
    }
}

/// A single frame as delivered by the backend, still in its wire format
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Pixel data, shared so the capture thread and snapshots don't copy
    pub data: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    /// FourCC of `data` (e.g. b"MJPG", b"YUYV", b"RGB3")
    pub fourcc: [u8; 4],
}

impl RawFrame {
    pub fn fourcc_str(&self) -> String {
        String::from_utf8_lossy(&self.fourcc).into_owned()
    }
}

/// A decoded still image, tightly packed RGB8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StillImage {
    pub width: u32,
    pub height: u32,
    /// `width * height * 3` bytes, row-major RGB
    pub pixels: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_constraints_match_capture_defaults() {
        let c = StreamConstraints::default();
        assert_eq!(c.ideal_width, 1920);
        assert_eq!(c.ideal_height, 1080);
        assert_eq!(c.ideal_frame_rate, 30);
    }

    #[test]
    fn fourcc_renders_as_ascii() {
        let frame = RawFrame {
            data: Arc::from(vec![0u8; 4].into_boxed_slice()),
            width: 1,
            height: 1,
            fourcc: *b"YUYV",
        };
        assert_eq!(frame.fourcc_str(), "YUYV");
    }
}
