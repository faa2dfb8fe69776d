// SPDX-License-Identifier: GPL-3.0-only

//! Raw frame to RGB conversion
//!
//! V4L2 devices typically deliver MJPG or YUYV; the file source delivers
//! RGB3 directly. Everything funnels into tightly packed RGB8.

use super::types::{RawFrame, StillImage};
use crate::errors::PhotoError;

/// Convert a raw frame into an RGB8 still image.
///
/// Dimensions come from the frame itself, not from the requested
/// constraints, since the device may have substituted another mode.
pub fn frame_to_still(frame: &RawFrame) -> Result<StillImage, PhotoError> {
    match &frame.fourcc {
        b"MJPG" | b"JPEG" => decode_mjpg(frame),
        b"YUYV" => Ok(yuyv_to_rgb(frame)),
        b"RGB3" => rgb3_to_still(frame),
        other => Err(PhotoError::CaptureFailed(format!(
            "unsupported pixel format: {}",
            String::from_utf8_lossy(other)
        ))),
    }
}

fn decode_mjpg(frame: &RawFrame) -> Result<StillImage, PhotoError> {
    let decoded = image::load_from_memory(&frame.data)
        .map_err(|e| PhotoError::CaptureFailed(format!("MJPG decode: {}", e)))?;
    let rgb = decoded.to_rgb8();
    Ok(StillImage {
        width: rgb.width(),
        height: rgb.height(),
        pixels: rgb.into_raw(),
    })
}

/// YUYV 4:2:2 to RGB using BT.601 coefficients.
///
/// Each 4-byte group holds two pixels: Y0 U Y1 V.
fn yuyv_to_rgb(frame: &RawFrame) -> StillImage {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let mut pixels = Vec::with_capacity(width * height * 3);

    for chunk in frame.data.chunks_exact(4) {
        let y0 = chunk[0] as f32;
        let u = chunk[1] as f32 - 128.0;
        let y1 = chunk[2] as f32;
        let v = chunk[3] as f32 - 128.0;

        for y in [y0, y1] {
            let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
            let g = (y - 0.344_136 * u - 0.714_136 * v).clamp(0.0, 255.0) as u8;
            let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;
            pixels.push(r);
            pixels.push(g);
            pixels.push(b);
        }
    }

    pixels.truncate(width * height * 3);

    StillImage {
        width: frame.width,
        height: frame.height,
        pixels,
    }
}

fn rgb3_to_still(frame: &RawFrame) -> Result<StillImage, PhotoError> {
    let expected = frame.width as usize * frame.height as usize * 3;
    if frame.data.len() < expected {
        return Err(PhotoError::CaptureFailed(format!(
            "RGB3 frame too short: {} bytes for {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }
    Ok(StillImage {
        width: frame.width,
        height: frame.height,
        pixels: frame.data[..expected].to_vec(),
    })
}
