// SPDX-License-Identifier: GPL-3.0-only

//! JPEG encoding and transport payload construction

use crate::backends::camera::StillImage;
use crate::errors::PhotoError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ExtendedColorType, ImageEncoder};
use image::codecs::jpeg::JpegEncoder;
use tracing::debug;

/// An encoded photo ready for display or submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub width: u32,
    pub height: u32,
    /// Raw JPEG bytes
    pub bytes: Vec<u8>,
    /// `data:image/jpeg;base64,...` string, as a UI would render it
    pub data_url: String,
}

impl EncodedPayload {
    /// Base64 body without the data-URL prefix, the form the server expects
    pub fn transport_payload(&self) -> &str {
        match self.data_url.split_once(',') {
            Some((_, body)) => body,
            None => &self.data_url,
        }
    }
}

/// Encode an RGB still to JPEG at the given quality (1-100)
pub fn encode(still: &StillImage, quality: u8) -> Result<EncodedPayload, PhotoError> {
    if still.width == 0 || still.height == 0 {
        return Err(PhotoError::EncodingFailed("empty image".to_string()));
    }

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    encoder
        .write_image(
            &still.pixels,
            still.width,
            still.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| PhotoError::EncodingFailed(e.to_string()))?;

    let data_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(&bytes));
    debug!(
        width = still.width,
        height = still.height,
        jpeg_bytes = bytes.len(),
        "Encoded still"
    );

    Ok(EncodedPayload {
        width: still.width,
        height: still.height,
        bytes,
        data_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_still(width: u32, height: u32) -> StillImage {
        StillImage {
            width,
            height,
            pixels: vec![200; (width * height * 3) as usize],
        }
    }

    #[test]
    fn encodes_valid_jpeg() {
        let payload = encode(&solid_still(16, 12), 90).unwrap();
        assert_eq!(payload.width, 16);
        assert_eq!(payload.height, 12);
        // JPEG SOI marker
        assert_eq!(&payload.bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&payload.bytes).unwrap();
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 12);
    }

    #[test]
    fn data_url_carries_prefix_transport_does_not() {
        let payload = encode(&solid_still(8, 8), 90).unwrap();
        assert!(payload.data_url.starts_with("data:image/jpeg;base64,"));
        let body = payload.transport_payload();
        assert!(!body.contains(','));
        assert_eq!(STANDARD.decode(body).unwrap(), payload.bytes);
    }

    #[test]
    fn zero_area_image_is_rejected() {
        let still = StillImage {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        };
        assert!(matches!(
            encode(&still, 90),
            Err(PhotoError::EncodingFailed(_))
        ));
    }
}
