// SPDX-License-Identifier: GPL-3.0-only

//! File-backed video source
//!
//! Stands in for a real camera when analyzing an existing image or when a
//! test needs deterministic frames. Publishes the same RGB frame at a fixed
//! interval, so the rest of the pipeline sees an ordinary live stream.

use super::stream::StreamHandle;
use super::types::{CaptureDevice, RawFrame, StreamConstraints};
use super::VideoSource;
use crate::constants::capture::FILE_FRAME_INTERVAL;
use crate::errors::CameraError;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::info;

enum SourceKind {
    /// Frames decoded from an image file on disk
    Image(PathBuf),
    /// Synthetic gradient frames, no filesystem involved
    TestPattern { width: u32, height: u32 },
}

/// Video source that replays a still image or a synthetic pattern
pub struct FileSource {
    kind: SourceKind,
}

impl FileSource {
    pub fn from_image(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: SourceKind::Image(path.into()),
        }
    }

    pub fn test_pattern(width: u32, height: u32) -> Self {
        Self {
            kind: SourceKind::TestPattern { width, height },
        }
    }

    fn load_frame(&self) -> Result<RawFrame, CameraError> {
        match &self.kind {
            SourceKind::Image(path) => {
                let decoded = image::open(path).map_err(|e| {
                    CameraError::DeviceUnavailable(format!("{}: {}", path.display(), e))
                })?;
                let rgb = decoded.to_rgb8();
                let (width, height) = (rgb.width(), rgb.height());
                Ok(RawFrame {
                    data: Arc::from(rgb.into_raw().into_boxed_slice()),
                    width,
                    height,
                    fourcc: *b"RGB3",
                })
            }
            SourceKind::TestPattern { width, height } => {
                Ok(gradient_frame(*width, *height))
            }
        }
    }

    fn device_id(&self) -> String {
        match &self.kind {
            SourceKind::Image(path) => format!("file:{}", path.display()),
            SourceKind::TestPattern { width, height } => {
                format!("pattern:{}x{}", width, height)
            }
        }
    }
}

/// Horizontal red ramp over a vertical green ramp, blue fixed mid
fn gradient_frame(width: u32, height: u32) -> RawFrame {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.push((x * 255 / width.max(1)) as u8);
            pixels.push((y * 255 / height.max(1)) as u8);
            pixels.push(128);
        }
    }
    RawFrame {
        data: Arc::from(pixels.into_boxed_slice()),
        width,
        height,
        fourcc: *b"RGB3",
    }
}

impl VideoSource for FileSource {
    fn list_video_devices(&self) -> Vec<CaptureDevice> {
        vec![CaptureDevice {
            id: self.device_id(),
            label: match &self.kind {
                SourceKind::Image(_) => "Image file".to_string(),
                SourceKind::TestPattern { .. } => "Test pattern".to_string(),
            },
        }]
    }

    fn acquire(
        &self,
        device: &CaptureDevice,
        _constraints: &StreamConstraints,
    ) -> Result<StreamHandle, CameraError> {
        // Constraints are hints only; the file dictates its own dimensions.
        let frame = self.load_frame()?;
        info!(
            device = %device.id,
            width = frame.width,
            height = frame.height,
            "Acquired file stream"
        );

        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let (frame_tx, frame_rx) = watch::channel(None);

        let worker = std::thread::Builder::new()
            .name("file-capture".into())
            .spawn(move || {
                while flag.load(Ordering::SeqCst) {
                    if frame_tx.send(Some(frame.clone())).is_err() {
                        break;
                    }
                    std::thread::sleep(FILE_FRAME_INTERVAL);
                }
            })
            .map_err(|e| CameraError::DeviceUnavailable(e.to_string()))?;

        Ok(StreamHandle::new(frame_rx, running, worker, device.id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn lists_exactly_one_device() {
        let source = FileSource::test_pattern(64, 48);
        let devices = source.list_video_devices();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id, "pattern:64x48");
    }

    #[tokio::test]
    async fn test_pattern_stream_delivers_frames() {
        let source = FileSource::test_pattern(32, 24);
        let device = &source.list_video_devices()[0];
        let mut handle = source
            .acquire(device, &StreamConstraints::default())
            .unwrap();
        assert!(handle.wait_ready(Duration::from_secs(1)).await);

        let frame = handle.latest_frame().unwrap();
        assert_eq!(frame.width, 32);
        assert_eq!(frame.height, 24);
        assert_eq!(&frame.fourcc, b"RGB3");
        assert_eq!(frame.data.len(), 32 * 24 * 3);
        handle.release();
    }

    #[test]
    fn missing_file_is_device_unavailable() {
        let source = FileSource::from_image("/nonexistent/photo.jpg");
        let device = &source.list_video_devices()[0];
        let result = source.acquire(device, &StreamConstraints::default());
        assert!(matches!(result, Err(CameraError::DeviceUnavailable(_))));
    }
}
