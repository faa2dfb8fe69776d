// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 video source
//!
//! Enumerates `/dev/video*` capture nodes and runs a blocking mmap capture
//! loop on a dedicated thread, publishing the newest frame into the stream
//! handle's watch channel.

use super::stream::StreamHandle;
use super::types::{CaptureDevice, RawFrame, StreamConstraints};
use super::VideoSource;
use crate::constants::capture::STREAM_BUFFER_COUNT;
use crate::errors::CameraError;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::capability::Flags;
use v4l::context;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::video::capture::Parameters;
use v4l::{Device, Format, FourCC};

/// How long to wait for the kernel to hand out mmap buffers before
/// declaring the device unavailable
const STREAM_START_TIMEOUT: Duration = Duration::from_secs(5);

/// Video source backed by the Video4Linux2 API
#[derive(Debug, Default, Clone, Copy)]
pub struct V4l2Source;

impl V4l2Source {
    pub fn new() -> Self {
        Self
    }
}

impl VideoSource for V4l2Source {
    fn list_video_devices(&self) -> Vec<CaptureDevice> {
        let mut devices = Vec::new();

        for node in context::enum_devices() {
            let path = node.path().to_path_buf();
            let dev = match Device::with_path(&path) {
                Ok(dev) => dev,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Skipping unopenable node");
                    continue;
                }
            };
            let caps = match dev.query_caps() {
                Ok(caps) => caps,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Skipping node without caps");
                    continue;
                }
            };
            if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
                continue;
            }

            devices.push(CaptureDevice {
                id: path.display().to_string(),
                label: node.name().unwrap_or_else(|| caps.card.clone()),
            });
        }

        devices.sort_by(|a, b| a.id.cmp(&b.id));
        info!(count = devices.len(), "Enumerated V4L2 capture devices");
        devices
    }

    fn acquire(
        &self,
        device: &CaptureDevice,
        constraints: &StreamConstraints,
    ) -> Result<StreamHandle, CameraError> {
        let dev = Device::with_path(&device.id).map_err(map_io_error)?;
        let caps = dev.query_caps().map_err(map_io_error)?;
        if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
            return Err(CameraError::DeviceUnavailable(format!(
                "{} is not a video capture device",
                device.id
            )));
        }

        let format = negotiate_format(&dev, constraints).map_err(map_io_error)?;
        // Frame rate is a hint; drivers that reject it still stream fine.
        if let Err(e) = dev.set_params(&Parameters::with_fps(constraints.ideal_frame_rate)) {
            debug!(device = %device.id, error = %e, "Driver rejected frame rate hint");
        }

        info!(
            device = %device.id,
            width = format.width,
            height = format.height,
            format = %format.fourcc,
            "Acquired V4L2 stream"
        );

        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let (frame_tx, frame_rx) = watch::channel(None);
        let (start_tx, start_rx) = std::sync::mpsc::channel();

        let fourcc = format.fourcc.repr;
        let (width, height) = (format.width, format.height);
        let device_id = device.id.clone();
        let worker_id = device_id.clone();

        let worker = std::thread::Builder::new()
            .name("v4l2-capture".into())
            .spawn(move || {
                let mut stream =
                    match MmapStream::with_buffers(&dev, Type::VideoCapture, STREAM_BUFFER_COUNT) {
                        Ok(stream) => stream,
                        Err(e) => {
                            let _ = start_tx.send(Err(e));
                            return;
                        }
                    };
                let _ = start_tx.send(Ok(()));

                while flag.load(Ordering::SeqCst) {
                    match stream.next() {
                        Ok((buf, meta)) => {
                            let used = meta.bytesused as usize;
                            let len = if used > 0 && used <= buf.len() {
                                used
                            } else {
                                buf.len()
                            };
                            let frame = RawFrame {
                                data: Arc::from(buf[..len].to_vec().into_boxed_slice()),
                                width,
                                height,
                                fourcc,
                            };
                            if frame_tx.send(Some(frame)).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(device = %worker_id, error = %e, "Capture loop error, stopping");
                            break;
                        }
                    }
                }
            })
            .map_err(|e| CameraError::DeviceUnavailable(e.to_string()))?;

        match start_rx.recv_timeout(STREAM_START_TIMEOUT) {
            Ok(Ok(())) => Ok(StreamHandle::new(frame_rx, running, worker, device_id)),
            Ok(Err(e)) => {
                let _ = worker.join();
                Err(map_io_error(e))
            }
            Err(_) => {
                running.store(false, Ordering::SeqCst);
                let _ = worker.join();
                Err(CameraError::DeviceUnavailable(
                    "capture stream did not start".to_string(),
                ))
            }
        }
    }
}

/// Pick a format the converters understand.
///
/// MJPG first (cheapest to ship around), then YUYV, otherwise whatever the
/// driver is currently configured for.
fn negotiate_format(dev: &Device, constraints: &StreamConstraints) -> io::Result<Format> {
    for fourcc in [b"MJPG", b"YUYV"] {
        let requested = Format::new(
            constraints.ideal_width,
            constraints.ideal_height,
            FourCC::new(fourcc),
        );
        if let Ok(actual) = dev.set_format(&requested) {
            if actual.fourcc == requested.fourcc {
                return Ok(actual);
            }
        }
    }
    dev.format()
}

fn map_io_error(e: io::Error) -> CameraError {
    if e.kind() == io::ErrorKind::PermissionDenied {
        CameraError::PermissionDenied
    } else {
        CameraError::DeviceUnavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_errors_map_to_permission_denied() {
        let e = io::Error::new(io::ErrorKind::PermissionDenied, "EACCES");
        assert_eq!(map_io_error(e), CameraError::PermissionDenied);
    }

    #[test]
    fn other_errors_map_to_device_unavailable() {
        let e = io::Error::new(io::ErrorKind::NotFound, "no such device");
        assert!(matches!(
            map_io_error(e),
            CameraError::DeviceUnavailable(_)
        ));
    }
}
