// SPDX-License-Identifier: GPL-3.0-only

//! Active stream binding
//!
//! A [`StreamHandle`] is the single owner of a running capture worker. The
//! worker publishes the newest frame into a watch channel; the handle exposes
//! readiness, the latest frame, and an idempotent release that every exit
//! path can call safely.

use super::types::RawFrame;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Handle to a live video stream.
///
/// Dropping the handle releases the stream; calling [`release`](Self::release)
/// any number of times is equivalent to calling it once.
pub struct StreamHandle {
    frames: watch::Receiver<Option<RawFrame>>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    device_id: String,
}

impl StreamHandle {
    pub(crate) fn new(
        frames: watch::Receiver<Option<RawFrame>>,
        running: Arc<AtomicBool>,
        worker: JoinHandle<()>,
        device_id: String,
    ) -> Self {
        Self {
            frames,
            running,
            worker: Some(worker),
            device_id,
        }
    }

    /// Identifier of the device this stream is bound to
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Whether the stream has been released
    pub fn is_released(&self) -> bool {
        self.worker.is_none()
    }

    /// Newest frame delivered by the worker, if any yet
    pub fn latest_frame(&self) -> Option<RawFrame> {
        self.frames.borrow().clone()
    }

    /// Wait until the first frame arrives.
    ///
    /// Returns `false` if the timeout elapses or the worker exits before
    /// delivering anything.
    pub async fn wait_ready(&self, timeout: Duration) -> bool {
        let mut rx = self.frames.clone();
        let _ = tokio::time::timeout(timeout, async {
            loop {
                if rx.borrow_and_update().is_some() {
                    return;
                }
                if rx.changed().await.is_err() {
                    return;
                }
            }
        })
        .await;
        self.frames.borrow().is_some()
    }

    /// Stop the capture worker and clear the device binding.
    ///
    /// Idempotent: repeated calls after the first are no-ops.
    pub fn release(&mut self) {
        let Some(worker) = self.worker.take() else {
            debug!(device = %self.device_id, "Stream already released");
            return;
        };

        self.running.store(false, Ordering::SeqCst);
        if worker.join().is_err() {
            debug!(device = %self.device_id, "Capture worker panicked during shutdown");
        }
        info!(device = %self.device_id, "Stream released");
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("device_id", &self.device_id)
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_handle(publish: bool) -> StreamHandle {
        let (tx, rx) = watch::channel(None);
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let worker = std::thread::spawn(move || {
            if publish {
                let frame = RawFrame {
                    data: Arc::from(vec![1u8, 2, 3].into_boxed_slice()),
                    width: 1,
                    height: 1,
                    fourcc: *b"RGB3",
                };
                let _ = tx.send(Some(frame));
            }
            while flag.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(1));
            }
        });
        StreamHandle::new(rx, running, worker, "test-device".into())
    }

    #[tokio::test]
    async fn ready_after_first_frame() {
        let mut handle = spawn_handle(true);
        assert!(handle.wait_ready(Duration::from_secs(1)).await);
        assert!(handle.latest_frame().is_some());
        handle.release();
    }

    #[tokio::test]
    async fn not_ready_without_frames() {
        let mut handle = spawn_handle(false);
        assert!(!handle.wait_ready(Duration::from_millis(50)).await);
        handle.release();
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let mut handle = spawn_handle(true);
        handle.release();
        assert!(handle.is_released());
        handle.release();
        handle.release();
        assert!(handle.is_released());
    }
}
