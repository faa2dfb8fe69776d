// SPDX-License-Identifier: GPL-3.0-only

//! Capture session orchestrator
//!
//! `handle` maps an action onto the current state and returns at most one
//! async task; the driver awaits the task and feeds the resulting event back
//! through `absorb`. Every `(state, action)` pair is total: actions that
//! make no sense in the current state are logged and dropped without
//! touching state. At most one task is ever outstanding per state that
//! spawns one, and generation stamps make late completions harmless.

use super::state::{SessionAction, SessionEvent, SessionOptions, SessionState, SubmissionKind};
use crate::analysis::{AnalysisClient, AnalysisResult, FailureCategory};
use crate::backends::camera::{StreamHandle, VideoSource};
use crate::constants::capture::STREAM_READY_TIMEOUT;
use crate::errors::{CameraError, PhotoError};
use crate::pipelines::photo;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Async work spawned by the session; resolves to the event to absorb
pub type SessionTask = BoxFuture<'static, SessionEvent>;

pub struct CaptureSession {
    state: SessionState,
    source: Arc<dyn VideoSource>,
    client: Arc<dyn AnalysisClient>,
    options: SessionOptions,
    /// Bumped whenever a task is spawned or the session is torn down;
    /// events carrying an older stamp are stale.
    generation: u64,
}

impl CaptureSession {
    pub fn new(
        source: Arc<dyn VideoSource>,
        client: Arc<dyn AnalysisClient>,
        options: SessionOptions,
    ) -> Self {
        Self {
            state: SessionState::Idle,
            source,
            client,
            options,
            generation: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The result on display, if any
    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            SessionState::ResultShown { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Apply an action to the current state.
    ///
    /// Returns the async task to drive, if the transition spawned one.
    pub fn handle(&mut self, action: SessionAction) -> Option<SessionTask> {
        let state = std::mem::replace(&mut self.state, SessionState::Idle);
        let (next, task) = self.transition(state, action);
        debug!(state = next.name(), action = ?action, "Session transition");
        self.state = next;
        task
    }

    /// Apply a task completion.
    ///
    /// Stale events (older generation, or arriving in a state that no
    /// longer expects them) are discarded; a stale ready stream is released
    /// so no binding leaks.
    pub fn absorb(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::CameraReady {
                generation,
                mut stream,
            } => {
                if generation != self.generation
                    || !matches!(self.state, SessionState::Requesting)
                {
                    debug!(device = %stream.device_id(), "Releasing stale camera stream");
                    stream.release();
                    return;
                }
                info!(device = %stream.device_id(), "Camera ready");
                self.state = SessionState::Streaming { stream };
            }
            SessionEvent::CameraFailed { generation, error } => {
                if generation != self.generation
                    || !matches!(self.state, SessionState::Requesting)
                {
                    debug!(error = %error, "Discarding stale camera failure");
                    return;
                }
                warn!(error = %error, "Camera acquisition failed");
                self.state = SessionState::ResultShown {
                    result: camera_failure(&error),
                    payload: None,
                };
            }
            SessionEvent::SubmissionFinished { generation, result } => {
                if generation != self.generation {
                    debug!("Discarding stale submission result");
                    return;
                }
                let state = std::mem::replace(&mut self.state, SessionState::Idle);
                match state {
                    SessionState::Submitting { payload, .. } => {
                        self.state = SessionState::ResultShown { result, payload };
                    }
                    other => self.state = other,
                }
            }
        }
    }

    /// Convenience driver: handle the action and, if it spawned a task,
    /// await and absorb it before returning.
    pub async fn dispatch(&mut self, action: SessionAction) -> &SessionState {
        if let Some(task) = self.handle(action) {
            let event = task.await;
            self.absorb(event);
        }
        &self.state
    }

    /// Release everything and return to idle.
    ///
    /// Safe to call in any state and any number of times; pending task
    /// completions become stale.
    pub fn teardown(&mut self) {
        self.generation += 1;
        if let SessionState::Streaming { mut stream } =
            std::mem::replace(&mut self.state, SessionState::Idle)
        {
            stream.release();
        }
    }

    fn transition(
        &mut self,
        state: SessionState,
        action: SessionAction,
    ) -> (SessionState, Option<SessionTask>) {
        match (state, action) {
            (SessionState::Idle, SessionAction::Start) => {
                (SessionState::Requesting, Some(self.spawn_acquire()))
            }
            (SessionState::Idle, SessionAction::GetAdvice) => (
                SessionState::Submitting {
                    payload: None,
                    kind: SubmissionKind::Advice,
                },
                Some(self.spawn_advice()),
            ),
            // Cancelling an in-flight acquisition: the eventual ready event
            // goes stale and its stream is released on arrival.
            (SessionState::Requesting, SessionAction::Stop) => {
                self.generation += 1;
                (SessionState::Idle, None)
            }
            (SessionState::Streaming { stream }, SessionAction::Capture) => {
                (self.capture_from(stream), None)
            }
            (SessionState::Streaming { mut stream }, SessionAction::Stop) => {
                if self.options.capture_on_stop && stream.latest_frame().is_some() {
                    (self.capture_from(stream), None)
                } else {
                    stream.release();
                    (SessionState::Idle, None)
                }
            }
            (SessionState::Captured { payload }, SessionAction::Analyze) => {
                let task = self.spawn_detect(payload.transport_payload().to_string());
                (
                    SessionState::Submitting {
                        payload: Some(payload),
                        kind: SubmissionKind::Detect,
                    },
                    Some(task),
                )
            }
            (SessionState::Captured { payload }, SessionAction::GetAdvice) => {
                let task = self.spawn_advice();
                (
                    SessionState::Submitting {
                        payload: Some(payload),
                        kind: SubmissionKind::Advice,
                    },
                    Some(task),
                )
            }
            (SessionState::Captured { .. }, SessionAction::Retake) => {
                (SessionState::Requesting, Some(self.spawn_acquire()))
            }
            (SessionState::ResultShown { payload, .. }, SessionAction::CloseResult) => {
                match payload {
                    Some(payload) => (SessionState::Captured { payload }, None),
                    None => (SessionState::Idle, None),
                }
            }
            (SessionState::ResultShown { .. }, SessionAction::NewPhoto) => {
                (SessionState::Requesting, Some(self.spawn_acquire()))
            }
            (state, action) => {
                debug!(state = state.name(), action = ?action, "Action not valid in this state");
                (state, None)
            }
        }
    }

    /// Capture synchronously from a live stream.
    ///
    /// On success the stream is released before the photo state is entered.
    /// A missing frame means the caller jumped the readiness signal; the
    /// stream stays live so a later capture can succeed.
    fn capture_from(&mut self, mut stream: StreamHandle) -> SessionState {
        match photo::capture_photo(&stream) {
            Ok(payload) => {
                stream.release();
                info!(
                    width = payload.width,
                    height = payload.height,
                    "Photo captured"
                );
                SessionState::Captured { payload }
            }
            Err(PhotoError::NoFrameAvailable) => {
                warn!("Capture requested before the stream delivered a frame");
                SessionState::Streaming { stream }
            }
            Err(error) => {
                stream.release();
                warn!(error = %error, "Capture failed");
                SessionState::ResultShown {
                    result: AnalysisResult::failure(
                        error.to_string(),
                        photo_failure_category(&error),
                    ),
                    payload: None,
                }
            }
        }
    }

    fn spawn_acquire(&mut self) -> SessionTask {
        self.generation += 1;
        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let options = self.options.clone();

        async move {
            let acquired = tokio::task::spawn_blocking(move || {
                let devices = source.list_video_devices();
                if devices.is_empty() {
                    return Err(CameraError::NoCameraFound);
                }
                let device = devices
                    .get(options.device_index)
                    .cloned()
                    .ok_or(CameraError::NoCameraFound)?;
                source.acquire(&device, &options.constraints)
            })
            .await;

            let mut stream = match acquired {
                Ok(Ok(stream)) => stream,
                Ok(Err(error)) => return SessionEvent::CameraFailed { generation, error },
                Err(e) => {
                    return SessionEvent::CameraFailed {
                        generation,
                        error: CameraError::DeviceUnavailable(format!(
                            "camera task failed: {}",
                            e
                        )),
                    };
                }
            };

            if stream.wait_ready(STREAM_READY_TIMEOUT).await {
                SessionEvent::CameraReady { generation, stream }
            } else {
                stream.release();
                SessionEvent::CameraFailed {
                    generation,
                    error: CameraError::DeviceUnavailable(
                        "stream delivered no frames".to_string(),
                    ),
                }
            }
        }
        .boxed()
    }

    fn spawn_detect(&mut self, image_b64: String) -> SessionTask {
        self.generation += 1;
        let generation = self.generation;
        let fut = self.client.detect(image_b64);
        async move {
            SessionEvent::SubmissionFinished {
                generation,
                result: fut.await,
            }
        }
        .boxed()
    }

    fn spawn_advice(&mut self) -> SessionTask {
        self.generation += 1;
        let generation = self.generation;
        let fut = self.client.advice();
        async move {
            SessionEvent::SubmissionFinished {
                generation,
                result: fut.await,
            }
        }
        .boxed()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn camera_failure(error: &CameraError) -> AnalysisResult {
    let category = match error {
        CameraError::PermissionDenied => FailureCategory::PermissionDenied,
        CameraError::NoCameraFound | CameraError::DeviceUnavailable(_) => {
            FailureCategory::DeviceUnavailable
        }
    };
    AnalysisResult::failure(error.to_string(), category)
}

fn photo_failure_category(error: &PhotoError) -> FailureCategory {
    match error {
        PhotoError::NoFrameAvailable => FailureCategory::NoFrameAvailable,
        PhotoError::CaptureFailed(_) | PhotoError::EncodingFailed(_) => FailureCategory::Unknown,
    }
}
