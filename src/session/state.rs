// SPDX-License-Identifier: GPL-3.0-only

//! Session state, actions, and completion events

use crate::analysis::AnalysisResult;
use crate::backends::camera::{StreamConstraints, StreamHandle};
use crate::errors::CameraError;
use crate::pipelines::photo::EncodedPayload;

/// Where the session currently is.
///
/// States that own resources carry them directly, so transitions cannot
/// forget to hand them over.
#[derive(Debug)]
pub enum SessionState {
    /// Nothing acquired, nothing shown
    Idle,
    /// Camera acquisition in flight
    Requesting,
    /// Live stream bound, frames flowing
    Streaming { stream: StreamHandle },
    /// A photo exists; the stream has been released
    Captured { payload: EncodedPayload },
    /// A request to the analysis server is in flight.
    ///
    /// `payload` is `None` for advice requested without a photo.
    Submitting {
        payload: Option<EncodedPayload>,
        kind: SubmissionKind,
    },
    /// A result (success or categorized failure) is on display
    ResultShown {
        result: AnalysisResult,
        payload: Option<EncodedPayload>,
    },
}

impl SessionState {
    /// Stable short name, used in logs and tests
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Requesting => "requesting",
            SessionState::Streaming { .. } => "streaming",
            SessionState::Captured { .. } => "captured",
            SessionState::Submitting { .. } => "submitting",
            SessionState::ResultShown { .. } => "result-shown",
        }
    }
}

/// Which endpoint an in-flight submission targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    Detect,
    Advice,
}

/// Everything a driver (CLI, UI, test) can ask the session to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Acquire the camera and start streaming
    Start,
    /// Take a photo from the live stream
    Capture,
    /// Stop streaming without keeping a photo (unless configured otherwise)
    Stop,
    /// Submit the captured photo for detection
    Analyze,
    /// Ask the server for advice
    GetAdvice,
    /// Discard the photo and go back to the camera
    Retake,
    /// Dismiss the shown result
    CloseResult,
    /// Discard photo and result, start over with the camera
    NewPhoto,
}

/// Completion of an async task spawned by the session.
///
/// Every event is stamped with the generation it was spawned under; the
/// machine discards events whose generation no longer matches.
#[derive(Debug)]
pub enum SessionEvent {
    CameraReady {
        generation: u64,
        stream: StreamHandle,
    },
    CameraFailed {
        generation: u64,
        error: CameraError,
    },
    SubmissionFinished {
        generation: u64,
        result: AnalysisResult,
    },
}

/// Per-session knobs, resolved from config and CLI flags
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub constraints: StreamConstraints,
    /// Index into the enumerated device list (0 = first camera)
    pub device_index: usize,
    /// When set, `Stop` during streaming captures a photo instead of
    /// discarding the session
    pub capture_on_stop: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            constraints: StreamConstraints::default(),
            device_index: 0,
            capture_on_stop: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names_are_distinct() {
        let names = [
            SessionState::Idle.name(),
            SessionState::Requesting.name(),
        ];
        assert_eq!(names, ["idle", "requesting"]);
    }

    #[test]
    fn default_options_target_first_device() {
        let options = SessionOptions::default();
        assert_eq!(options.device_index, 0);
        assert!(!options.capture_on_stop);
    }
}
