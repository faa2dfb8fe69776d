// SPDX-License-Identifier: GPL-3.0-only

//! Capture session: state machine and orchestration

pub mod machine;
pub mod state;

pub use machine::{CaptureSession, SessionTask};
pub use state::{SessionAction, SessionEvent, SessionOptions, SessionState, SubmissionKind};
