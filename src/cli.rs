// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! Headless drivers for the capture session:
//! - Listing available cameras
//! - Taking and saving a photo
//! - Running the full capture-and-analyze flow
//! - Fetching advice

use chrono::Local;
use foodcam::Config;
use foodcam::analysis::{AnalysisClient, AnalysisResult, HttpAnalysisClient};
use foodcam::backends::camera::{FileSource, V4l2Source, VideoSource};
use foodcam::constants::capture::STREAM_READY_TIMEOUT;
use foodcam::pipelines::photo;
use foodcam::session::{CaptureSession, SessionAction, SessionState};
use std::path::PathBuf;
use std::sync::Arc;

/// List all available video capture devices
pub fn list_devices() -> Result<(), Box<dyn std::error::Error>> {
    let source = V4l2Source::new();
    let devices = source.list_video_devices();

    if devices.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    for (index, device) in devices.iter().enumerate() {
        println!("  [{}] {}", index, device);
    }

    Ok(())
}

/// Take a photo from the selected camera and write it to disk
pub fn capture_photo(
    config: &Config,
    camera: Option<usize>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = V4l2Source::new();
    let devices = source.list_video_devices();
    if devices.is_empty() {
        return Err("No cameras found".into());
    }

    let index = camera.unwrap_or(config.device_index);
    let device = devices.get(index).ok_or_else(|| {
        format!(
            "Camera index {} out of range (0-{})",
            index,
            devices.len() - 1
        )
    })?;
    println!("Using camera: {}", device.label);

    let mut handle = source.acquire(device, &config.session_options().constraints)?;

    let rt = tokio::runtime::Runtime::new()?;
    if !rt.block_on(handle.wait_ready(STREAM_READY_TIMEOUT)) {
        handle.release();
        return Err("Camera produced no frames".into());
    }

    let payload = photo::capture_photo(&handle)?;
    handle.release();

    let path = output.unwrap_or_else(default_photo_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, &payload.bytes)?;
    println!(
        "Photo saved: {} ({}x{})",
        path.display(),
        payload.width,
        payload.height
    );

    Ok(())
}

/// Capture (or load) a photo and submit it for detection
pub fn analyze(
    config: &Config,
    camera: Option<usize>,
    input: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let source: Arc<dyn VideoSource> = match input {
        Some(path) => Arc::new(FileSource::from_image(path)),
        None => Arc::new(V4l2Source::new()),
    };
    let client: Arc<dyn AnalysisClient> =
        Arc::new(HttpAnalysisClient::new(config.api_base_url.clone()));

    let mut options = config.session_options();
    if let Some(index) = camera {
        options.device_index = index;
    }
    let mut session = CaptureSession::new(source, client, options);

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(async {
        session.dispatch(SessionAction::Start).await;
        if matches!(session.state(), SessionState::Streaming { .. }) {
            session.dispatch(SessionAction::Capture).await;
            session.dispatch(SessionAction::Analyze).await;
        }
        session.result().cloned()
    });
    session.teardown();

    report(outcome)
}

/// Fetch general advice from the server
pub fn advice(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let source: Arc<dyn VideoSource> = Arc::new(V4l2Source::new());
    let client: Arc<dyn AnalysisClient> =
        Arc::new(HttpAnalysisClient::new(config.api_base_url.clone()));
    let mut session = CaptureSession::new(source, client, config.session_options());

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(async {
        session.dispatch(SessionAction::GetAdvice).await;
        session.result().cloned()
    });

    report(outcome)
}

fn report(outcome: Option<AnalysisResult>) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        Some(AnalysisResult::Success { text }) => {
            println!("{}", text);
            Ok(())
        }
        Some(AnalysisResult::Failure { message, category }) => {
            Err(format!("{} ({})", message, category).into())
        }
        None => Err("Session ended without a result".into()),
    }
}

/// Default output path for captured photos
fn default_photo_path() -> PathBuf {
    let dir = dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("foodcam");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("food_{}.jpg", timestamp))
}
