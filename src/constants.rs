// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Remote analysis API defaults
pub mod api {
    use super::Duration;

    /// Default base URL of the analysis server
    pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

    /// Path of the food detection endpoint
    pub const DETECT_PATH: &str = "/detect";

    /// Path of the advice endpoint
    pub const ADVICE_PATH: &str = "/advice";

    /// Timeout for image analysis requests
    pub const DETECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout for advice requests
    pub const ADVICE_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Capture defaults
pub mod capture {
    use super::Duration;

    /// JPEG encoding quality (1-100)
    pub const JPEG_QUALITY: u8 = 90;

    /// Preferred stream width, a hint only
    pub const IDEAL_WIDTH: u32 = 1920;

    /// Preferred stream height, a hint only
    pub const IDEAL_HEIGHT: u32 = 1080;

    /// Preferred frame rate, a hint only
    pub const IDEAL_FRAME_RATE: u32 = 30;

    /// How long to wait for the first frame after acquiring a stream
    pub const STREAM_READY_TIMEOUT: Duration = Duration::from_secs(5);

    /// Number of mmap buffers for the V4L2 capture stream
    pub const STREAM_BUFFER_COUNT: u32 = 4;

    /// Frame interval for the file source (~30 fps)
    pub const FILE_FRAME_INTERVAL: Duration = Duration::from_millis(33);
}

/// Configuration file locations
pub mod config {
    /// Directory name under the platform config dir
    pub const APP_DIR: &str = "foodcam";

    /// Configuration file name
    pub const FILE_NAME: &str = "config.json";
}
