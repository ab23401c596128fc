use image::RgbaImage;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub video: bool,
    pub audio: bool,
}

impl StreamConstraints {
    pub fn video_only() -> Self {
        Self {
            video: true,
            audio: false,
        }
    }
}

/// Failure reported by the platform media API. `name` is the platform's error
/// tag (`NotAllowedError`, `NotFoundError`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceError {
    pub name: String,
    pub detail: String,
}

impl DeviceError {
    pub fn new(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: detail.into(),
        }
    }

    pub fn not_allowed() -> Self {
        Self::new("NotAllowedError", "permission denied")
    }

    pub fn not_found() -> Self {
        Self::new("NotFoundError", "requested device not found")
    }

    pub fn not_readable() -> Self {
        Self::new("NotReadableError", "could not start video source")
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.detail)
    }
}

impl std::error::Error for DeviceError {}

pub trait MediaDevices: Send + Sync {
    type Stream: VideoStream;

    fn request_video_stream(
        &self,
        constraints: StreamConstraints,
    ) -> impl Future<Output = Result<Self::Stream, DeviceError>> + Send;
}

/// A live video stream. Tracks keep the device busy until stopped.
pub trait VideoStream: Send + 'static {
    /// Native frame size of the video source.
    fn dimensions(&self) -> (u32, u32);

    fn current_frame(&mut self) -> Result<RgbaImage, DeviceError>;

    fn stop_tracks(&mut self);
}

/// Virtual camera that serves one still image as every frame.
#[derive(Debug, Clone)]
pub struct StillFrameDevices {
    path: PathBuf,
}

impl StillFrameDevices {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl MediaDevices for StillFrameDevices {
    type Stream = StillFrameStream;

    async fn request_video_stream(
        &self,
        constraints: StreamConstraints,
    ) -> Result<Self::Stream, DeviceError> {
        if !constraints.video {
            return Err(DeviceError::new("TypeError", "video track required"));
        }

        let path = self.path.clone();
        let frame = tokio::task::spawn_blocking(move || image::open(&path))
            .await
            .map_err(|err| DeviceError::new("AbortError", err.to_string()))?
            .map_err(|err| match err {
                image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                    DeviceError::new("NotFoundError", io.to_string())
                }
                other => DeviceError::new("NotReadableError", other.to_string()),
            })?;

        Ok(StillFrameStream {
            frame: frame.to_rgba8(),
            live: true,
        })
    }
}

#[derive(Debug)]
pub struct StillFrameStream {
    frame: RgbaImage,
    live: bool,
}

impl VideoStream for StillFrameStream {
    fn dimensions(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn current_frame(&mut self) -> Result<RgbaImage, DeviceError> {
        if !self.live {
            return Err(DeviceError::new("InvalidStateError", "track ended"));
        }
        Ok(self.frame.clone())
    }

    fn stop_tracks(&mut self) {
        self.live = false;
    }
}

/// Device set with no camera attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCamera;

impl MediaDevices for NoCamera {
    type Stream = StillFrameStream;

    async fn request_video_stream(
        &self,
        _constraints: StreamConstraints,
    ) -> Result<Self::Stream, DeviceError> {
        Err(DeviceError::not_found())
    }
}
