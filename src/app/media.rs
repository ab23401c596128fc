use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::media::{data_uri, DraftImage, Preview, RawFile, MAX_IMAGE_BYTES};
use crate::error::ComposerError;
use crate::infra::camera::{DeviceError, MediaDevices, StreamConstraints, VideoStream};

/// Result of a camera grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStart {
    Started,
    /// The session was stopped or replaced while the grant was pending.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub preview: Preview,
    pub payload: RawFile,
}

/// Live stream plus the offscreen raster frames are drawn onto.
struct CaptureSession<S: VideoStream> {
    stream: S,
    canvas: RgbaImage,
}

impl<S: VideoStream> CaptureSession<S> {
    fn open(stream: S) -> Self {
        let (width, height) = stream.dimensions();
        Self {
            stream,
            canvas: RgbaImage::new(width, height),
        }
    }

    fn draw_frame(&mut self) -> Result<(), DeviceError> {
        let (width, height) = self.stream.dimensions();
        if width == 0 || height == 0 {
            return Err(DeviceError::new("InvalidStateError", "video has no frame yet"));
        }
        if self.canvas.dimensions() != (width, height) {
            self.canvas = RgbaImage::new(width, height);
        }

        let frame = self.stream.current_frame()?;
        if frame.dimensions() == (width, height) {
            imageops::replace(&mut self.canvas, &frame, 0, 0);
        } else {
            let scaled = imageops::resize(&frame, width, height, FilterType::Triangle);
            imageops::replace(&mut self.canvas, &scaled, 0, 0);
        }
        Ok(())
    }

    fn export(&self) -> Result<CapturedFrame, image::ImageError> {
        let mut png = Cursor::new(Vec::new());
        self.canvas.write_to(&mut png, ImageFormat::Png)?;
        let preview = Preview::data_uri("image/png", png.get_ref());

        // JPEG has no alpha channel.
        let rgb = DynamicImage::ImageRgba8(self.canvas.clone()).to_rgb8();
        let mut jpeg = Cursor::new(Vec::new());
        rgb.write_to(&mut jpeg, ImageFormat::Jpeg)?;
        let payload = RawFile::from_bytes(
            format!("capture-{}.jpg", Uuid::new_v4().simple()),
            "image/jpeg",
            jpeg.into_inner(),
        );

        Ok(CapturedFrame { preview, payload })
    }

    fn stop(mut self) {
        self.stream.stop_tracks();
    }
}

struct SessionSlot<S: VideoStream> {
    epoch: u64,
    session: Option<CaptureSession<S>>,
}

/// Turns picked files and camera frames into size-checked image payloads and
/// owns the camera session while one is open.
pub struct MediaAdapter<D: MediaDevices> {
    devices: D,
    max_image_bytes: u64,
    slot: Mutex<SessionSlot<D::Stream>>,
}

impl<D: MediaDevices> MediaAdapter<D> {
    pub fn new(devices: D) -> Self {
        Self {
            devices,
            max_image_bytes: MAX_IMAGE_BYTES,
            slot: Mutex::new(SessionSlot {
                epoch: 0,
                session: None,
            }),
        }
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: u64) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn max_image_bytes(&self) -> u64 {
        self.max_image_bytes
    }

    pub fn devices(&self) -> &D {
        &self.devices
    }

    fn slot(&self) -> MutexGuard<'_, SessionSlot<D::Stream>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn from_file(&self, file: RawFile) -> Result<(DraftImage, Preview), ComposerError> {
        let name = file.name.clone();
        let size = file.size;
        let image = DraftImage::validated(file, self.max_image_bytes).map_err(|err| {
            info!(file = %name, size, limit = self.max_image_bytes, "rejected oversized image");
            err
        })?;
        Ok((image, Preview::object_url()))
    }

    pub fn from_capture(&self, frame: CapturedFrame) -> Result<(DraftImage, Preview), ComposerError> {
        let image = DraftImage::validated(frame.payload, self.max_image_bytes)?;
        Ok((image, frame.preview))
    }

    /// Reads the payload and encodes it as a `data:` URI.
    pub async fn encode_for_transport(&self, image: &DraftImage) -> Result<String, ComposerError> {
        let file = image.file();
        let data = file.read().await.map_err(|err| {
            warn!(error = ?err, file = %file.name, "failed to read image payload");
            ComposerError::encoding()
        })?;

        let mime = file.mime().to_string();
        tokio::task::spawn_blocking(move || data_uri(&mime, &data))
            .await
            .map_err(|err| {
                warn!(error = ?err, "image encoding task failed");
                ComposerError::encoding()
            })
    }

    /// Opens a video-only stream. An open session is stopped first.
    pub async fn start_capture(&self) -> Result<CaptureStart, ComposerError> {
        let epoch = {
            let mut slot = self.slot();
            slot.epoch += 1;
            if let Some(previous) = slot.session.take() {
                debug!("stopping previous capture session");
                previous.stop();
            }
            slot.epoch
        };

        let granted = self
            .devices
            .request_video_stream(StreamConstraints::video_only())
            .await;

        let mut slot = self.slot();
        if slot.epoch != epoch {
            if let Ok(mut stream) = granted {
                stream.stop_tracks();
            }
            return Ok(CaptureStart::Cancelled);
        }
        let stream = granted.map_err(|err| {
            warn!(error = %err, "camera request failed");
            ComposerError::device_access(&err)
        })?;
        let (width, height) = stream.dimensions();
        slot.session = Some(CaptureSession::open(stream));
        info!(width, height, "capture session started");
        Ok(CaptureStart::Started)
    }

    /// Grabs the current frame and ends the session, whether or not export worked.
    pub fn capture(&self) -> Result<CapturedFrame, ComposerError> {
        let session = {
            let mut slot = self.slot();
            slot.epoch += 1;
            slot.session.take()
        };
        let mut session = session.ok_or_else(ComposerError::no_capture_session)?;

        let result = session
            .draw_frame()
            .map_err(|err| {
                warn!(error = %err, "failed to read camera frame");
                ComposerError::capture()
            })
            .and_then(|()| {
                session.export().map_err(|err| {
                    warn!(error = ?err, "failed to export captured frame");
                    ComposerError::capture()
                })
            });

        session.stop();
        result
    }

    /// Returns whether a session was open.
    pub fn stop_capture(&self) -> bool {
        let mut slot = self.slot();
        slot.epoch += 1;
        match slot.session.take() {
            Some(session) => {
                session.stop();
                info!("capture session stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.slot().session.is_some()
    }
}

impl<D: MediaDevices> Drop for MediaAdapter<D> {
    fn drop(&mut self) {
        let slot = self.slot.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = slot.session.take() {
            session.stop();
        }
    }
}
