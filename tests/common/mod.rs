#![allow(dead_code)]

use anyhow::{anyhow, Result};
use image::{Rgba, RgbaImage};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;
use tokio::sync::{Notify, Semaphore};

use tweetbox::app::composer::Composer;
use tweetbox::app::media::MediaAdapter;
use tweetbox::domain::media::RawFile;
use tweetbox::domain::post::{AuthorProfile, DocumentHandle, NewPost};
use tweetbox::infra::camera::{DeviceError, MediaDevices, StreamConstraints, VideoStream};
use tweetbox::infra::store::PostStore;

pub const FIVE_MIB: u64 = 5_242_880;

// ---------------------------------------------------------------------------
// FakeStore — records every create_post call
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct FakeStore {
    records: Arc<Mutex<Vec<NewPost>>>,
    fail: Arc<AtomicBool>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            records: Arc::default(),
            fail: Arc::default(),
            gate: None,
        }
    }

    /// Every write blocks until [`FakeStore::release`] is called.
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new()
        }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<NewPost> {
        self.records.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub async fn wait_for_calls(&self, count: usize) {
        while self.calls() < count {
            tokio::task::yield_now().await;
        }
    }
}

impl PostStore for FakeStore {
    async fn create_post(&self, record: NewPost) -> Result<DocumentHandle> {
        let id = {
            let mut records = self.records.lock().unwrap();
            records.push(record);
            format!("post-{}", records.len())
        };

        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.expect("gate closed");
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("backend unavailable: 503 from upstream"));
        }

        Ok(DocumentHandle {
            path: format!("posts/{}", id),
            id,
            server_timestamp: Some(OffsetDateTime::now_utc()),
        })
    }
}

// ---------------------------------------------------------------------------
// FakeCamera — scriptable media devices
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct FakeCamera {
    error: Option<&'static str>,
    native_size: (u32, u32),
    frame_size: (u32, u32),
    grant: Option<Arc<Notify>>,
    pub requests: Arc<Mutex<Vec<StreamConstraints>>>,
    pub streams_opened: Arc<AtomicUsize>,
    pub stop_calls: Arc<AtomicUsize>,
}

impl FakeCamera {
    pub fn new() -> Self {
        Self {
            error: None,
            native_size: (64, 48),
            frame_size: (64, 48),
            grant: None,
            requests: Arc::default(),
            streams_opened: Arc::default(),
            stop_calls: Arc::default(),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self {
            error: Some(name),
            ..Self::new()
        }
    }

    pub fn with_native_size(mut self, width: u32, height: u32) -> Self {
        self.native_size = (width, height);
        self
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = (width, height);
        self
    }

    /// Requests stay pending until the returned handle is notified.
    pub fn with_pending_grant(mut self) -> (Self, Arc<Notify>) {
        let grant = Arc::new(Notify::new());
        self.grant = Some(grant.clone());
        (self, grant)
    }

    pub fn stops(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.streams_opened.load(Ordering::SeqCst)
    }
}

impl MediaDevices for FakeCamera {
    type Stream = FakeStream;

    async fn request_video_stream(
        &self,
        constraints: StreamConstraints,
    ) -> Result<FakeStream, DeviceError> {
        self.requests.lock().unwrap().push(constraints);
        if let Some(grant) = &self.grant {
            grant.notified().await;
        }
        if let Some(name) = self.error {
            return Err(DeviceError::new(name, "scripted failure"));
        }

        self.streams_opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeStream {
            native_size: self.native_size,
            frame_size: self.frame_size,
            live: true,
            stop_calls: self.stop_calls.clone(),
        })
    }
}

pub struct FakeStream {
    native_size: (u32, u32),
    frame_size: (u32, u32),
    live: bool,
    stop_calls: Arc<AtomicUsize>,
}

impl VideoStream for FakeStream {
    fn dimensions(&self) -> (u32, u32) {
        self.native_size
    }

    fn current_frame(&mut self) -> Result<RgbaImage, DeviceError> {
        if !self.live {
            return Err(DeviceError::new("InvalidStateError", "track ended"));
        }
        let (width, height) = self.frame_size;
        Ok(RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255])))
    }

    fn stop_tracks(&mut self) {
        assert!(self.live, "tracks stopped twice");
        self.live = false;
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn composer(store: FakeStore, camera: FakeCamera) -> Composer<FakeStore, FakeCamera> {
    Composer::new(store, MediaAdapter::new(camera), AuthorProfile::default())
}

pub fn file_of_size(size: usize) -> RawFile {
    RawFile::from_bytes("photo.png", "image/png", vec![7u8; size])
}
