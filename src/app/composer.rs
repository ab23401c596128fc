use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::media::{CaptureStart, MediaAdapter};
use crate::domain::media::{DraftImage, Preview, RawFile};
use crate::domain::post::{AuthorProfile, DocumentHandle, DraftPost, NewPost};
use crate::error::ComposerError;
use crate::infra::camera::MediaDevices;
use crate::infra::store::PostStore;

#[derive(Debug, Clone, Default)]
pub struct ComposerState {
    pub draft: DraftPost,
    pub preview: Option<Preview>,
    pub error: Option<String>,
    pub busy: bool,
    pub camera_active: bool,
}

impl ComposerState {
    fn fail(&mut self, err: &ComposerError) {
        self.error = Some(err.message().to_string());
    }

    fn set_image(&mut self, image: DraftImage, preview: Preview) {
        self.draft.image = Some(image);
        self.draft.encoded_image = None;
        self.preview = Some(preview);
        self.error = None;
    }

    fn reset_draft(&mut self) {
        self.draft = DraftPost::default();
        self.preview = None;
        self.error = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Posted(DocumentHandle),
    /// A submission was already in flight; nothing happened.
    Busy,
    Failed(ComposerError),
}

/// Clears `busy` when the submission ends, however it ends.
struct BusyGuard<'a> {
    state: &'a Mutex<ComposerState>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .busy = false;
    }
}

/// Owns one draft post and drives it from input to the post store.
pub struct Composer<S: PostStore, D: MediaDevices> {
    store: S,
    media: MediaAdapter<D>,
    author: AuthorProfile,
    state: Mutex<ComposerState>,
}

impl<S: PostStore, D: MediaDevices> Composer<S, D> {
    pub fn new(store: S, media: MediaAdapter<D>, author: AuthorProfile) -> Self {
        Self {
            store,
            media,
            author,
            state: Mutex::new(ComposerState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ComposerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ComposerState {
        self.lock().clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn media(&self) -> &MediaAdapter<D> {
        &self.media
    }

    pub fn can_submit(&self) -> bool {
        let state = self.lock();
        !state.busy && state.draft.is_submittable()
    }

    pub fn set_text(&self, value: impl Into<String>) {
        let mut state = self.lock();
        state.draft.text = value.into();
        state.error = None;
    }

    /// Oversized files set the error and leave the current image in place.
    pub fn select_image(&self, file: RawFile) -> Result<(), ComposerError> {
        let selected = self.media.from_file(file);
        let mut state = self.lock();
        match selected {
            Ok((image, preview)) => {
                state.set_image(image, preview);
                Ok(())
            }
            Err(err) => {
                state.fail(&err);
                Err(err)
            }
        }
    }

    pub fn remove_image(&self) {
        let mut state = self.lock();
        state.draft.image = None;
        state.draft.encoded_image = None;
        state.preview = None;
        state.error = None;
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (text, image) = {
            let mut state = self.lock();
            if state.busy {
                return SubmitOutcome::Busy;
            }
            if !state.draft.is_submittable() {
                let err = ComposerError::validation();
                state.fail(&err);
                return SubmitOutcome::Failed(err);
            }
            state.busy = true;
            state.error = None;
            (state.draft.text.clone(), state.draft.image.clone())
        };
        let _busy = BusyGuard { state: &self.state };

        let encoded = match image {
            Some(image) => {
                if let Err(err) = image.revalidate(self.media.max_image_bytes()).await {
                    info!(image_id = %image.id(), "image exceeded size limit before submit");
                    self.lock().fail(&err);
                    return SubmitOutcome::Failed(err);
                }
                match self.media.encode_for_transport(&image).await {
                    Ok(encoded) => {
                        self.record_encoding(image.id(), &encoded);
                        Some(encoded)
                    }
                    Err(err) => {
                        self.lock().fail(&err);
                        return SubmitOutcome::Failed(err);
                    }
                }
            }
            None => None,
        };

        let record = NewPost::compose(&self.author, text, encoded);
        match self.store.create_post(record).await {
            Ok(handle) => {
                info!(post_id = %handle.id, "post submitted");
                self.lock().reset_draft();
                SubmitOutcome::Posted(handle)
            }
            Err(err) => {
                warn!(error = ?err, "post submission failed");
                let err = ComposerError::submission();
                self.lock().fail(&err);
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Stores the encoding sent with the current attempt, if the draft still
    /// holds the image it came from. Each submit encodes afresh.
    fn record_encoding(&self, image_id: Uuid, encoded: &str) {
        let mut state = self.lock();
        if state.draft.image.as_ref().map(DraftImage::id) == Some(image_id) {
            state.draft.encoded_image = Some(encoded.to_string());
        }
    }

    pub async fn start_capture(&self) -> Result<(), ComposerError> {
        self.lock().camera_active = true;

        match self.media.start_capture().await {
            Ok(CaptureStart::Started) => {
                self.lock().error = None;
                Ok(())
            }
            Ok(CaptureStart::Cancelled) => Ok(()),
            Err(err) => {
                let mut state = self.lock();
                state.camera_active = false;
                state.fail(&err);
                Err(err)
            }
        }
    }

    /// A captured frame replaces any picked file.
    pub fn capture(&self) -> Result<(), ComposerError> {
        let captured = self
            .media
            .capture()
            .and_then(|frame| self.media.from_capture(frame));

        let mut state = self.lock();
        state.camera_active = false;
        match captured {
            Ok((image, preview)) => {
                state.set_image(image, preview);
                Ok(())
            }
            Err(err) => {
                state.fail(&err);
                Err(err)
            }
        }
    }

    pub fn stop_capture(&self) {
        self.media.stop_capture();
        self.lock().camera_active = false;
    }
}
