use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

use image::RgbaImage;

use crate::client::PredictClient;
use crate::error::{PickError, UploadError};
use crate::normalize::PredictionResult;
use crate::picker::SelectedImage;
use crate::progress::{ProgressMode, UploadProgress};
use crate::upload::{UploadEvent, UploadHandle, spawn_upload};

pub const PREVIEW_MAX_SIDE: u32 = 640;

pub const ALERT_NOT_AN_IMAGE: &str = "Please upload an image file";
pub const ALERT_UNREADABLE: &str = "The selected file could not be read";
pub const ALERT_NO_IMAGE: &str = "Select an image first";
pub const ALERT_UPLOAD_FAILED: &str =
    "Upload/prediction failed. Check the log for details and make sure the backend is reachable.";

#[derive(Debug)]
pub struct HomeState {
    mode: ProgressMode,
    selected: Option<SelectedImage>,
    preview: Option<RgbaImage>,
    pending_preview: Option<Receiver<Option<RgbaImage>>>,
    /// Bumped on every selection change so the GUI knows when to rebuild its texture.
    selection_id: u64,
    result: Option<PredictionResult>,
    progress: UploadProgress,
    in_flight: Option<UploadHandle>,
    next_upload_id: u64,
    alert: Option<String>,
}

impl HomeState {
    pub fn new(mode: ProgressMode) -> Self {
        Self {
            mode,
            selected: None,
            preview: None,
            pending_preview: None,
            selection_id: 0,
            result: None,
            progress: UploadProgress::new(mode),
            in_flight: None,
            next_upload_id: 1,
            alert: None,
        }
    }

    pub fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    pub fn preview(&self) -> Option<&RgbaImage> {
        self.preview.as_ref()
    }

    /// The preview of the current selection is still being decoded.
    pub fn is_preview_pending(&self) -> bool {
        self.pending_preview.is_some()
    }

    pub fn selection_id(&self) -> u64 {
        self.selection_id
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    pub fn progress(&self) -> &UploadProgress {
        &self.progress
    }

    pub fn is_uploading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn raise_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Takes the outcome of a pick. Rejections only raise an alert.
    pub fn select(&mut self, picked: Result<SelectedImage, PickError>) {
        if self.is_uploading() {
            tracing::debug!("Ignoring selection while an upload is in flight");
            return;
        }
        let image = match picked {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!("Selection rejected: {err}");
                self.alert = Some(
                    match err {
                        PickError::NotAnImage { .. } => ALERT_NOT_AN_IMAGE,
                        PickError::Read { .. } => ALERT_UNREADABLE,
                    }
                    .to_string(),
                );
                return;
            }
        };
        self.selection_id += 1;
        self.preview = None;
        self.pending_preview = None;
        self.load_preview(&image);
        self.selected = Some(image);
        self.result = None;
    }

    /// Decodes the thumbnail off the UI thread; `poll` collects it.
    fn load_preview(&mut self, image: &SelectedImage) {
        let (tx, rx) = mpsc::channel();
        let job = image.clone();
        let spawned = thread::Builder::new()
            .name(format!("cauli-preview-{}", self.selection_id))
            .spawn(move || {
                // A newer selection may have dropped the receiver.
                let _ = tx.send(build_preview(&job));
            });
        match spawned {
            Ok(_) => self.pending_preview = Some(rx),
            Err(e) => {
                tracing::warn!("Decoding preview inline, no worker thread: {e}");
                self.preview = build_preview(image);
            }
        }
    }

    fn collect_preview(&mut self) {
        let Some(rx) = self.pending_preview.as_ref() else {
            return;
        };
        match rx.try_recv() {
            Ok(thumb) => {
                self.preview = thumb;
                self.pending_preview = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => self.pending_preview = None,
        }
    }

    /// Spawns the upload of the current selection.
    pub fn begin_upload(
        &mut self,
        client: &Arc<PredictClient>,
        now: Instant,
    ) -> Result<u64, UploadError> {
        let image = self.upload_candidate()?.clone();
        let id = self.next_upload_id;
        let handle = spawn_upload(Arc::clone(client), image, id).inspect_err(|e| {
            tracing::error!("Upload {id} could not start: {e}");
            self.alert = Some(ALERT_UPLOAD_FAILED.to_string());
        })?;
        self.track(handle, now);
        Ok(id)
    }

    fn upload_candidate(&mut self) -> Result<&SelectedImage, UploadError> {
        if self.is_uploading() {
            return Err(UploadError::AlreadyUploading);
        }
        match self.selected {
            Some(ref image) => Ok(image),
            None => {
                self.alert = Some(ALERT_NO_IMAGE.to_string());
                Err(UploadError::NoImage)
            }
        }
    }

    pub(crate) fn track(&mut self, handle: UploadHandle, now: Instant) {
        self.next_upload_id = handle.id() + 1;
        self.result = None;
        self.progress.start(now);
        self.in_flight = Some(handle);
    }

    /// Advances the progress ticker and applies worker events. Returns true when an upload finished.
    pub fn poll(&mut self, now: Instant) -> bool {
        self.collect_preview();
        self.progress.poll(now);
        let Some(handle) = self.in_flight.as_mut() else {
            return false;
        };
        let id = handle.id();
        let started = handle.started();
        let mut finished = None;
        for event in handle.drain() {
            match event {
                UploadEvent::Sent { sent, total } => self.progress.on_transfer(sent, total),
                UploadEvent::Finished(outcome) => finished = Some(outcome),
            }
        }
        let Some(outcome) = finished else {
            return false;
        };

        self.in_flight = None;
        self.progress.finish();
        match outcome {
            Ok(result) => {
                tracing::info!(
                    "Upload {id} done in {:.1?}: {} prediction(s)",
                    started.elapsed(),
                    result.predictions.len()
                );
                self.result = Some(result);
            }
            Err(err) => {
                tracing::error!("Upload {id} failed: {err}");
                self.alert = Some(ALERT_UPLOAD_FAILED.to_string());
            }
        }
        true
    }

    /// Back to the initial state. An in-flight call is abandoned, not cancelled.
    pub fn reset(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            tracing::info!("Abandoning upload {}", handle.id());
        }
        let next_upload_id = self.next_upload_id;
        let selection_id = self.selection_id + 1;
        *self = Self::new(self.mode);
        self.next_upload_id = next_upload_id;
        self.selection_id = selection_id;
    }
}

fn build_preview(image: &SelectedImage) -> Option<RgbaImage> {
    match image.preview(PREVIEW_MAX_SIDE) {
        Ok(thumb) => Some(thumb),
        Err(e) => {
            tracing::warn!("No preview for {}: {e}", image.name());
            None
        }
    }
}

impl Default for HomeState {
    fn default() -> Self {
        Self::new(ProgressMode::default())
    }
}
