//! Runs one predict call on a worker thread and reports back over a channel.
//!
//! The UI thread polls [`UploadHandle::drain`] every frame. Dropping the handle
//! abandons the call: the worker still finishes, but its answer goes nowhere.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

use crate::client::PredictClient;
use crate::error::UploadError;
use crate::normalize::{PredictionResult, normalize};
use crate::picker::SelectedImage;

#[derive(Debug)]
pub enum UploadEvent {
    /// Bytes of the request body handed to the transport so far.
    Sent { sent: u64, total: u64 },
    Finished(Result<PredictionResult, UploadError>),
}

#[derive(Debug)]
pub struct UploadHandle {
    id: u64,
    started: Instant,
    rx: Receiver<UploadEvent>,
    done: bool,
}

impl UploadHandle {
    pub(crate) fn from_channel(id: u64, rx: Receiver<UploadEvent>) -> Self {
        Self {
            id,
            started: Instant::now(),
            rx,
            done: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    /// Everything the worker sent since the last call. A worker that vanished
    /// without a `Finished` event is reported as [`UploadError::WorkerGone`].
    pub fn drain(&mut self) -> Vec<UploadEvent> {
        let mut events = Vec::new();
        while !self.done {
            match self.rx.try_recv() {
                Ok(event) => {
                    if matches!(event, UploadEvent::Finished(_)) {
                        self.done = true;
                    }
                    events.push(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.done = true;
                    events.push(UploadEvent::Finished(Err(UploadError::WorkerGone)));
                }
            }
        }
        events
    }
}

/// Starts the upload of `image` on a named worker thread.
pub fn spawn_upload(
    client: Arc<PredictClient>,
    image: SelectedImage,
    id: u64,
) -> Result<UploadHandle, UploadError> {
    let (tx, rx) = mpsc::channel();
    let progress_tx = tx.clone();
    thread::Builder::new()
        .name(format!("cauli-upload-{id}"))
        .spawn(move || {
            let outcome = client
                .predict_with_progress(&image, move |sent, total| {
                    let _ = progress_tx.send(UploadEvent::Sent { sent, total });
                })
                .map(|payload| normalize(&payload));
            if tx.send(UploadEvent::Finished(outcome)).is_err() {
                tracing::debug!("Upload {id} finished after it was abandoned");
            }
        })
        .map_err(UploadError::Spawn)?;
    Ok(UploadHandle::from_channel(id, rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::ResponseShape;

    #[test]
    fn drain_collects_until_finished() {
        let (tx, rx) = mpsc::channel();
        let mut handle = UploadHandle::from_channel(1, rx);
        assert!(handle.drain().is_empty());

        tx.send(UploadEvent::Sent { sent: 5, total: 10 }).unwrap();
        tx.send(UploadEvent::Finished(Ok(PredictionResult {
            shape: ResponseShape::Predictions,
            predictions: Vec::new(),
        })))
        .unwrap();
        tx.send(UploadEvent::Sent { sent: 10, total: 10 }).unwrap();

        let events = handle.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], UploadEvent::Finished(Ok(_))));
        // Nothing after `Finished` is delivered.
        assert!(handle.drain().is_empty());
    }

    #[test]
    fn vanished_worker_is_reported_once() {
        let (tx, rx) = mpsc::channel::<UploadEvent>();
        let mut handle = UploadHandle::from_channel(2, rx);
        drop(tx);
        let events = handle.drain();
        assert!(matches!(
            events.as_slice(),
            [UploadEvent::Finished(Err(UploadError::WorkerGone))]
        ));
        assert!(handle.drain().is_empty());
    }
}
