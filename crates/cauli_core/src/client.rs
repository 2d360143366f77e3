use std::io::{self, Cursor, Read};
use std::time::Instant;

use reqwest::Url;
use reqwest::blocking::{Client, multipart};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::UploadError;
use crate::picker::SelectedImage;

/// Multipart field the backend reads the image from.
pub const FILE_FIELD: &str = "file";

pub struct PredictClient {
    http: Client,
    endpoint: Url,
}

impl PredictClient {
    pub fn new(cfg: &ClientConfig) -> Result<Self, UploadError> {
        // The blocking client defaults to a 30 s timeout; pass ours through, including `None`.
        let http = Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self {
            http,
            endpoint: cfg.predict_url(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn predict(&self, image: &SelectedImage) -> Result<Value, UploadError> {
        self.predict_with_progress(image, |_, _| {})
    }

    /// Posts the image as multipart field `file` and returns the parsed JSON body.
    ///
    /// `on_sent(sent, total)` is called as the body is handed to the transport.
    pub fn predict_with_progress<F>(
        &self,
        image: &SelectedImage,
        on_sent: F,
    ) -> Result<Value, UploadError>
    where
        F: FnMut(u64, u64) + Send + 'static,
    {
        let total = image.len() as u64;
        let reader = CountingReader {
            inner: Cursor::new(image.shared_bytes()),
            sent: 0,
            total,
            on_sent,
        };
        let part = multipart::Part::reader_with_length(reader, total)
            .file_name(image.name().to_string())
            .mime_str(image.mime())?;
        let form = multipart::Form::new().part(FILE_FIELD, part);

        tracing::info!("POST {} ({}, {total} bytes)", self.endpoint, image.name());
        let start = Instant::now();
        let response = self.http.post(self.endpoint.clone()).multipart(form).send()?;
        let status = response.status();
        let body = response.text()?;
        tracing::info!("{} answered {status} in {:.1?}", self.endpoint, start.elapsed());

        if !status.is_success() {
            return Err(UploadError::Status {
                status,
                detail: error_detail(&body),
            });
        }
        serde_json::from_str(&body).map_err(UploadError::Decode)
    }
}

/// The backend reports failures as `{"error": "..."}`.
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("error").and_then(Value::as_str).map(str::to_string)
}

struct CountingReader<R, F> {
    inner: R,
    sent: u64,
    total: u64,
    on_sent: F,
}

impl<R: Read, F: FnMut(u64, u64)> Read for CountingReader<R, F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.sent += n as u64;
            (self.on_sent)(self.sent, self.total);
        }
        Ok(n)
    }
}
