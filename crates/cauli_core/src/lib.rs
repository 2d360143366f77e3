pub mod client;
pub mod config;
pub mod error;
pub mod normalize;
pub mod picker;
pub mod progress;
pub mod render;
pub mod state;
pub mod upload;

pub use client::{FILE_FIELD, PredictClient};
pub use config::ClientConfig;
pub use error::{ConfigError, PickError, UploadError};
pub use normalize::{
    Confidence, PredictionEntry, PredictionResult, ResponseShape, canonicalize, normalize,
};
pub use picker::{IMAGE_EXTENSIONS, SelectedImage, pick_bytes, pick_path};
pub use progress::{ProgressMode, UploadProgress};
pub use render::{CardView, card, cards, display_label, format_confidence};
pub use state::HomeState;
pub use upload::{UploadEvent, UploadHandle, spawn_upload};
