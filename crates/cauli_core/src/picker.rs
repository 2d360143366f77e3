use crate::error::PickError;
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extensions offered by the native file dialog.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif", "tif", "tiff"];

/// An accepted image, held in memory until reset or replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    name: String,
    mime: String,
    bytes: Arc<[u8]>,
    path: Option<PathBuf>,
}

impl SelectedImage {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// Decodes the image and shrinks it to fit `max_side`, keeping the aspect ratio.
    pub fn preview(&self, max_side: u32) -> Result<RgbaImage, image::ImageError> {
        let img = image::load_from_memory(&self.bytes)?;
        Ok(img.thumbnail(max_side, max_side).to_rgba8())
    }
}

/// MIME type derived from the file name, `application/octet-stream` when unknown.
pub fn mime_for_name(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

pub fn is_image_mime(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// A non-empty declared MIME type wins over the one guessed from the name.
fn resolve_mime(name: &str, declared: Option<&str>) -> String {
    match declared.map(str::trim) {
        Some(m) if !m.is_empty() => m.to_ascii_lowercase(),
        _ => mime_for_name(name),
    }
}

fn check_image(name: &str, declared: Option<&str>) -> Result<String, PickError> {
    let mime = resolve_mime(name, declared);
    if !is_image_mime(&mime) {
        tracing::warn!("Rejected {name}: {mime} is not an image type");
        return Err(PickError::NotAnImage {
            name: name.to_string(),
            mime,
        });
    }
    Ok(mime)
}

/// Accepts a file from disk. The MIME check runs before anything is read.
pub fn pick_path(path: &Path, declared_mime: Option<&str>) -> Result<SelectedImage, PickError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime = check_image(&name, declared_mime)?;
    let bytes = fs::read(path).map_err(|source| PickError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Selected {} ({mime}, {} bytes)", path.display(), bytes.len());
    Ok(SelectedImage {
        name,
        mime,
        bytes: bytes.into(),
        path: Some(path.to_path_buf()),
    })
}

/// Accepts a file whose contents are already in memory (e.g. a drop without a path).
pub fn pick_bytes(
    name: &str,
    declared_mime: Option<&str>,
    bytes: impl Into<Arc<[u8]>>,
) -> Result<SelectedImage, PickError> {
    let mime = check_image(name, declared_mime)?;
    let bytes = bytes.into();
    tracing::info!("Selected {name} ({mime}, {} bytes)", bytes.len());
    Ok(SelectedImage {
        name: name.to_string(),
        mime,
        bytes,
        path: None,
    })
}
