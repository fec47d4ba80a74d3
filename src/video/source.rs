use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, SourceError};
use crate::video::types::Frame;

/// Extensions recognized as still images when none are configured
pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "gif", "tiff", "tif"];

/// Decode an image file into an RGB frame.
///
/// Alpha is discarded and any pixel format is converted to 8-bit RGB.
/// Unreadable or undecodable files come back as
/// [`SourceError::DecodeFailed`].
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Frame> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|e| SourceError::DecodeFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let rgb_image = match image {
        image::DynamicImage::ImageRgb8(img) => img,
        _ => image.to_rgb8(),
    };

    let frame = Frame::new(rgb_image);
    if frame.is_empty() {
        return Err(SourceError::DecodeFailed {
            path: path.display().to_string(),
            reason: "image has no pixels".to_string(),
        }
        .into());
    }

    debug!("Decoded {:?}: {}x{}", path, frame.width(), frame.height());
    Ok(frame)
}

/// Check a path's extension against a list, ignoring case
pub fn has_image_extension<P: AsRef<Path>, S: AsRef<str>>(path: P, extensions: &[S]) -> bool {
    match path.as_ref().extension().and_then(|ext| ext.to_str()) {
        Some(ext) => extensions
            .iter()
            .any(|allowed| allowed.as_ref().eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Check a path against the default image extensions
pub fn is_supported_image<P: AsRef<Path>>(path: P) -> bool {
    has_image_extension(path, &DEFAULT_IMAGE_EXTENSIONS)
}

/// List the image files directly inside `directory`, sorted by file name.
///
/// Hidden files and subdirectories are ignored. Files are not decoded here,
/// so a listed file may still fail in [`load_image`].
pub fn scan_directory<P: AsRef<Path>, S: AsRef<str>>(
    directory: P,
    extensions: &[S],
) -> Result<Vec<PathBuf>> {
    let directory = directory.as_ref();

    if !directory.is_dir() {
        return Err(SourceError::DirectoryNotFound {
            path: directory.display().to_string(),
        }
        .into());
    }

    let mut images = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_file() && !is_hidden_file(&path) && has_image_extension(&path, extensions) {
            images.push(path);
        }
    }

    if images.is_empty() {
        return Err(SourceError::NoImagesFound {
            path: directory.display().to_string(),
        }
        .into());
    }

    images.sort();
    info!("Found {} images in {:?}", images.len(), directory);
    Ok(images)
}

fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
