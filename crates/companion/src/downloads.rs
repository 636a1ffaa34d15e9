//! Saving extracted assets to disk.

use core::time::Duration;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use page_handler::url::fetch_bytes;
use url::Url;

use crate::error::DownloadError;

/// Name used for fetched images, whatever their real type.
pub const IMAGE_FILE_NAME: &str = "image.png";

/// `image.png` for the first image, `image-{index}.png` after it.
pub fn image_file_name(index: usize) -> String {
    if index == 0 {
        IMAGE_FILE_NAME.to_owned()
    } else {
        format!("image-{index}.png")
    }
}

pub fn svg_file_name(index: usize) -> String {
    format!("icon-{index}.svg")
}

pub fn lottie_file_name(index: usize) -> String {
    format!("animation-{index}.json")
}

fn write(dir: &Path, name: &str, contents: &[u8]) -> Result<PathBuf, DownloadError> {
    let path = dir.join(name);
    let io_error = |source| DownloadError::Io {
        path: path.display().to_string(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_error)?;
    fs::write(&path, contents).map_err(io_error)?;
    info!("saved {}", path.display());
    Ok(path)
}

/// Write the SVG markup at `index` of an asset bundle as `icon-{index}.svg`.
///
/// # Errors
///
/// Returns [`DownloadError::Io`] when the directory or file cannot be written.
pub fn save_svg(dir: &Path, index: usize, markup: &str) -> Result<PathBuf, DownloadError> {
    write(dir, &svg_file_name(index), markup.as_bytes())
}

/// Write the Lottie JSON at `index` of an asset bundle as `animation-{index}.json`.
///
/// # Errors
///
/// Returns [`DownloadError::Io`] when the directory or file cannot be written.
pub fn save_lottie(dir: &Path, index: usize, json: &str) -> Result<PathBuf, DownloadError> {
    write(dir, &lottie_file_name(index), json.as_bytes())
}

/// Fetch the image URL at `index` of an asset bundle and write its bytes
/// under [`image_file_name`].
///
/// # Errors
///
/// Returns [`DownloadError::BadUrl`] for unparsable URLs, [`DownloadError::Fetch`]
/// when fetching fails and [`DownloadError::Io`] when writing fails.
pub async fn save_image(
    dir: &Path,
    index: usize,
    src: &str,
    timeout: Duration,
) -> Result<PathBuf, DownloadError> {
    let url = Url::parse(src).map_err(|_| DownloadError::BadUrl(src.to_owned()))?;
    let bytes = fetch_bytes(&url, timeout).await?;
    write(dir, &image_file_name(index), &bytes)
}
