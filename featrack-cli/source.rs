use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageReader};

use crate::error::CombinationError;

/// Enumerates a zero-padded numbered image sequence. Owns no state beyond
/// the naming scheme; images are loaded fresh on every access so that
/// combination runs stay fully isolated.
#[derive(Debug, Clone)]
pub struct FrameSource {
    pub dir: PathBuf,
    pub prefix: String,
    pub pad_width: usize,
    pub extension: String,
    /// First image index, inclusive.
    pub start: usize,
    /// Last image index, inclusive.
    pub end: usize,
}

impl FrameSource {
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!(
            "{}{:0pad$}.{}",
            self.prefix,
            index,
            self.extension,
            pad = self.pad_width
        ))
    }

    pub fn indices(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn frame_count(&self) -> usize {
        // A reversed range is simply empty, like the iterator it backs.
        self.end.checked_sub(self.start).map_or(0, |span| span + 1)
    }
}

/// Loads one image and converts it to grayscale. A missing or undecodable
/// file fails the current combination only.
pub fn load_grayscale(path: &Path) -> Result<GrayImage, CombinationError> {
    let reader = ImageReader::open(path).map_err(|e| CombinationError::Resource {
        path: path.to_path_buf(),
        source: image::ImageError::IoError(e),
    })?;
    let img = reader.decode().map_err(|e| CombinationError::Resource {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(img.to_luma8())
}
