//! Keypoint detector capability: `detect(image, kind)` with a fixed
//! parameter table per kind. Each detector owns its algorithm; this module
//! owns the parameters so they are reproducible across runs.

use std::time::Instant;

use image::GrayImage;
use log::info;
use thiserror::Error;

use featrack_core::{DetectorKind, Keypoint};

mod fast;
mod harris;
mod nms;
mod orb;
mod shitomasi;
mod tensor;

pub use fast::FastDetector;
pub use harris::HarrisDetector;
pub use orb::OrbDetector;
pub use shitomasi::ShiTomasiDetector;

#[derive(Debug, Clone, Error)]
pub enum DetectError {
    #[error("image {width}x{height} too small for {kind} (minimum {min}x{min})")]
    ImageTooSmall {
        kind: DetectorKind,
        width: u32,
        height: u32,
        min: u32,
    },
}

pub type DetectResult<T> = Result<T, DetectError>;

// Fixed per-kind parameter tables. Changing any of these changes every
// logged statistic, so they are constants rather than CLI surface.
const FAST_THRESHOLD: u8 = 30;
const FAST_NMS_DISTANCE: f32 = 3.0;
const HARRIS_K: f32 = 0.04;
const HARRIS_BLOCK_SIZE: usize = 2;
const HARRIS_MIN_RESPONSE: f32 = 100.0;
const SHITOMASI_BLOCK_SIZE: usize = 4;
const SHITOMASI_QUALITY_LEVEL: f32 = 0.01;
const SHITOMASI_MIN_DISTANCE: f32 = 4.0;
const ORB_PATCH_SIZE: usize = 31;

/// Runs the detector selected by `kind` over the whole image.
pub fn detect(img: &GrayImage, kind: DetectorKind) -> DetectResult<Vec<Keypoint>> {
    let t0 = Instant::now();
    let keypoints = match kind {
        DetectorKind::Fast => {
            FastDetector::new(FAST_THRESHOLD, FAST_NMS_DISTANCE).detect(img)?
        }
        DetectorKind::Harris => {
            HarrisDetector::new(HARRIS_K, HARRIS_BLOCK_SIZE, HARRIS_MIN_RESPONSE).detect(img)
        }
        DetectorKind::ShiTomasi => ShiTomasiDetector::new(
            SHITOMASI_BLOCK_SIZE,
            SHITOMASI_QUALITY_LEVEL,
            SHITOMASI_MIN_DISTANCE,
        )
        .detect(img),
        DetectorKind::Orb => {
            OrbDetector::new(FAST_THRESHOLD, FAST_NMS_DISTANCE, ORB_PATCH_SIZE).detect(img)?
        }
    };
    info!(
        "{} detection with n={} keypoints in {:.2} ms",
        kind,
        keypoints.len(),
        t0.elapsed().as_secs_f64() * 1000.0
    );
    Ok(keypoints)
}
