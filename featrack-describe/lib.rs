//! Descriptor extraction capability: `extract(image, keypoints, kind)`.
//!
//! Every extractor produces exactly one descriptor per keypoint (sampling is
//! border-clamped rather than skipping edge keypoints), so the 1:1
//! index-alignment invariant holds by construction.

use std::time::Instant;

use image::GrayImage;
use log::info;
use thiserror::Error;

use featrack_core::{DescriptorKind, DescriptorSet, Keypoint};

mod brief;
mod orb;
mod pairs;
#[cfg(feature = "sift")]
mod sift;

pub use brief::BriefExtractor;
pub use orb::OrientedBriefExtractor;
#[cfg(feature = "sift")]
pub use sift::SiftExtractor;

#[derive(Debug, Clone, Error)]
pub enum DescribeError {
    #[error("descriptor {0} is not available in this build")]
    Unavailable(DescriptorKind),
    #[error("ORB descriptors require oriented keypoints from the ORB detector")]
    MissingOrientation,
}

pub type DescribeResult<T> = Result<T, DescribeError>;

/// Computes one descriptor per keypoint with the extractor selected by `kind`.
pub fn extract(
    img: &GrayImage,
    keypoints: &[Keypoint],
    kind: DescriptorKind,
) -> DescribeResult<DescriptorSet> {
    let t0 = Instant::now();
    let descriptors = match kind {
        DescriptorKind::Brief => {
            DescriptorSet::Binary(BriefExtractor::new().extract(img, keypoints))
        }
        DescriptorKind::Orb => {
            DescriptorSet::Binary(OrientedBriefExtractor::new().extract(img, keypoints)?)
        }
        DescriptorKind::Sift => {
            #[cfg(feature = "sift")]
            {
                DescriptorSet::Float(SiftExtractor::new().extract(img, keypoints))
            }
            #[cfg(not(feature = "sift"))]
            {
                return Err(DescribeError::Unavailable(kind));
            }
        }
    };
    info!(
        "{} descriptor extraction in {:.2} ms",
        kind,
        t0.elapsed().as_secs_f64() * 1000.0
    );
    Ok(descriptors)
}
