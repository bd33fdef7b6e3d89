use image::GrayImage;
use rayon::prelude::*;

use featrack_core::{BinaryDescriptor, Keypoint};

use crate::brief::BriefExtractor;
use crate::{DescribeError, DescribeResult};

/// The BRIEF pattern steered by the orientation the ORB detector computed.
/// Reuses detector-internal state, so it is only valid on ORB keypoints;
/// unoriented keypoint sets are rejected rather than silently described
/// with a zero angle.
pub struct OrientedBriefExtractor {
    brief: BriefExtractor,
}

impl OrientedBriefExtractor {
    pub fn new() -> Self {
        Self {
            brief: BriefExtractor::new(),
        }
    }

    pub fn extract(
        &self,
        img: &GrayImage,
        keypoints: &[Keypoint],
    ) -> DescribeResult<Vec<BinaryDescriptor>> {
        if keypoints.iter().any(|kp| kp.orientation.is_none()) {
            return Err(DescribeError::MissingOrientation);
        }

        Ok(keypoints
            .par_iter()
            .map(|kp| {
                self.brief
                    .describe(img, kp.x, kp.y, kp.orientation.unwrap_or(0.0))
            })
            .collect())
    }
}

impl Default for OrientedBriefExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured_image() -> GrayImage {
        GrayImage::from_fn(48, 48, |x, y| {
            image::Luma([((x * 3 + y * 17) % 256) as u8])
        })
    }

    fn oriented(x: f32, y: f32, angle: f32) -> Keypoint {
        Keypoint {
            x,
            y,
            size: 31.0,
            response: 1.0,
            orientation: Some(angle),
        }
    }

    #[test]
    fn oriented_keypoints_are_described_one_to_one() {
        let img = textured_image();
        let kps = vec![oriented(20.0, 20.0, 0.0), oriented(30.0, 25.0, 1.2)];
        let descriptors = OrientedBriefExtractor::new().extract(&img, &kps).unwrap();
        assert_eq!(descriptors.len(), 2);
    }

    #[test]
    fn rotation_changes_the_descriptor() {
        let img = textured_image();
        let extractor = OrientedBriefExtractor::new();
        let zero = extractor
            .extract(&img, &[oriented(24.0, 24.0, 0.0)])
            .unwrap();
        let turned = extractor
            .extract(&img, &[oriented(24.0, 24.0, std::f32::consts::FRAC_PI_2)])
            .unwrap();
        assert_ne!(zero[0], turned[0]);
    }

    #[test]
    fn one_unoriented_keypoint_fails_the_whole_set() {
        let img = textured_image();
        let kps = vec![
            oriented(20.0, 20.0, 0.0),
            Keypoint {
                orientation: None,
                ..oriented(30.0, 30.0, 0.0)
            },
        ];
        assert!(matches!(
            OrientedBriefExtractor::new().extract(&img, &kps),
            Err(DescribeError::MissingOrientation)
        ));
    }
}
