use image::GrayImage;
use rayon::prelude::*;

use featrack_core::Keypoint;

use crate::fast::FastDetector;
use crate::DetectResult;

const ORB_SIZE: f32 = 31.0;

/// FAST keypoints with an intensity-centroid orientation over a fixed patch.
/// The only detector that sets `Keypoint::orientation`, which the ORB
/// descriptor later steers its sampling pattern by.
pub struct OrbDetector {
    fast: FastDetector,
    patch_size: usize,
}

impl OrbDetector {
    pub fn new(threshold: u8, nms_distance: f32, patch_size: usize) -> Self {
        Self {
            fast: FastDetector::new(threshold, nms_distance),
            patch_size,
        }
    }

    pub fn detect(&self, img: &GrayImage) -> DetectResult<Vec<Keypoint>> {
        let corners = self.fast.detect(img)?;
        Ok(corners
            .into_par_iter()
            .map(|kp| Keypoint {
                size: ORB_SIZE,
                orientation: Some(self.orientation(img, kp.x as i32, kp.y as i32)),
                ..kp
            })
            .collect())
    }

    /// First-moment intensity centroid angle. Patches that would leave the
    /// image fall back to angle 0.
    fn orientation(&self, img: &GrayImage, cx: i32, cy: i32) -> f32 {
        let w = img.width() as i32;
        let h = img.height() as i32;
        let half = (self.patch_size / 2) as i32;

        if cx - half < 0 || cy - half < 0 || cx + half >= w || cy + half >= h {
            return 0.0;
        }

        let px = img.as_raw();
        let mut m10 = 0i64;
        let mut m01 = 0i64;
        for dy in -half..=half {
            let yy = (cy + dy) as usize;
            for dx in -half..=half {
                let xx = (cx + dx) as usize;
                let val = px[yy * w as usize + xx] as i64;
                m10 += dx as i64 * val;
                m01 += dy as i64 * val;
            }
        }

        (m01 as f32).atan2(m10 as f32)
    }
}
