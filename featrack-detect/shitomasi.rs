use image::GrayImage;

use featrack_core::Keypoint;

use crate::nms;
use crate::tensor::structure_tensor;

/// Good-features-to-track: scores each pixel by the smaller eigenvalue of
/// the structure tensor and keeps corners above a fraction of the strongest
/// response.
pub struct ShiTomasiDetector {
    block_size: usize,
    quality_level: f32,
    min_distance: f32,
}

impl ShiTomasiDetector {
    pub fn new(block_size: usize, quality_level: f32, min_distance: f32) -> Self {
        Self {
            block_size,
            quality_level,
            min_distance,
        }
    }

    pub fn detect(&self, img: &GrayImage) -> Vec<Keypoint> {
        let field = structure_tensor(img, self.block_size);
        let (w, h, border) = (field.width, field.height, field.border);
        if w <= 2 * border || h <= 2 * border {
            return Vec::new();
        }

        let mut keypoints = Vec::new();
        let mut max_score = 0f32;
        for y in border..h - border {
            for x in border..w - border {
                let idx = y * w + x;
                let a = field.sxx[idx];
                let c = field.syy[idx];
                let b = field.sxy[idx];
                // Smaller eigenvalue of [[a, b], [b, c]].
                let half_trace = (a + c) * 0.5;
                let lambda_min = half_trace - (half_trace * half_trace - (a * c - b * b)).sqrt();
                if lambda_min > 0.0 {
                    max_score = max_score.max(lambda_min);
                    keypoints.push(Keypoint {
                        x: x as f32,
                        y: y as f32,
                        size: self.block_size as f32,
                        response: lambda_min,
                        orientation: None,
                    });
                }
            }
        }

        let cutoff = self.quality_level * max_score;
        keypoints.retain(|kp| kp.response >= cutoff);
        let mut keypoints = nms::suppress(keypoints, self.min_distance);

        // Cap proportional to how many min_distance-spaced corners fit in
        // the image. Suppression sorted by response, so truncation keeps
        // the strongest.
        let max_corners = ((w * h) as f32 / self.min_distance.max(1.0)) as usize;
        keypoints.truncate(max_corners);
        keypoints
    }
}
