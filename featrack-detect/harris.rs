use image::GrayImage;

use featrack_core::Keypoint;

use crate::nms;
use crate::tensor::structure_tensor;

/// Reported neighborhood diameter: twice the 3-pixel Sobel aperture.
const HARRIS_SIZE: f32 = 6.0;

/// Structure-tensor corner detector scoring `det(M) - k * trace(M)^2`.
///
/// Responses are min-max normalized to 0..255 before thresholding, so
/// `min_response` is comparable across images of different contrast.
pub struct HarrisDetector {
    k: f32,
    block_size: usize,
    min_response: f32,
}

impl HarrisDetector {
    pub fn new(k: f32, block_size: usize, min_response: f32) -> Self {
        Self {
            k,
            block_size,
            min_response,
        }
    }

    pub fn detect(&self, img: &GrayImage) -> Vec<Keypoint> {
        let field = structure_tensor(img, self.block_size);
        let (w, h, border) = (field.width, field.height, field.border);
        if w <= 2 * border || h <= 2 * border {
            return Vec::new();
        }

        let mut response = vec![0f32; w * h];
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for y in border..h - border {
            for x in border..w - border {
                let idx = y * w + x;
                let a = field.sxx[idx];
                let b = field.syy[idx];
                let c = field.sxy[idx];
                let det = a * b - c * c;
                let trace = a + b;
                let r = det - self.k * trace * trace;
                response[idx] = r;
                min = min.min(r);
                max = max.max(r);
            }
        }
        if max <= min {
            return Vec::new();
        }

        let scale = 255.0 / (max - min);
        let mut keypoints = Vec::new();
        for y in border..h - border {
            for x in border..w - border {
                let raw = response[y * w + x];
                let normalized = (raw - min) * scale;
                // Positive raw response distinguishes corners from the flat
                // regions that min-max normalization alone would promote.
                if raw > 0.0 && normalized > self.min_response {
                    keypoints.push(Keypoint {
                        x: x as f32,
                        y: y as f32,
                        size: HARRIS_SIZE,
                        response: normalized,
                        orientation: None,
                    });
                }
            }
        }

        // Keypoints closer than their neighborhood diameter overlap.
        nms::suppress(keypoints, HARRIS_SIZE)
    }
}
