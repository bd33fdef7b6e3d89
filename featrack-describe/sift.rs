use image::GrayImage;
use rayon::prelude::*;

use featrack_core::{FloatDescriptor, Keypoint, FLOAT_DESCRIPTOR_LEN};

use crate::brief::bilinear_sample;

const WINDOW: usize = 16;
const CELLS: usize = 4;
const BINS: usize = 8;
/// Standard SIFT clamp: no single bin may dominate the normalized vector.
const MAGNITUDE_CLAMP: f32 = 0.2;

/// 128-dimensional gradient-histogram descriptor: a 16x16 window split into
/// 4x4 cells of 8 orientation bins, L2-normalized with the usual 0.2 clamp
/// and renormalization. Scale-space keypoint detection is not part of this
/// capability; the descriptor is computed at the image's native scale.
pub struct SiftExtractor;

impl SiftExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, img: &GrayImage, keypoints: &[Keypoint]) -> Vec<FloatDescriptor> {
        keypoints
            .par_iter()
            .map(|kp| describe(img, kp.x, kp.y))
            .collect()
    }
}

impl Default for SiftExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(img: &GrayImage, cx: f32, cy: f32) -> FloatDescriptor {
    let mut histogram = [0f32; FLOAT_DESCRIPTOR_LEN];
    let half = (WINDOW / 2) as f32;

    for row in 0..WINDOW {
        for col in 0..WINDOW {
            let sx = cx - half + col as f32 + 0.5;
            let sy = cy - half + row as f32 + 0.5;

            let gx = bilinear_sample(img, sx + 1.0, sy) - bilinear_sample(img, sx - 1.0, sy);
            let gy = bilinear_sample(img, sx, sy + 1.0) - bilinear_sample(img, sx, sy - 1.0);
            let magnitude = (gx * gx + gy * gy).sqrt();
            if magnitude == 0.0 {
                continue;
            }

            let mut angle = gy.atan2(gx);
            if angle < 0.0 {
                angle += 2.0 * std::f32::consts::PI;
            }
            let bin = ((angle * BINS as f32 / (2.0 * std::f32::consts::PI)) as usize).min(BINS - 1);
            let cell = (row / CELLS) * CELLS + col / CELLS;
            histogram[cell * BINS + bin] += magnitude;
        }
    }

    normalize(&mut histogram);
    for v in &mut histogram {
        *v = v.min(MAGNITUDE_CLAMP);
    }
    normalize(&mut histogram);
    histogram
}

fn normalize(v: &mut [f32; FLOAT_DESCRIPTOR_LEN]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured_image() -> GrayImage {
        GrayImage::from_fn(64, 64, |x, y| {
            image::Luma([((x * 13 + y * 7 + (x * y) % 5) % 256) as u8])
        })
    }

    fn kp(x: f32, y: f32) -> Keypoint {
        Keypoint {
            x,
            y,
            size: 16.0,
            response: 1.0,
            orientation: None,
        }
    }

    #[test]
    fn one_descriptor_per_keypoint() {
        let img = textured_image();
        let kps = vec![kp(10.0, 10.0), kp(32.0, 32.0), kp(63.0, 0.0)];
        assert_eq!(SiftExtractor::new().extract(&img, &kps).len(), 3);
    }

    #[test]
    fn descriptors_are_unit_length_and_clamped() {
        let img = textured_image();
        let descriptors = SiftExtractor::new().extract(&img, &[kp(32.0, 32.0)]);
        let d = &descriptors[0];

        let norm: f32 = d.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
        for &v in d.iter() {
            assert!(v >= 0.0);
            assert!(v.is_finite());
        }
    }

    #[test]
    fn flat_patch_gives_zero_descriptor() {
        let img = GrayImage::from_pixel(64, 64, image::Luma([128u8]));
        let descriptors = SiftExtractor::new().extract(&img, &[kp(32.0, 32.0)]);
        assert!(descriptors[0].iter().all(|&v| v == 0.0));
    }
}
