use image::GrayImage;
use rayon::prelude::*;

use featrack_core::{BinaryDescriptor, Keypoint, BINARY_DESCRIPTOR_BYTES};

use crate::pairs::{sampling_pairs, NUM_PAIRS};

/// Unrotated 256-bit BRIEF over the fixed sampling pattern. Bilinear,
/// border-clamped sampling keeps the output 1:1 with the input keypoints
/// even at the image edge.
pub struct BriefExtractor {
    pairs: Vec<[i8; 4]>,
}

impl BriefExtractor {
    pub fn new() -> Self {
        Self {
            pairs: sampling_pairs(),
        }
    }

    pub fn extract(&self, img: &GrayImage, keypoints: &[Keypoint]) -> Vec<BinaryDescriptor> {
        keypoints
            .par_iter()
            .map(|kp| self.describe(img, kp.x, kp.y, 0.0))
            .collect()
    }

    /// Builds one descriptor, rotating the sampling pattern by `angle`
    /// around the keypoint.
    pub(crate) fn describe(&self, img: &GrayImage, cx: f32, cy: f32, angle: f32) -> BinaryDescriptor {
        debug_assert_eq!(self.pairs.len(), NUM_PAIRS);
        let (s, c) = angle.sin_cos();
        let mut descriptor = [0u8; BINARY_DESCRIPTOR_BYTES];

        for (i, &[x1, y1, x2, y2]) in self.pairs.iter().enumerate() {
            let (rx1, ry1) = (
                cx + c * x1 as f32 - s * y1 as f32,
                cy + s * x1 as f32 + c * y1 as f32,
            );
            let (rx2, ry2) = (
                cx + c * x2 as f32 - s * y2 as f32,
                cy + s * x2 as f32 + c * y2 as f32,
            );

            let bit = (bilinear_sample(img, rx1, ry1) < bilinear_sample(img, rx2, ry2)) as u8;
            descriptor[i / 8] |= bit << (i % 8);
        }

        descriptor
    }
}

impl Default for BriefExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Bilinear interpolation with clamping at the image border.
pub(crate) fn bilinear_sample(img: &GrayImage, x: f32, y: f32) -> f32 {
    let w = img.width() as usize;
    let h = img.height() as usize;
    let px = img.as_raw();

    let x0 = x.floor();
    let y0 = y.floor();
    let x1 = x0 + 1.0;
    let y1 = y0 + 1.0;

    if x0 < 0.0 || y0 < 0.0 || x1 >= w as f32 || y1 >= h as f32 {
        let cx = x.round().clamp(0.0, (w - 1) as f32) as usize;
        let cy = y.round().clamp(0.0, (h - 1) as f32) as usize;
        return px[cy * w + cx] as f32;
    }

    let dx = x - x0;
    let dy = y - y0;

    let x0 = x0 as usize;
    let y0 = y0 as usize;
    let x1 = (x1 as usize).min(w - 1);
    let y1 = (y1 as usize).min(h - 1);

    let p00 = px[y0 * w + x0] as f32;
    let p10 = px[y0 * w + x1] as f32;
    let p01 = px[y1 * w + x0] as f32;
    let p11 = px[y1 * w + x1] as f32;

    let top = p00 * (1.0 - dx) + p10 * dx;
    let bottom = p01 * (1.0 - dx) + p11 * dx;
    top * (1.0 - dy) + bottom * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured_image() -> GrayImage {
        GrayImage::from_fn(48, 48, |x, y| {
            image::Luma([((x * 11 + y * 5) % 256) as u8])
        })
    }

    fn kp(x: f32, y: f32) -> Keypoint {
        Keypoint {
            x,
            y,
            size: 7.0,
            response: 1.0,
            orientation: None,
        }
    }

    #[test]
    fn one_descriptor_per_keypoint_including_border() {
        let img = textured_image();
        let kps = vec![kp(0.0, 0.0), kp(24.0, 24.0), kp(47.0, 47.0)];
        let descriptors = BriefExtractor::new().extract(&img, &kps);
        assert_eq!(descriptors.len(), kps.len());
    }

    #[test]
    fn extraction_is_deterministic() {
        let img = textured_image();
        let kps = vec![kp(20.0, 20.0), kp(30.0, 12.0)];
        let extractor = BriefExtractor::new();
        assert_eq!(extractor.extract(&img, &kps), extractor.extract(&img, &kps));
    }

    #[test]
    fn distinct_patches_give_distinct_descriptors() {
        let mut img = textured_image();
        // Overwrite one patch with a very different pattern.
        for y in 0..16 {
            for x in 0..16 {
                img.put_pixel(x, y, image::Luma([if x % 2 == 0 { 0 } else { 255 }]));
            }
        }
        let extractor = BriefExtractor::new();
        let d = extractor.extract(&img, &[kp(8.0, 8.0), kp(36.0, 36.0)]);
        assert_ne!(d[0], d[1]);
    }

    #[test]
    fn bilinear_sampling_interpolates() {
        let mut img = GrayImage::new(4, 4);
        img.put_pixel(1, 1, image::Luma([100u8]));
        img.put_pixel(2, 1, image::Luma([200u8]));
        let v = bilinear_sample(&img, 1.5, 1.0);
        assert!((v - 150.0).abs() < 1e-3);
    }
}
