use image::GrayImage;
use rayon::prelude::*;

use featrack_core::{DetectorKind, Keypoint};

use crate::nms;
use crate::{DetectError, DetectResult};

/// Neighborhood diameter reported for FAST keypoints (the 16-pixel test
/// circle spans 7 pixels).
const FAST_SIZE: f32 = 7.0;

// FAST requires a 3-pixel border on each side.
const MIN_SIZE: u32 = 7;

/// Minimum contiguous arc length on the 16-pixel circle.
const ARC_LENGTH: u32 = 12;

/// Whether `mask` holds a circular run of at least `length` set bits across
/// all 16 flag positions. ANDing the mask with its own rotations leaves a
/// bit set exactly where such a run starts.
fn has_contiguous_run(mask: u16, length: u32) -> bool {
    let mut acc = mask;
    for shift in 1..length {
        acc &= mask.rotate_right(shift);
        if acc == 0 {
            return false;
        }
    }
    acc != 0
}

/// Segment-test corner detector on a 16-pixel Bresenham circle.
pub struct FastDetector {
    threshold: u8,
    nms_distance: f32,
}

impl FastDetector {
    pub fn new(threshold: u8, nms_distance: f32) -> Self {
        Self {
            threshold,
            nms_distance,
        }
    }

    pub fn detect(&self, img: &GrayImage) -> DetectResult<Vec<Keypoint>> {
        let (width, height) = img.dimensions();
        if width < MIN_SIZE || height < MIN_SIZE {
            return Err(DetectError::ImageTooSmall {
                kind: DetectorKind::Fast,
                width,
                height,
                min: MIN_SIZE,
            });
        }

        const OFF: [(i32, i32); 16] = [
            (-3, 0), (-3, 1), (-2, 2), (-1, 3),
            (0, 3), (1, 3), (2, 2), (3, 1),
            (3, 0), (3, -1), (2, -2), (1, -3),
            (0, -3), (-1, -3), (-2, -2), (-3, -1),
        ];

        let w = width as usize;
        let h = height as usize;
        let px = img.as_raw();
        let threshold = self.threshold;

        let keypoints: Vec<Keypoint> = (3..h - 3)
            .into_par_iter()
            .flat_map_iter(|y| {
                let mut row = Vec::new();
                for x in 3..w - 3 {
                    let p = px[y * w + x];
                    let mut brighter_mask = 0u16;
                    let mut darker_mask = 0u16;
                    let mut brighter_sum = 0i32;
                    let mut darker_sum = 0i32;

                    for (i, &(dx, dy)) in OFF.iter().enumerate() {
                        let xx = (x as i32 + dx) as usize;
                        let yy = (y as i32 + dy) as usize;
                        let q = px[yy * w + xx];

                        if q >= p.saturating_add(threshold) {
                            brighter_mask |= 1 << i;
                            brighter_sum += q as i32 - p as i32;
                        } else if q.saturating_add(threshold) <= p {
                            darker_mask |= 1 << i;
                            darker_sum += p as i32 - q as i32;
                        }
                    }

                    // Segment test: the qualifying pixels must form one
                    // contiguous arc of at least 12 on the circle, not just
                    // any 12 of 16.
                    let bright_arc = has_contiguous_run(brighter_mask, ARC_LENGTH);
                    let dark_arc = has_contiguous_run(darker_mask, ARC_LENGTH);
                    if bright_arc || dark_arc {
                        let response = if bright_arc {
                            brighter_sum as f32 / brighter_mask.count_ones() as f32
                        } else {
                            darker_sum as f32 / darker_mask.count_ones() as f32
                        };
                        row.push(Keypoint {
                            x: x as f32,
                            y: y as f32,
                            size: FAST_SIZE,
                            response: response.abs(),
                            orientation: None,
                        });
                    }
                }
                row
            })
            .collect();

        Ok(nms::suppress(keypoints, self.nms_distance))
    }
}
