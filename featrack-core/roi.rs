use crate::types::Keypoint;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in source-image pixel coordinates.
///
/// Containment is left/top inclusive and right/bottom exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoiRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RoiRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

/// Keeps only keypoints whose location lies inside `rect`. Pure with respect
/// to the retained elements: no reordering, no new elements, idempotent.
pub fn filter_keypoints(keypoints: &mut Vec<Keypoint>, rect: &RoiRect) {
    keypoints.retain(|kp| rect.contains(kp.x, kp.y));
}
