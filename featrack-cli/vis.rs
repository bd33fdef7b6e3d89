use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageError, Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};

use featrack_core::{Frame, Keypoint, Match};

use crate::runner::Combination;

const MATCH_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);
const KEYPOINT_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Renders the two frames side by side with a line per match and saves the
/// canvas as `match_<DET>_<DESC>_frames_<i>_<j>.png` under `dir`.
///
/// Purely an artifact: callers degrade failures to a warning.
pub fn save_match_image(
    previous: &Frame,
    current_image: &GrayImage,
    current_keypoints: &[Keypoint],
    matches: &[Match],
    combination: &Combination,
    frame_pair: (usize, usize),
    dir: &Path,
) -> Result<PathBuf, ImageError> {
    std::fs::create_dir_all(dir).map_err(ImageError::IoError)?;

    let left = DynamicImage::ImageLuma8(previous.image.clone()).into_rgba8();
    let right = DynamicImage::ImageLuma8(current_image.clone()).into_rgba8();
    let offset = left.width();

    let width = left.width() + right.width();
    let height = left.height().max(right.height());
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
    image::imageops::replace(&mut canvas, &left, 0, 0);
    image::imageops::replace(&mut canvas, &right, offset as i64, 0);

    for m in matches {
        let (Some(a), Some(b)) = (
            previous.keypoints.get(m.source_idx),
            current_keypoints.get(m.reference_idx),
        ) else {
            continue;
        };

        draw_hollow_circle_mut(&mut canvas, (a.x as i32, a.y as i32), 3, KEYPOINT_COLOR);
        draw_hollow_circle_mut(
            &mut canvas,
            (b.x as i32 + offset as i32, b.y as i32),
            3,
            KEYPOINT_COLOR,
        );
        draw_line_segment_mut(
            &mut canvas,
            (a.x, a.y),
            (b.x + offset as f32, b.y),
            MATCH_COLOR,
        );
    }

    let path = dir.join(format!(
        "match_{}_{}_frames_{}_{}.png",
        combination.detector, combination.descriptor, frame_pair.0, frame_pair.1
    ));
    canvas.save(&path)?;
    Ok(path)
}
