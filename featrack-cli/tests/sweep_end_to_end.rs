use std::fs;
use std::path::Path;

use image::{GrayImage, Luma};
use tempfile::tempdir;

use featrack_cli::{run_sweep, FrameSource, StatsSinks, SweepOptions};
use featrack_core::{
    DescriptorKind, DetectorKind, HarnessConfig, MatcherKind, RoiRect, SelectorKind,
};

const BLOBS: &[(u32, u32)] = &[(12, 12), (40, 14), (16, 44), (44, 40), (30, 28)];

/// Dark frame with a handful of bright square blobs, enough contrast for
/// every detector to fire on the blob corners.
fn blob_frame() -> GrayImage {
    let mut img = GrayImage::from_pixel(64, 64, Luma([50u8]));
    for &(bx, by) in BLOBS {
        for dy in 0..5 {
            for dx in 0..5 {
                img.put_pixel(bx + dx, by + dy, Luma([255u8]));
            }
        }
    }
    img
}

fn write_frames(dir: &Path, indices: &[usize]) {
    let frame = blob_frame();
    for &i in indices {
        frame.save(dir.join(format!("{:04}.png", i))).unwrap();
    }
}

fn source(dir: &Path, start: usize, end: usize) -> FrameSource {
    FrameSource {
        dir: dir.to_path_buf(),
        prefix: String::new(),
        pad_width: 4,
        extension: "png".to_string(),
        start,
        end,
    }
}

fn test_config() -> HarnessConfig {
    HarnessConfig {
        roi: None,
        buffer_capacity: 2,
        ratio_threshold: 0.8,
        n_threads: 1,
    }
}

fn csv_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn single_combination_logs_every_frame() {
    let image_dir = tempdir().unwrap();
    let output_dir = tempdir().unwrap();
    write_frames(image_dir.path(), &[0, 1, 2]);

    let mut sinks = StatsSinks::create(output_dir.path()).unwrap();
    let options = SweepOptions {
        detectors: vec![DetectorKind::Fast],
        descriptors: vec![DescriptorKind::Brief],
        matcher: MatcherKind::BruteForce,
        selector: SelectorKind::Nearest,
        save_dir: None,
    };

    let summary = run_sweep(
        &options,
        &source(image_dir.path(), 0, 2),
        &test_config(),
        &mut sinks,
    )
    .unwrap();
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, 0);

    let keypoint_lines = csv_lines(sinks.keypoint_log_path());
    assert_eq!(
        keypoint_lines[0],
        "ImageIndex,DetectorType,NumKeypoints,MinSize,MaxSize,MeanSize"
    );
    assert_eq!(keypoint_lines.len(), 4, "header plus one row per frame");
    for (row, index) in keypoint_lines[1..].iter().zip(0..) {
        assert!(row.starts_with(&format!("{},FAST,", index)), "row: {}", row);
    }

    let match_lines = csv_lines(sinks.match_log_path());
    assert_eq!(
        match_lines[0],
        "ImageIndex,DetectorType,DescriptorType,NumMatches"
    );
    assert_eq!(match_lines.len(), 3, "header plus one row per frame pair");
    let keypoint_counts: Vec<usize> = keypoint_lines[1..]
        .iter()
        .map(|r| r.split(',').nth(2).unwrap().parse().unwrap())
        .collect();
    for (pair, row) in match_lines[1..].iter().enumerate() {
        let matches: usize = row.rsplit(',').next().unwrap().parse().unwrap();
        assert!(matches > 0, "identical frames should always match: {}", row);
        let smaller = keypoint_counts[pair].min(keypoint_counts[pair + 1]);
        assert!(matches <= smaller, "more matches than keypoints: {}", row);
    }
}

#[test]
fn failed_combination_does_not_abort_the_sweep() {
    let image_dir = tempdir().unwrap();
    let output_dir = tempdir().unwrap();
    // Frame 2 is deliberately missing.
    write_frames(image_dir.path(), &[0, 1, 3]);

    let mut sinks = StatsSinks::create(output_dir.path()).unwrap();
    let options = SweepOptions {
        detectors: vec![DetectorKind::Fast, DetectorKind::ShiTomasi],
        descriptors: vec![DescriptorKind::Brief],
        matcher: MatcherKind::BruteForce,
        selector: SelectorKind::Nearest,
        save_dir: None,
    };

    let summary = run_sweep(
        &options,
        &source(image_dir.path(), 0, 3),
        &test_config(),
        &mut sinks,
    )
    .unwrap();
    assert_eq!(summary.completed, 0);
    assert_eq!(summary.failed, 2);

    // Both combinations got through frames 0 and 1 before the bad load.
    let keypoint_lines = csv_lines(sinks.keypoint_log_path());
    assert_eq!(keypoint_lines.len(), 5);
    let fast_rows = keypoint_lines[1..]
        .iter()
        .filter(|r| r.contains(",FAST,"))
        .count();
    let shitomasi_rows = keypoint_lines[1..]
        .iter()
        .filter(|r| r.contains(",SHITOMASI,"))
        .count();
    assert_eq!(fast_rows, 2);
    assert_eq!(shitomasi_rows, 2);
}

#[test]
fn oriented_descriptor_is_skipped_without_its_detector() {
    let image_dir = tempdir().unwrap();
    let output_dir = tempdir().unwrap();
    write_frames(image_dir.path(), &[0, 1]);

    let mut sinks = StatsSinks::create(output_dir.path()).unwrap();
    let options = SweepOptions {
        detectors: vec![DetectorKind::Fast],
        descriptors: vec![DescriptorKind::Orb, DescriptorKind::Brief],
        matcher: MatcherKind::BruteForce,
        selector: SelectorKind::Nearest,
        save_dir: None,
    };

    let summary = run_sweep(
        &options,
        &source(image_dir.path(), 0, 1),
        &test_config(),
        &mut sinks,
    )
    .unwrap();
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, 0);

    let match_log = fs::read_to_string(sinks.match_log_path()).unwrap();
    assert!(!match_log.contains("ORB"), "skipped pairing left rows behind");
    assert!(match_log.contains("BRIEF"));
}

#[test]
fn roi_crop_restricts_keypoints_to_the_window() {
    let image_dir = tempdir().unwrap();
    let output_dir = tempdir().unwrap();
    write_frames(image_dir.path(), &[0, 1]);

    let mut sinks = StatsSinks::create(output_dir.path()).unwrap();
    let options = SweepOptions {
        detectors: vec![DetectorKind::Fast],
        descriptors: vec![DescriptorKind::Brief],
        matcher: MatcherKind::BruteForce,
        selector: SelectorKind::Nearest,
        save_dir: None,
    };
    // Window around the (30, 28) blob only.
    let config = HarnessConfig {
        roi: Some(RoiRect::new(24.0, 22.0, 16.0, 16.0)),
        ..test_config()
    };

    run_sweep(
        &options,
        &source(image_dir.path(), 0, 1),
        &config,
        &mut sinks,
    )
    .unwrap();

    let cropped: usize = csv_lines(sinks.keypoint_log_path())[1..]
        .iter()
        .map(|r| r.split(',').nth(2).unwrap().parse::<usize>().unwrap())
        .sum();

    let full_dir = output_dir.path().join("full");
    fs::create_dir_all(&full_dir).unwrap();
    let mut full_sinks = StatsSinks::create(&full_dir).unwrap();
    run_sweep(
        &options,
        &source(image_dir.path(), 0, 1),
        &test_config(),
        &mut full_sinks,
    )
    .unwrap();
    let full: usize = csv_lines(full_sinks.keypoint_log_path())[1..]
        .iter()
        .map(|r| r.split(',').nth(2).unwrap().parse::<usize>().unwrap())
        .sum();

    assert!(cropped < full, "cropped {} vs full {}", cropped, full);
    assert!(cropped > 0, "the window still covers one blob");
}

#[test]
fn save_flag_writes_one_image_per_frame_pair() {
    let image_dir = tempdir().unwrap();
    let output_dir = tempdir().unwrap();
    write_frames(image_dir.path(), &[0, 1, 2]);

    let save_dir = output_dir.path().join("matches");
    let mut sinks = StatsSinks::create(output_dir.path()).unwrap();
    let options = SweepOptions {
        detectors: vec![DetectorKind::Fast],
        descriptors: vec![DescriptorKind::Brief],
        matcher: MatcherKind::BruteForce,
        selector: SelectorKind::Nearest,
        save_dir: Some(save_dir.clone()),
    };

    run_sweep(
        &options,
        &source(image_dir.path(), 0, 2),
        &test_config(),
        &mut sinks,
    )
    .unwrap();

    let saved: Vec<_> = fs::read_dir(&save_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(saved.len(), 2);
    assert!(saved.contains(&"match_FAST_BRIEF_frames_0_1.png".to_string()));
    assert!(saved.contains(&"match_FAST_BRIEF_frames_1_2.png".to_string()));
}
