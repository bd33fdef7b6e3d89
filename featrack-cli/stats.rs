use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use featrack_core::{DescriptorKind, DetectorKind, Keypoint};

/// Per-frame keypoint summary: count plus min/max/mean neighborhood size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeypointStats {
    pub count: usize,
    pub min_size: f32,
    pub max_size: f32,
    pub mean_size: f32,
}

impl KeypointStats {
    pub fn from_keypoints(keypoints: &[Keypoint]) -> Self {
        if keypoints.is_empty() {
            return Self {
                count: 0,
                min_size: 0.0,
                max_size: 0.0,
                mean_size: 0.0,
            };
        }
        let mut min = f32::MAX;
        let mut max = 0.0f32;
        let mut sum = 0.0f32;
        for kp in keypoints {
            min = min.min(kp.size);
            max = max.max(kp.size);
            sum += kp.size;
        }
        Self {
            count: keypoints.len(),
            min_size: min,
            max_size: max,
            mean_size: sum / keypoints.len() as f32,
        }
    }
}

/// The two append-only CSV sinks of the sweep. Rows are written through a
/// buffered writer and flushed after every combination, so rows from
/// completed work survive any later failure.
#[derive(Debug)]
pub struct StatsSinks {
    keypoint_log: BufWriter<File>,
    match_log: BufWriter<File>,
    keypoint_path: PathBuf,
    match_path: PathBuf,
}

impl StatsSinks {
    /// Creates both logs under `output_dir` and writes the header rows.
    pub fn create(output_dir: &Path) -> io::Result<Self> {
        let keypoint_path = output_dir.join("keypoint_log.csv");
        let match_path = output_dir.join("match_log.csv");

        let mut keypoint_log = BufWriter::new(File::create(&keypoint_path)?);
        let mut match_log = BufWriter::new(File::create(&match_path)?);
        writeln!(
            keypoint_log,
            "ImageIndex,DetectorType,NumKeypoints,MinSize,MaxSize,MeanSize"
        )?;
        writeln!(match_log, "ImageIndex,DetectorType,DescriptorType,NumMatches")?;

        Ok(Self {
            keypoint_log,
            match_log,
            keypoint_path,
            match_path,
        })
    }

    pub fn record_keypoints(
        &mut self,
        image_index: usize,
        detector: DetectorKind,
        stats: &KeypointStats,
    ) -> io::Result<()> {
        writeln!(
            self.keypoint_log,
            "{},{},{},{},{},{}",
            image_index, detector, stats.count, stats.min_size, stats.max_size, stats.mean_size
        )
    }

    pub fn record_matches(
        &mut self,
        image_index: usize,
        detector: DetectorKind,
        descriptor: DescriptorKind,
        num_matches: usize,
    ) -> io::Result<()> {
        writeln!(
            self.match_log,
            "{},{},{},{}",
            image_index, detector, descriptor, num_matches
        )
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.keypoint_log.flush()?;
        self.match_log.flush()
    }

    pub fn keypoint_log_path(&self) -> &Path {
        &self.keypoint_path
    }

    pub fn match_log_path(&self) -> &Path {
        &self.match_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(size: f32) -> Keypoint {
        Keypoint {
            x: 0.0,
            y: 0.0,
            size,
            response: 0.0,
            orientation: None,
        }
    }

    #[test]
    fn stats_over_some_keypoints() {
        let stats = KeypointStats::from_keypoints(&[kp(2.0), kp(6.0), kp(4.0)]);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min_size, 2.0);
        assert_eq!(stats.max_size, 6.0);
        assert_eq!(stats.mean_size, 4.0);
    }

    #[test]
    fn empty_keypoints_report_zeroes() {
        let stats = KeypointStats::from_keypoints(&[]);
        assert_eq!(
            stats,
            KeypointStats {
                count: 0,
                min_size: 0.0,
                max_size: 0.0,
                mean_size: 0.0
            }
        );
    }
}
