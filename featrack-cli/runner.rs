use std::fmt;
use std::path::Path;

use log::{info, warn};

use featrack_core::{
    filter_keypoints, DescriptorKind, DetectorKind, Frame, FrameBuffer, HarnessConfig,
    MatcherKind, SelectorKind,
};
use featrack_match::match_descriptors;

use crate::error::CombinationError;
use crate::source::{load_grayscale, FrameSource};
use crate::stats::{KeypointStats, StatsSinks};
use crate::vis;

/// One evaluated configuration: detector, descriptor, matcher, selector.
#[derive(Debug, Clone, Copy)]
pub struct Combination {
    pub detector: DetectorKind,
    pub descriptor: DescriptorKind,
    pub matcher: MatcherKind,
    pub selector: SelectorKind,
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.detector, self.descriptor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinationOutcome {
    pub frames_processed: usize,
    pub total_matches: usize,
}

/// Runs one combination over the whole image sequence: load, detect,
/// ROI-filter, describe, match against the previous frame, record.
///
/// The frame buffer lives and dies inside this call; nothing but the
/// statistics sinks crosses combination boundaries.
pub fn run_combination(
    combination: &Combination,
    source: &FrameSource,
    config: &HarnessConfig,
    sinks: &mut StatsSinks,
    save_dir: Option<&Path>,
) -> Result<CombinationOutcome, CombinationError> {
    let mut buffer = FrameBuffer::new(config.buffer_capacity);
    let mut frames_processed = 0;
    let mut total_matches = 0;

    for (image_index, file_index) in source.indices().enumerate() {
        let path = source.path_for(file_index);
        let image = load_grayscale(&path)?;
        info!("#1 LOAD IMAGE INTO BUFFER done");

        let mut keypoints = featrack_detect::detect(&image, combination.detector)?;
        if let Some(roi) = &config.roi {
            filter_keypoints(&mut keypoints, roi);
        }
        let stats = KeypointStats::from_keypoints(&keypoints);
        sinks.record_keypoints(image_index, combination.detector, &stats)?;
        info!(
            "image {} - {}: {} keypoints (min {} max {} mean {})",
            image_index,
            combination.detector,
            stats.count,
            stats.min_size,
            stats.max_size,
            stats.mean_size
        );
        info!("#2 DETECT KEYPOINTS done");

        let descriptors = featrack_describe::extract(&image, &keypoints, combination.descriptor)?;
        if descriptors.len() != keypoints.len() {
            return Err(CombinationError::InvariantViolation {
                keypoints: keypoints.len(),
                descriptors: descriptors.len(),
            });
        }
        info!("#3 EXTRACT DESCRIPTORS done");

        // Matching pairs the new frame with the most recent retained one.
        // With capacity 1 the retained frame is about to be evicted, so no
        // pair exists.
        let mut matches = Vec::new();
        if config.buffer_capacity >= 2 {
            if let Some(previous) = buffer.latest() {
                matches = match_descriptors(
                    &previous.descriptors,
                    &descriptors,
                    combination.matcher,
                    combination.selector,
                    config.ratio_threshold,
                )?;
                sinks.record_matches(
                    image_index,
                    combination.detector,
                    combination.descriptor,
                    matches.len(),
                )?;
                total_matches += matches.len();
                info!(
                    "image {} - {}: {} matches",
                    image_index,
                    combination,
                    matches.len()
                );
                info!("#4 MATCH KEYPOINT DESCRIPTORS done");

                if let Some(dir) = save_dir {
                    if let Err(err) = vis::save_match_image(
                        previous,
                        &image,
                        &keypoints,
                        &matches,
                        combination,
                        (image_index - 1, image_index),
                        dir,
                    ) {
                        // Visualization is an artifact, not a statistic.
                        warn!("{combination}: failed to save match image: {err}");
                    }
                }
            }
        }

        buffer.push(Frame {
            image,
            keypoints,
            descriptors,
            matches,
        });
        frames_processed += 1;
    }

    Ok(CombinationOutcome {
        frames_processed,
        total_matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combination_displays_as_detector_plus_descriptor() {
        let combo = Combination {
            detector: DetectorKind::Fast,
            descriptor: DescriptorKind::Brief,
            matcher: MatcherKind::BruteForce,
            selector: SelectorKind::Nearest,
        };
        assert_eq!(combo.to_string(), "FAST+BRIEF");
    }
}
