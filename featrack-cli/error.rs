use std::path::PathBuf;

use thiserror::Error;

use featrack_describe::DescribeError;
use featrack_detect::DetectError;
use featrack_match::MatchError;

/// Everything that can end a single combination run.
///
/// The sweep orchestrator suppresses all of these and moves on to the next
/// combination, with one exception: `InvariantViolation` signals a broken
/// internal contract rather than bad input and aborts the whole sweep.
#[derive(Debug, Error)]
pub enum CombinationError {
    #[error("could not load image '{}': {source}", path.display())]
    Resource {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Describe(#[from] DescribeError),
    #[error(transparent)]
    Matching(#[from] MatchError),
    #[error("descriptor count {descriptors} does not match keypoint count {keypoints}")]
    InvariantViolation { keypoints: usize, descriptors: usize },
    #[error("failed to write statistics log: {0}")]
    Stats(#[from] std::io::Error),
}

impl CombinationError {
    /// Whether this error must abort the whole sweep instead of only the
    /// current combination.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CombinationError::InvariantViolation { .. })
    }
}
