use crate::roi::RoiRect;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fixed constants of a benchmark run. Defaults reproduce the reference
/// configuration; tests override individual fields.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HarnessConfig {
    /// Region keypoints are restricted to; `None` disables the filter.
    pub roi: Option<RoiRect>,
    /// Frame buffer capacity. 2 is just enough to pair consecutive frames.
    pub buffer_capacity: usize,
    /// Lowe ratio-test acceptance threshold.
    pub ratio_threshold: f32,
    pub n_threads: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            // Preceding-vehicle ROI of the reference image sequence.
            roi: Some(RoiRect::new(535.0, 180.0, 180.0, 150.0)),
            buffer_capacity: 2,
            ratio_threshold: 0.8,
            n_threads: num_cpus::get().max(1),
        }
    }
}

/// Initialize the global Rayon thread pool with the specified thread count.
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}
