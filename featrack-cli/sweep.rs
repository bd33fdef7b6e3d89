use std::path::PathBuf;

use log::{debug, error, info};

use featrack_core::{DescriptorKind, DetectorKind, HarnessConfig, MatcherKind, SelectorKind};

use crate::error::CombinationError;
use crate::runner::{run_combination, Combination};
use crate::source::FrameSource;
use crate::stats::StatsSinks;

/// The cross product of detectors and descriptors to evaluate, plus the
/// matcher/selector pair shared by every combination.
#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub detectors: Vec<DetectorKind>,
    pub descriptors: Vec<DescriptorKind>,
    pub matcher: MatcherKind,
    pub selector: SelectorKind,
    /// When set, match visualizations are written under this directory.
    pub save_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub completed: usize,
    pub failed: usize,
}

/// Runs every admissible detector/descriptor combination over the sequence.
///
/// A combination that fails is logged and skipped; the sweep keeps going and
/// counts it in `failed`. Only an internal pipeline inconsistency aborts the
/// whole sweep.
pub fn run_sweep(
    options: &SweepOptions,
    source: &FrameSource,
    config: &HarnessConfig,
    sinks: &mut StatsSinks,
) -> Result<SweepSummary, CombinationError> {
    let mut summary = SweepSummary::default();

    for &detector in &options.detectors {
        for &descriptor in &options.descriptors {
            if let Some(required) = descriptor.required_detector() {
                if required != detector {
                    debug!(
                        "skipping {} + {}: {} descriptors need the {} detector",
                        detector, descriptor, descriptor, required
                    );
                    continue;
                }
            }

            let combination = Combination {
                detector,
                descriptor,
                matcher: options.matcher,
                selector: options.selector,
            };
            info!("testing {} + {}", detector, descriptor);

            let outcome = run_combination(
                &combination,
                source,
                config,
                sinks,
                options.save_dir.as_deref(),
            );
            sinks.flush()?;

            match outcome {
                Ok(result) => {
                    info!(
                        "{}: {} frames, {} matches",
                        combination, result.frames_processed, result.total_matches
                    );
                    summary.completed += 1;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!("{}: {}", combination, e);
                    summary.failed += 1;
                }
            }
        }
    }

    Ok(summary)
}
