//! Descriptor matching: selects the distance norm from the descriptor
//! class, the search structure from the matcher kind, and the acceptance
//! rule from the selection strategy.
//!
//! The norm mapping is total by construction: `DescriptorSet` is an enum,
//! so binary descriptors can only ever meet the Hamming-space indexes and
//! float descriptors the Euclidean-space ones.

use std::time::Instant;

use log::debug;
use thiserror::Error;

use featrack_core::{DescriptorSet, Match, MatcherKind, SelectorKind};

mod brute;
pub mod distance;
mod index;

use brute::LinearScan;
use index::{KdTree, LshIndex};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("source and reference descriptor sets have different element types")]
    ClassMismatch,
    #[error("ratio test needs at least 2 reference descriptors, got {available}")]
    InsufficientCandidates { available: usize },
}

/// The up-to-two nearest neighbors seen so far, ascending by distance.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TwoNearest {
    pub first: Option<(usize, f32)>,
    pub second: Option<(usize, f32)>,
}

impl TwoNearest {
    /// Strict `<` comparisons keep the earliest-considered index on ties.
    pub(crate) fn consider(&mut self, idx: usize, distance: f32) {
        match self.first {
            Some((_, d1)) if distance >= d1 => match self.second {
                Some((_, d2)) if distance >= d2 => {}
                _ => self.second = Some((idx, distance)),
            },
            _ => {
                self.second = self.first;
                self.first = Some((idx, distance));
            }
        }
    }
}

pub(crate) trait NearestIndex<T> {
    fn reference_len(&self) -> usize;
    fn nearest_two(&self, query: &T) -> TwoNearest;
}

/// Matches every source descriptor against the reference set.
///
/// `NEAREST` yields one match per source descriptor whenever the reference
/// set is non-empty; `RATIO_TEST` additionally requires two reference
/// candidates and discards ambiguous correspondences.
pub fn match_descriptors(
    source: &DescriptorSet,
    reference: &DescriptorSet,
    matcher: MatcherKind,
    selector: SelectorKind,
    ratio_threshold: f32,
) -> Result<Vec<Match>, MatchError> {
    let t0 = Instant::now();
    let matches = match (source, reference) {
        (DescriptorSet::Binary(a), DescriptorSet::Binary(b)) => match matcher {
            MatcherKind::BruteForce => {
                select(&LinearScan::new(b, distance::hamming), a, selector, ratio_threshold)
            }
            MatcherKind::ApproxIndex => {
                select(&LshIndex::new(b), a, selector, ratio_threshold)
            }
        },
        (DescriptorSet::Float(a), DescriptorSet::Float(b)) => match matcher {
            MatcherKind::BruteForce => {
                select(&LinearScan::new(b, distance::euclidean), a, selector, ratio_threshold)
            }
            MatcherKind::ApproxIndex => select(&KdTree::new(b), a, selector, ratio_threshold),
        },
        _ => Err(MatchError::ClassMismatch),
    }?;
    debug!(
        "{} / {} matching {}x{}: {} matches in {:.2} ms",
        matcher,
        selector,
        source.len(),
        reference.len(),
        matches.len(),
        t0.elapsed().as_secs_f64() * 1000.0
    );
    Ok(matches)
}

fn select<T, I: NearestIndex<T>>(
    index: &I,
    queries: &[T],
    selector: SelectorKind,
    ratio_threshold: f32,
) -> Result<Vec<Match>, MatchError> {
    let mut matches = Vec::with_capacity(queries.len());
    match selector {
        SelectorKind::Nearest => {
            for (source_idx, query) in queries.iter().enumerate() {
                if let Some((reference_idx, distance)) = index.nearest_two(query).first {
                    matches.push(Match {
                        source_idx,
                        reference_idx,
                        distance,
                    });
                }
            }
        }
        SelectorKind::RatioTest => {
            let available = index.reference_len();
            if available < 2 {
                return Err(MatchError::InsufficientCandidates { available });
            }
            for (source_idx, query) in queries.iter().enumerate() {
                let two = index.nearest_two(query);
                if let (Some((reference_idx, d1)), Some((_, d2))) = (two.first, two.second) {
                    if d1 < ratio_threshold * d2 {
                        matches.push(Match {
                            source_idx,
                            reference_idx,
                            distance: d1,
                        });
                    }
                }
            }
        }
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(bytes: &[u8]) -> DescriptorSet {
        DescriptorSet::Binary(
            bytes
                .iter()
                .map(|&b| {
                    let mut d = [0u8; 32];
                    d[0] = b;
                    d
                })
                .collect(),
        )
    }

    fn float(values: &[f32]) -> DescriptorSet {
        DescriptorSet::Float(
            values
                .iter()
                .map(|&v| {
                    let mut d = [0f32; 128];
                    d[0] = v;
                    d
                })
                .collect(),
        )
    }

    #[test]
    fn nearest_returns_one_match_per_source() {
        let a = binary(&[0b0001, 0b0010, 0b1000]);
        let b = binary(&[0b0001, 0b1111]);
        let matches =
            match_descriptors(&a, &b, MatcherKind::BruteForce, SelectorKind::Nearest, 0.8)
                .unwrap();
        assert_eq!(matches.len(), 3);

        let mut sources: Vec<usize> = matches.iter().map(|m| m.source_idx).collect();
        sources.sort_unstable();
        sources.dedup();
        assert_eq!(sources.len(), 3, "a source index was matched twice");
    }

    #[test]
    fn nearest_with_empty_reference_returns_no_matches() {
        let a = binary(&[0b0001]);
        let b = binary(&[]);
        let matches =
            match_descriptors(&a, &b, MatcherKind::BruteForce, SelectorKind::Nearest, 0.8)
                .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn nearest_with_empty_source_returns_no_matches() {
        let a = binary(&[]);
        let b = binary(&[0b0001]);
        let matches =
            match_descriptors(&a, &b, MatcherKind::BruteForce, SelectorKind::Nearest, 0.8)
                .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn nearest_ties_break_to_first_reference() {
        let a = binary(&[0b0000]);
        let b = binary(&[0b0001, 0b0001]);
        let matches =
            match_descriptors(&a, &b, MatcherKind::BruteForce, SelectorKind::Nearest, 0.8)
                .unwrap();
        assert_eq!(matches[0].reference_idx, 0);
    }

    #[test]
    fn ratio_test_discards_ambiguous_matches() {
        // Both references are at distance 1 from the query: d1 == d2, so
        // d1 < 0.8 * d2 fails and the match is dropped.
        let a = binary(&[0b0000]);
        let b = binary(&[0b0001, 0b0010]);
        let matches =
            match_descriptors(&a, &b, MatcherKind::BruteForce, SelectorKind::RatioTest, 0.8)
                .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn ratio_test_accepts_unambiguous_matches() {
        // d1 = 1, d2 = 8: clearly separated.
        let a = binary(&[0b0000]);
        let b = binary(&[0b0001, 0b1111_1111]);
        let matches =
            match_descriptors(&a, &b, MatcherKind::BruteForce, SelectorKind::RatioTest, 0.8)
                .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].reference_idx, 0);
        assert_eq!(matches[0].distance, 1.0);
    }

    #[test]
    fn ratio_test_never_violates_the_threshold() {
        let a = binary(&[0b0000, 0b1010, 0b0110, 0b1111]);
        let b = binary(&[0b0001, 0b0011, 0b0111, 0b1110]);
        for matcher in [MatcherKind::BruteForce, MatcherKind::ApproxIndex] {
            let matches =
                match_descriptors(&a, &b, matcher, SelectorKind::RatioTest, 0.8).unwrap();
            let DescriptorSet::Binary(queries) = &a else { unreachable!() };
            let DescriptorSet::Binary(refs) = &b else { unreachable!() };
            for m in matches {
                // Recompute the two nearest distances exhaustively.
                let mut dists: Vec<f32> = refs
                    .iter()
                    .map(|r| distance::hamming(&queries[m.source_idx], r))
                    .collect();
                dists.sort_by(|x, y| x.partial_cmp(y).unwrap());
                assert!(dists[0] < 0.8 * dists[1]);
            }
        }
    }

    #[test]
    fn ratio_test_requires_two_candidates() {
        let a = binary(&[0b0001]);
        for reference in [binary(&[]), binary(&[0b0001])] {
            let err = match_descriptors(
                &a,
                &reference,
                MatcherKind::BruteForce,
                SelectorKind::RatioTest,
                0.8,
            )
            .unwrap_err();
            assert!(matches!(err, MatchError::InsufficientCandidates { .. }));
        }
    }

    #[test]
    fn float_descriptors_use_euclidean_distance() {
        let a = float(&[0.0]);
        let b = float(&[3.0, -4.0]);
        let matches =
            match_descriptors(&a, &b, MatcherKind::BruteForce, SelectorKind::Nearest, 0.8)
                .unwrap();
        assert_eq!(matches[0].reference_idx, 0);
        assert!((matches[0].distance - 3.0).abs() < 1e-6);
    }

    #[test]
    fn approx_index_matches_brute_force_on_float_sets() {
        let values: Vec<f32> = (0..30).map(|i| (i as f32) * 0.37).collect();
        let queries: Vec<f32> = (0..5).map(|i| (i as f32) * 1.1 + 0.2).collect();
        let a = float(&queries);
        let b = float(&values);
        let exact =
            match_descriptors(&a, &b, MatcherKind::BruteForce, SelectorKind::Nearest, 0.8)
                .unwrap();
        let approx =
            match_descriptors(&a, &b, MatcherKind::ApproxIndex, SelectorKind::Nearest, 0.8)
                .unwrap();
        assert_eq!(exact.len(), approx.len());
        for (e, x) in exact.iter().zip(approx.iter()) {
            assert!((e.distance - x.distance).abs() < 1e-6);
        }
    }

    #[test]
    fn mixed_classes_are_a_configuration_error() {
        let a = binary(&[0b0001]);
        let b = float(&[1.0]);
        assert_eq!(
            match_descriptors(&a, &b, MatcherKind::BruteForce, SelectorKind::Nearest, 0.8),
            Err(MatchError::ClassMismatch)
        );
    }
}
