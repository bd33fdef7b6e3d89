use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// 256 test pairs fill the full 32-byte descriptor.
pub(crate) const NUM_PAIRS: usize = 256;

/// Half-width of the square sampling patch around a keypoint.
pub(crate) const PATCH_RADIUS: i8 = 15;

const PAIR_SEED: u64 = 0x1234_5678_9abc_def0;

/// The fixed BRIEF sampling pattern: `NUM_PAIRS` coordinate pairs
/// `[x1, y1, x2, y2]` drawn uniformly from the patch. The seed is a
/// constant, so the pattern is identical across runs and across the frames
/// of a run; comparing descriptors from different patterns would be
/// meaningless.
pub(crate) fn sampling_pairs() -> Vec<[i8; 4]> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(PAIR_SEED);
    (0..NUM_PAIRS)
        .map(|_| {
            let mut pair = [0i8; 4];
            for coord in &mut pair {
                *coord = rng.gen_range(-PATCH_RADIUS..=PATCH_RADIUS);
            }
            pair
        })
        .collect()
}
