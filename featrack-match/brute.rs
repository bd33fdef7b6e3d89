use crate::{NearestIndex, TwoNearest};

/// Exhaustive scan over the reference set. Works for either norm; the
/// distance function is fixed at construction.
pub(crate) struct LinearScan<'a, T> {
    refs: &'a [T],
    dist: fn(&T, &T) -> f32,
}

impl<'a, T> LinearScan<'a, T> {
    pub(crate) fn new(refs: &'a [T], dist: fn(&T, &T) -> f32) -> Self {
        Self { refs, dist }
    }
}

impl<'a, T> NearestIndex<T> for LinearScan<'a, T> {
    fn reference_len(&self) -> usize {
        self.refs.len()
    }

    fn nearest_two(&self, query: &T) -> TwoNearest {
        let mut best = TwoNearest::default();
        // Ascending index order plus strict-< replacement makes ties break
        // to the first-encountered index.
        for (idx, candidate) in self.refs.iter().enumerate() {
            best.consider(idx, (self.dist)(query, candidate));
        }
        best
    }
}
