//! Approximate nearest-neighbor indexes, one per descriptor class: a
//! bit-sampling LSH for Hamming space and a k-d tree for Euclidean space.
//! The pairing is fixed by the constructors' types — a continuous-space
//! index can never be built over binary descriptors, and vice versa.

use std::collections::HashMap;

use featrack_core::{BinaryDescriptor, FloatDescriptor, FLOAT_DESCRIPTOR_LEN};

use crate::distance::{euclidean, hamming};
use crate::{NearestIndex, TwoNearest};

const LSH_TABLES: usize = 4;
const LSH_KEY_BITS: usize = 16;
// Fixed table seed: identical queries must hit identical buckets run-to-run.
const LSH_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Multi-table bit-sampling locality-sensitive hash over Hamming space.
///
/// Each table keys descriptors by `LSH_KEY_BITS` sampled bit positions;
/// queries scan only the union of their buckets. When the candidate pool is
/// too small for a two-neighbor answer, the query degrades to a full scan
/// instead of returning a truncated result.
pub(crate) struct LshIndex<'a> {
    refs: &'a [BinaryDescriptor],
    tables: Vec<Table>,
}

struct Table {
    bit_positions: [usize; LSH_KEY_BITS],
    buckets: HashMap<u32, Vec<usize>>,
}

impl<'a> LshIndex<'a> {
    pub(crate) fn new(refs: &'a [BinaryDescriptor]) -> Self {
        // SplitMix64 over the fixed seed; cheap and reproducible.
        let mut state = LSH_SEED;
        let mut next = move || {
            state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
            let mut z = state;
            z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
            z ^ (z >> 31)
        };

        let tables = (0..LSH_TABLES)
            .map(|_| {
                let mut bit_positions = [0usize; LSH_KEY_BITS];
                for slot in &mut bit_positions {
                    *slot = (next() % 256) as usize;
                }
                let mut buckets: HashMap<u32, Vec<usize>> = HashMap::new();
                let table_key = |d: &BinaryDescriptor| key_for(d, &bit_positions);
                for (idx, descriptor) in refs.iter().enumerate() {
                    buckets.entry(table_key(descriptor)).or_default().push(idx);
                }
                Table {
                    bit_positions,
                    buckets,
                }
            })
            .collect();

        Self { refs, tables }
    }

    fn candidates(&self, query: &BinaryDescriptor) -> Vec<usize> {
        let mut found = Vec::new();
        for table in &self.tables {
            let key = key_for(query, &table.bit_positions);
            if let Some(bucket) = table.buckets.get(&key) {
                found.extend_from_slice(bucket);
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }
}

fn key_for(descriptor: &BinaryDescriptor, bit_positions: &[usize; LSH_KEY_BITS]) -> u32 {
    let mut key = 0u32;
    for (i, &bit) in bit_positions.iter().enumerate() {
        let set = (descriptor[bit / 8] >> (bit % 8)) & 1;
        key |= (set as u32) << i;
    }
    key
}

impl<'a> NearestIndex<BinaryDescriptor> for LshIndex<'a> {
    fn reference_len(&self) -> usize {
        self.refs.len()
    }

    fn nearest_two(&self, query: &BinaryDescriptor) -> TwoNearest {
        let candidates = self.candidates(query);
        let mut best = TwoNearest::default();
        if candidates.len() >= 2 {
            for idx in candidates {
                best.consider(idx, hamming(query, &self.refs[idx]));
            }
        } else {
            for (idx, candidate) in self.refs.iter().enumerate() {
                best.consider(idx, hamming(query, candidate));
            }
        }
        best
    }
}

/// Exact k-d tree over Euclidean space, cycling through the descriptor
/// dimensions by depth.
pub(crate) struct KdTree<'a> {
    refs: &'a [FloatDescriptor],
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

struct KdNode {
    point: usize,
    dim: usize,
    left: Option<usize>,
    right: Option<usize>,
}

impl<'a> KdTree<'a> {
    pub(crate) fn new(refs: &'a [FloatDescriptor]) -> Self {
        let mut indices: Vec<usize> = (0..refs.len()).collect();
        let mut nodes = Vec::with_capacity(refs.len());
        let root = build(refs, &mut indices, 0, &mut nodes);
        Self { refs, nodes, root }
    }

    fn search(&self, node: Option<usize>, query: &FloatDescriptor, best: &mut TwoNearest) {
        let Some(id) = node else { return };
        let node = &self.nodes[id];
        let point = &self.refs[node.point];

        best.consider(node.point, euclidean(query, point));

        let plane_delta = query[node.dim] - point[node.dim];
        let (near, far) = if plane_delta < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        self.search(near, query, best);

        // The far half-space can only help if the splitting plane is closer
        // than the current worst retained neighbor.
        let worst = match (best.first, best.second) {
            (Some(_), Some((_, d2))) => d2,
            _ => f32::INFINITY,
        };
        if plane_delta.abs() < worst {
            self.search(far, query, best);
        }
    }
}

fn build(
    refs: &[FloatDescriptor],
    indices: &mut [usize],
    depth: usize,
    nodes: &mut Vec<KdNode>,
) -> Option<usize> {
    if indices.is_empty() {
        return None;
    }
    let dim = depth % FLOAT_DESCRIPTOR_LEN;
    let median = indices.len() / 2;
    indices.select_nth_unstable_by(median, |&a, &b| {
        refs[a][dim]
            .partial_cmp(&refs[b][dim])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let point = indices[median];

    let (left_slice, rest) = indices.split_at_mut(median);
    let right_slice = &mut rest[1..];
    let left = build(refs, left_slice, depth + 1, nodes);
    let right = build(refs, right_slice, depth + 1, nodes);

    nodes.push(KdNode {
        point,
        dim,
        left,
        right,
    });
    Some(nodes.len() - 1)
}

impl<'a> NearestIndex<FloatDescriptor> for KdTree<'a> {
    fn reference_len(&self) -> usize {
        self.refs.len()
    }

    fn nearest_two(&self, query: &FloatDescriptor) -> TwoNearest {
        let mut best = TwoNearest::default();
        self.search(self.root, query, &mut best);
        best
    }
}
