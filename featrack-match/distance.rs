use featrack_core::{BinaryDescriptor, FloatDescriptor};

/// Hamming bit-distance between two binary descriptors.
pub fn hamming(a: &BinaryDescriptor, b: &BinaryDescriptor) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum::<u32>() as f32
}

/// Euclidean (L2) distance between two float descriptors.
pub fn euclidean(a: &FloatDescriptor, b: &FloatDescriptor) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}
