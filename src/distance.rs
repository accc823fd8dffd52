//! Euclidean distance kernels
//!
//! The flat index ranks by squared L2 and only takes the square root for the
//! distances it hands back; the ordering is identical.

/// Compute squared Euclidean distance between two equal-length slices
#[inline]
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Compute Euclidean (L2) distance between two equal-length slices
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    squared_euclidean(a, b).sqrt()
}
