//! Geometric primitives shared by the sampler, the tree and the
//! relaxation engine.

/// A 2D point with value semantics; arithmetic comes from nalgebra.
pub type Point2D = nalgebra::Point2<f64>;

/// Squared Euclidean distance between two points.
pub fn distance_sq(a: &Point2D, b: &Point2D) -> f64 {
    (a - b).norm_squared()
}
