//! Lloyd relaxation of a stipple point set over a density field.
//!
//! Each sweep rebuilds the k-d tree, scans every grid cell to find its
//! owning point, and moves each point to the weighted centroid of its
//! cells. The scan is embarrassingly parallel: the tree is immutable
//! while in use, worker threads fold into private accumulator vectors
//! and the final reduction is the only synchronization point.

use crate::density::DensityField;
use crate::geometry::Point2D;
use crate::kdtree::KdTree;

use itertools::Itertools as _;
use nalgebra::Vector2;
use rand::Rng;
use rayon::prelude::*;

/// Per-point running totals for one sweep.
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    position_sum: Vector2<f64>,
    weight_sum: f64,
    cells: u64,
}

impl Accumulator {
    fn zero() -> Self {
        Self {
            position_sum: Vector2::zeros(),
            weight_sum: 0.0,
            cells: 0,
        }
    }

    fn add(&mut self, position: Vector2<f64>, weight: f64) {
        self.position_sum += position * weight;
        self.weight_sum += weight;
        self.cells += 1;
    }

    fn merge(&mut self, other: &Self) {
        self.position_sum += other.position_sum;
        self.weight_sum += other.weight_sum;
        self.cells += other.cells;
    }
}

/// Output of one relaxation sweep.
#[derive(Debug, Clone)]
pub struct Relaxed {
    pub points: Vec<Point2D>,
    /// Normalized per-point density in `[0, 1]` for 8-bit-derived
    /// weights; consumed by renderers only, never fed back into the
    /// algorithm.
    pub densities: Vec<f64>,
}

/// Runs one sweep of Lloyd's algorithm and returns the relaxed point
/// set, of the same cardinality and order as the input.
///
/// A point whose weight sum is zero even after self-seeding (blank
/// density everywhere it reaches) keeps its zero-weighted sum over a
/// divisor of one, which lands it on the origin; this is the expected
/// degenerate outcome for fully blank regions, not an error.
pub fn relax<F, R>(points: &[Point2D], field: &F, rng: &mut R) -> Relaxed
where
    F: DensityField + Sync + ?Sized,
    R: Rng + ?Sized,
{
    if points.is_empty() {
        return Relaxed {
            points: Vec::new(),
            densities: Vec::new(),
        };
    }

    let tree = KdTree::build(points, rng);
    let width = field.width();
    let height = field.height();

    // Self-seed every point with its own cell so a point that claims
    // no pixel during the scan keeps a finite anchor instead of
    // collapsing toward the origin.
    let mut totals: Vec<Accumulator> = points
        .iter()
        .map(|p| {
            let mut acc = Accumulator::zero();
            let (x, y) = clamped_cell(p, width, height);
            acc.add(p.coords, field.density(x, y));
            acc
        })
        .collect();

    let scanned = (0..height)
        .into_par_iter()
        .fold(
            || vec![Accumulator::zero(); points.len()],
            |mut local, y| {
                for x in 0..width {
                    let cell = Point2D::new(x as f64, y as f64);
                    if let Some(owner) = tree.nearest(&cell) {
                        local[owner.point].add(cell.coords, field.density(x, y));
                    }
                }
                local
            },
        )
        .reduce(
            || vec![Accumulator::zero(); points.len()],
            |mut left, right| {
                for (lhs, rhs) in left.iter_mut().zip_eq(&right) {
                    lhs.merge(rhs);
                }
                left
            },
        );
    for (total, scanned) in totals.iter_mut().zip_eq(&scanned) {
        total.merge(scanned);
    }

    let points = totals
        .iter()
        .map(|acc| {
            let weight = if acc.weight_sum == 0.0 {
                1.0
            } else {
                acc.weight_sum
            };
            Point2D::from(acc.position_sum / weight)
        })
        .collect();
    let densities = totals
        .iter()
        .map(|acc| acc.weight_sum / (acc.cells as f64 * 255.0))
        .collect();

    Relaxed { points, densities }
}

/// Rounds a position to its grid cell, clamped to the domain.
fn clamped_cell(p: &Point2D, width: usize, height: usize) -> (usize, usize) {
    let x = (p[0].round().max(0.0) as usize).min(width.saturating_sub(1));
    let y = (p[1].round().max(0.0) as usize).min(height.saturating_sub(1));
    (x, y)
}
