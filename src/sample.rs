//! Density-biased initial sampling.
//!
//! Cells are bucketed by quantized intensity level; each draw maps a
//! uniform variate through the closed-form inverse CDF of a fixed
//! triangular distribution over the 0–255 range, so dark levels are
//! favored quadratically over light ones regardless of how the levels
//! are actually distributed in the input.

use crate::density::DensityField;
use crate::geometry::Point2D;
use crate::Error;

use rand::Rng;
use std::collections::BTreeMap;

/// Sum of the triangular weights `level + 1` over levels 1..=255;
/// scaling a uniform variate by it keeps the inverse CDF below 256.
const TRIANGLE_TOTAL: f64 = 32895.0;

/// Draws `point_count` distinct grid cells, biased toward dark ones.
///
/// Cells quantizing to level 0 only participate when the darker levels
/// cannot satisfy the request on their own.
pub fn importance_sample<F, R>(
    field: &F,
    point_count: usize,
    rng: &mut R,
) -> Result<Vec<Point2D>, Error>
where
    F: DensityField + ?Sized,
    R: Rng + ?Sized,
{
    let available = field.width() * field.height();
    if point_count == 0 || point_count > available {
        return Err(Error::InvalidPointCount {
            requested: point_count,
            available,
        });
    }

    let mut buckets: BTreeMap<u8, Vec<(u32, u32)>> = BTreeMap::new();
    for y in 0..field.height() {
        for x in 0..field.width() {
            let level = quantize(field.density(x, y));
            buckets
                .entry(level)
                .or_default()
                .push((x as u32, y as u32));
        }
    }

    let shaded: usize = buckets
        .iter()
        .filter(|(level, _)| **level > 0)
        .map(|(_, bucket)| bucket.len())
        .sum();
    if point_count <= shaded {
        buckets.remove(&0);
    }

    let mut points = Vec::with_capacity(point_count);
    for _ in 0..point_count {
        let r: f64 = rng.gen();
        let level = (((1.0 + 8.0 * TRIANGLE_TOTAL * r).sqrt() - 1.0) / 2.0).floor() as u8;
        let key = nearest_key(&buckets, level);
        let bucket = buckets.get_mut(&key).unwrap(); // nearest_key only returns present keys
        let (x, y) = bucket.pop().unwrap(); // emptied buckets are removed below
        if bucket.is_empty() {
            buckets.remove(&key);
        }
        points.push(Point2D::new(f64::from(x), f64::from(y)));
    }
    Ok(points)
}

fn quantize(weight: f64) -> u8 {
    weight.round().clamp(0.0, 255.0) as u8
}

/// Nearest intensity key still holding cells; exact middles resolve to
/// the lighter side.
fn nearest_key(buckets: &BTreeMap<u8, Vec<(u32, u32)>>, level: u8) -> u8 {
    let below = buckets.range(..=level).next_back().map(|(k, _)| *k);
    let above = buckets.range(level..).next().map(|(k, _)| *k);
    match (below, above) {
        (Some(b), Some(a)) => {
            if level - b <= a - level {
                b
            } else {
                a
            }
        }
        (Some(b), None) => b,
        (None, Some(a)) => a,
        // point_count <= available keeps at least one bucket alive.
        (None, None) => unreachable!("no intensity buckets left"),
    }
}
