//! A weighted Voronoi stippling library: turns the darkness of an image
//! into a point set whose local density follows the image.
//!
//! # Crate layout
//!
//! The pipeline runs in two phases over a [`DensityField`], the per-cell
//! weight function derived from image darkness:
//!
//! - [`importance_sample`] seeds an initial point set, biased toward
//!   dark cells through a fixed triangular distribution over intensity
//!   levels.
//! - [`relax`] performs one sweep of Lloyd's algorithm: it rebuilds a
//!   [`KdTree`] over the current points, assigns every grid cell to its
//!   nearest point and moves each point to the weighted centroid of the
//!   cells it owns. The grid scan is multithreaded.
//!
//! [`Stippling`] ties both phases together behind a [`Config`] and
//! yields [`Stipples`], the final points paired with a normalized
//! density each, ready for a renderer.

#![warn(missing_debug_implementations, rust_2018_idioms)]

mod density;
mod geometry;
mod kdtree;
mod lloyd;
#[cfg(feature = "image")]
mod render;
mod sample;
mod stippling;

pub use crate::density::DensityField;
pub use crate::density::GridDensity;
pub use crate::geometry::distance_sq;
pub use crate::geometry::Point2D;
pub use crate::kdtree::KdTree;
pub use crate::kdtree::Nearest;
pub use crate::lloyd::relax;
pub use crate::lloyd::Relaxed;
#[cfg(feature = "image")]
pub use crate::render::render;
pub use crate::sample::importance_sample;
pub use crate::stippling::Config;
pub use crate::stippling::Stipples;
pub use crate::stippling::Stippling;

pub use nalgebra;
pub use rayon;

use std::cmp::Ordering;
use std::fmt;

/// Common errors thrown by the pipeline.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The requested point count is zero or exceeds the number of grid
    /// cells.
    InvalidPointCount { requested: usize, available: usize },

    /// The minimum dot radius exceeds the maximum.
    RadiusRange { min: f64, max: f64 },

    /// The display scale is zero, negative or not a number.
    NonPositiveScale { scale: f64 },

    /// The density source image could not be loaded.
    #[cfg(feature = "image")]
    DensitySource(image::ImageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPointCount {
                requested,
                available,
            } => write!(
                f,
                "point count must be between 1 and {available} (got {requested})",
            ),
            Error::RadiusRange { min, max } => {
                write!(f, "minimum radius {min} exceeds maximum radius {max}")
            }
            Error::NonPositiveScale { scale } => {
                write!(f, "display scale must be positive (got {scale})")
            }
            #[cfg(feature = "image")]
            Error::DensitySource(err) => write!(f, "cannot load density source: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "image")]
            Error::DensitySource(err) => Some(err),
            _ => None,
        }
    }
}

fn partial_cmp<W>(a: &W, b: &W) -> Ordering
where
    W: PartialOrd,
{
    if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}
