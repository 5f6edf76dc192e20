//! End-to-end stippling pipeline: validate, sample, then relax.

use crate::density::DensityField;
use crate::geometry::Point2D;
use crate::lloyd;
use crate::sample;
use crate::Error;

use rand::Rng;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Pipeline parameters.
///
/// The defaults match the values recommended for a ~10⁵-cell
/// photograph: 10 000 points, 100 sweeps, dot radii between 4 and 7
/// pixels, rendered at 3× the input size.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Number of stipple points; at most one per grid cell.
    pub point_count: usize,
    /// Relaxation sweeps; zero keeps the sampled set untouched.
    pub iterations: usize,
    /// Dot radius of a fully light point.
    pub min_radius: f64,
    /// Dot radius of a fully dark point.
    pub max_radius: f64,
    /// Output canvas scale relative to the input grid.
    pub display_scale: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            point_count: 10_000,
            iterations: 100,
            min_radius: 4.0,
            max_radius: 7.0,
            display_scale: 3.0,
        }
    }
}

impl Config {
    /// Checks the parameters against a field of `available` cells;
    /// fails before any sampling or tree work begins.
    pub fn validate(&self, available: usize) -> Result<(), Error> {
        if self.point_count == 0 || self.point_count > available {
            return Err(Error::InvalidPointCount {
                requested: self.point_count,
                available,
            });
        }
        if self.min_radius > self.max_radius {
            return Err(Error::RadiusRange {
                min: self.min_radius,
                max: self.max_radius,
            });
        }
        if !(self.display_scale > 0.0) {
            return Err(Error::NonPositiveScale {
                scale: self.display_scale,
            });
        }
        Ok(())
    }
}

/// The final ordered point set with one normalized density per point.
#[derive(Debug, Clone)]
pub struct Stipples {
    pub points: Vec<Point2D>,
    pub densities: Vec<f64>,
}

/// Runs importance sampling followed by repeated Lloyd relaxation.
///
/// # Example
///
/// ```rust
/// use stipple::{Config, GridDensity, Stippling};
///
/// let field = GridDensity::from_fn(64, 64, |x, _| (4 * x) as f64);
/// let mut stippling = Stippling::new(
///     Config { point_count: 200, iterations: 3, ..Config::default() },
///     rand::thread_rng(),
/// );
/// let stipples = stippling.run(&field)?;
/// assert_eq!(stipples.points.len(), 200);
/// # Ok::<(), stipple::Error>(())
/// ```
#[derive(Debug)]
pub struct Stippling<R> {
    pub config: Config,
    pub rng: R,
    /// Polled between sweeps; once raised, the most recently completed
    /// point set is returned.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl<R> Stippling<R>
where
    R: Rng,
{
    pub fn new(config: Config, rng: R) -> Self {
        Self {
            config,
            rng,
            cancel: None,
        }
    }

    pub fn run<F>(&mut self, field: &F) -> Result<Stipples, Error>
    where
        F: DensityField + Sync + ?Sized,
    {
        self.config.validate(field.width() * field.height())?;

        let mut points = sample::importance_sample(field, self.config.point_count, &mut self.rng)?;
        // Sampled cells have integer coordinates, so this indexes the
        // field exactly; replaced by scan output as soon as one sweep
        // runs.
        let mut densities: Vec<f64> = points
            .iter()
            .map(|p| (field.density(p[0] as usize, p[1] as usize) / 255.0).clamp(0.0, 1.0))
            .collect();

        for iteration in 0..self.config.iterations {
            if self.cancelled() {
                tracing::info!(iteration, "stippling cancelled");
                break;
            }
            let relaxed = lloyd::relax(&points, field, &mut self.rng);
            let max_move = points
                .iter()
                .zip(&relaxed.points)
                .map(|(old, new)| (old - new).norm())
                .fold(0.0, f64::max);
            tracing::info!(iteration, max_move, "relaxation sweep");
            points = relaxed.points;
            densities = relaxed.densities;
        }

        Ok(Stipples { points, densities })
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |cancel| cancel.load(Ordering::Relaxed))
    }
}
