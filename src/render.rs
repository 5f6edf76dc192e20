//! Rasterization of a stippled point set into an RGB image.

use crate::stippling::Config;
use crate::stippling::Stipples;

use image::Rgb;
use image::RgbImage;
use itertools::Itertools as _;

const INK: Rgb<u8> = Rgb([0, 0, 0]);
const PAPER: Rgb<u8> = Rgb([255, 255, 255]);

/// Draws one filled black circle per stipple on a white canvas of
/// `(width · scale, height · scale)` pixels, rounded. The dot radius
/// grows linearly from `min_radius` to `max_radius` with the point's
/// normalized density.
pub fn render(stipples: &Stipples, width: usize, height: usize, config: &Config) -> RgbImage {
    let scale = config.display_scale;
    let canvas_width = (width as f64 * scale).round() as u32;
    let canvas_height = (height as f64 * scale).round() as u32;
    let mut canvas = RgbImage::from_pixel(canvas_width, canvas_height, PAPER);

    for (point, density) in stipples.points.iter().zip_eq(&stipples.densities) {
        let radius = config.min_radius + density * (config.max_radius - config.min_radius);
        fill_circle(&mut canvas, point[0] * scale, point[1] * scale, radius);
    }
    canvas
}

fn fill_circle(canvas: &mut RgbImage, cx: f64, cy: f64, radius: f64) {
    let x_min = (cx - radius).floor().max(0.0) as u32;
    let y_min = (cy - radius).floor().max(0.0) as u32;
    let x_max = ((cx + radius).ceil().max(0.0) as u32).min(canvas.width().saturating_sub(1));
    let y_max = ((cy + radius).ceil().max(0.0) as u32).min(canvas.height().saturating_sub(1));
    for y in y_min..=y_max {
        for x in x_min..=x_max {
            let dx = f64::from(x) - cx;
            let dy = f64::from(y) - cy;
            if dx * dx + dy * dy <= radius * radius {
                canvas.put_pixel(x, y, INK);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2D;

    fn one_stipple(x: f64, y: f64, density: f64) -> Stipples {
        Stipples {
            points: vec![Point2D::new(x, y)],
            densities: vec![density],
        }
    }

    fn config(min_radius: f64, max_radius: f64, display_scale: f64) -> Config {
        Config {
            min_radius,
            max_radius,
            display_scale,
            ..Config::default()
        }
    }

    #[test]
    fn canvas_matches_scaled_dimensions() {
        let canvas = render(&one_stipple(1.0, 1.0, 0.5), 10, 6, &config(1.0, 2.0, 3.0));
        assert_eq!(canvas.dimensions(), (30, 18));
    }

    #[test]
    fn dot_center_is_inked_and_far_corner_stays_white() {
        let canvas = render(&one_stipple(5.0, 5.0, 1.0), 20, 20, &config(2.0, 4.0, 1.0));
        assert_eq!(*canvas.get_pixel(5, 5), INK);
        assert_eq!(*canvas.get_pixel(19, 19), PAPER);
    }

    #[test]
    fn radius_interpolates_between_bounds() {
        // Density 0 inks min_radius; density 1 reaches max_radius.
        let light = render(&one_stipple(8.0, 8.0, 0.0), 16, 16, &config(1.0, 5.0, 1.0));
        assert_eq!(*light.get_pixel(9, 8), INK);
        assert_eq!(*light.get_pixel(12, 8), PAPER);

        let dark = render(&one_stipple(8.0, 8.0, 1.0), 16, 16, &config(1.0, 5.0, 1.0));
        assert_eq!(*dark.get_pixel(12, 8), INK);
        assert_eq!(*dark.get_pixel(14, 8), PAPER);
    }

    #[test]
    fn dots_near_the_border_are_clipped() {
        let canvas = render(&one_stipple(0.0, 0.0, 1.0), 8, 8, &config(3.0, 3.0, 1.0));
        assert_eq!(*canvas.get_pixel(0, 0), INK);
        assert_eq!(canvas.dimensions(), (8, 8));
    }
}
