//! Quantization of drawing coordinates onto the integer grid.

use crate::point::Point;

/// Quantizes a floating-point drawing coordinate onto the integer grid.
///
/// `resolution` is the number of grid units per drawing unit.
///
/// # Example
///
/// ```
/// # use geometry::snap::quantize;
/// # use geometry::prelude::*;
/// assert_eq!(quantize(1.2345, 2.0, 1000.0), Point::new(1235, 2000));
/// assert_eq!(quantize(-0.0004, 0.0, 1000.0), Point::new(0, 0));
/// ```
pub fn quantize(x: f64, y: f64, resolution: f64) -> Point {
    Point::new(
        (x * resolution).round() as i64,
        (y * resolution).round() as i64,
    )
}
