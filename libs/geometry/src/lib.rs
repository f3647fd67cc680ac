//! 2-D integer geometry for traced integrated circuit layers.
//!
//! Coordinates live on an integer grid. Drawings with floating-point
//! coordinates are quantized once (see [`snap::quantize`]), after which every
//! predicate in this crate (orientation, crossing, overlap, containment) is
//! evaluated exactly.
//!
//! # Examples
//!
//! Build a [polygon](crate::polygon::Polygon) and check its area:
//!
//! ```
//! # use geometry::prelude::*;
//! let square = Polygon::from_rect(Rect::from_sides(0, 0, 10, 10));
//! assert_eq!(square.area2(), 200);
//! ```
#![warn(missing_docs)]

extern crate self as geometry;

pub mod bbox;
pub mod contains;
pub mod curve;
pub mod intersect;
pub mod point;
pub mod polygon;
pub mod prelude;
pub mod rect;
pub mod ring;
pub mod snap;
pub mod span;
pub mod winding;
