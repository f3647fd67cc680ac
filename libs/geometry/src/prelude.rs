//! An import prelude that re-exports commonly used items.

pub use crate::bbox::Bbox;
pub use crate::contains::{Containment, Contains};
pub use crate::intersect::{Crossing, Intersect, Segment};
pub use crate::point::Point;
pub use crate::polygon::Polygon;
pub use crate::rect::Rect;
pub use crate::ring::{Ring, Winding};
pub use crate::span::Span;
pub use crate::winding::Location;
