//! Point location against closed rings using exact winding numbers.

use serde::{Deserialize, Serialize};

use crate::intersect::Segment;
use crate::point::Point;

/// Where a point lies relative to a closed shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// Strictly outside.
    Outside,
    /// On the boundary.
    Boundary,
    /// Strictly inside.
    Inside,
}

impl Location {
    /// Returns `true` for [`Location::Inside`] and [`Location::Boundary`].
    #[inline]
    pub fn is_covered(&self) -> bool {
        !matches!(self, Self::Outside)
    }
}

/// Computes the winding number of the closed ring `pts` around `p`.
///
/// The ring is implicitly closed. The result is only meaningful when `p`
/// does not lie on the ring.
pub fn winding_number(pts: &[Point], p: Point) -> i32 {
    let n = pts.len();
    let mut wn = 0;
    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        if a.y <= p.y {
            if b.y > p.y && a.cross(b, p) > 0 {
                wn += 1;
            }
        } else if b.y <= p.y && a.cross(b, p) < 0 {
            wn -= 1;
        }
    }
    wn
}

/// Locates `p` against the closed ring `pts`.
///
/// # Example
///
/// ```
/// # use geometry::prelude::*;
/// # use geometry::winding::{locate, Location};
/// let square = [
///     Point::new(0, 0),
///     Point::new(10, 0),
///     Point::new(10, 10),
///     Point::new(0, 10),
/// ];
/// assert_eq!(locate(&square, Point::new(5, 5)), Location::Inside);
/// assert_eq!(locate(&square, Point::new(10, 5)), Location::Boundary);
/// assert_eq!(locate(&square, Point::new(11, 5)), Location::Outside);
/// ```
pub fn locate(pts: &[Point], p: Point) -> Location {
    let n = pts.len();
    if n == 0 {
        return Location::Outside;
    }
    for i in 0..n {
        if Segment::new(pts[i], pts[(i + 1) % n]).contains_point(p) {
            return Location::Boundary;
        }
    }
    if winding_number(pts, p) != 0 {
        Location::Inside
    } else {
        Location::Outside
    }
}
