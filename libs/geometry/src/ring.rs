//! Closed rings of vertices.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::intersect::{Crossing, Segment};
use crate::point::Point;
use crate::rect::Rect;
use crate::winding::{locate, Location};

/// A closed ring of vertices.
///
/// The last vertex connects back to the first; the closing vertex is
/// never repeated.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ring {
    points: Vec<Point>,
}

/// Rotational sense of a ring.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winding {
    /// Positive signed area.
    CounterClockwise,
    /// Negative signed area.
    Clockwise,
    /// Zero signed area.
    Degenerate,
}

impl Ring {
    /// Creates a ring from its vertices.
    ///
    /// Consecutive duplicate vertices and a repeated closing vertex are removed.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let ring = Ring::new(vec![
    ///     Point::new(0, 0),
    ///     Point::new(0, 0),
    ///     Point::new(4, 0),
    ///     Point::new(4, 4),
    ///     Point::new(0, 0),
    /// ]);
    /// assert_eq!(ring.len(), 3);
    /// ```
    pub fn new(mut points: Vec<Point>) -> Self {
        points.dedup();
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Self { points }
    }

    /// Returns the vertices of the ring.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns the number of distinct vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the ring has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Twice the signed area (shoelace formula).
    ///
    /// Positive for counter-clockwise rings.
    pub fn signed_area2(&self) -> i128 {
        let n = self.points.len();
        (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128
            })
            .sum()
    }

    /// Returns the rotational sense of the ring.
    pub fn winding(&self) -> Winding {
        match self.signed_area2().signum() {
            1 => Winding::CounterClockwise,
            -1 => Winding::Clockwise,
            _ => Winding::Degenerate,
        }
    }

    /// Returns this ring with the requested winding.
    ///
    /// Degenerate rings are returned unchanged.
    pub fn with_winding(mut self, winding: Winding) -> Self {
        let current = self.winding();
        if current != Winding::Degenerate && winding != Winding::Degenerate && current != winding
        {
            self.points.reverse();
        }
        self
    }

    /// Iterates over the edges of the ring, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| Segment::new(self.points[i], self.points[(i + 1) % n]))
    }

    /// Locates a point against this ring, ignoring its winding.
    #[inline]
    pub fn locate(&self, p: Point) -> Location {
        locate(&self.points, p)
    }

    /// Finds a location where the boundary of this ring crosses or touches
    /// itself, if any.
    ///
    /// Edges that share a vertex are only reported if they fold back over
    /// each other.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let bowtie = Ring::new(vec![
    ///     Point::new(0, 0),
    ///     Point::new(10, 10),
    ///     Point::new(10, 0),
    ///     Point::new(0, 10),
    /// ]);
    /// assert_eq!(bowtie.self_crossing(), Some(Point::new(5, 5)));
    /// ```
    pub fn self_crossing(&self) -> Option<Point> {
        let edges: Vec<Segment> = self.edges().collect();
        let n = edges.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                let crossing = edges[i].crossing(&edges[j]);
                let bad = if adjacent {
                    crossing == Crossing::Collinear
                } else {
                    crossing.meets()
                };
                if bad {
                    return edges[i].meeting_point(&edges[j]);
                }
            }
        }
        None
    }

    /// Returns `true` if any edge of `self` meets any edge of `other`.
    pub fn boundary_meets(&self, other: &Ring) -> bool {
        let (Some(a), Some(b)) = (self.bbox(), other.bbox()) else {
            return false;
        };
        if a.intersection(b).is_none() {
            return false;
        }
        self.edges()
            .any(|e| other.edges().any(|f| e.crossing(&f).meets()))
    }

    /// The shortest distance between the boundaries of two rings.
    pub fn boundary_distance(&self, other: &Ring) -> f64 {
        self.edges()
            .flat_map(|e| other.edges().map(move |f| e.distance(&f)))
            .fold(f64::INFINITY, f64::min)
    }
}

impl Bbox for Ring {
    fn bbox(&self) -> Option<Rect> {
        self.points.bbox()
    }
}

impl From<Vec<Point>> for Ring {
    fn from(value: Vec<Point>) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(l: i64, b: i64, r: i64, t: i64) -> Ring {
        Ring::new(vec![
            Point::new(l, b),
            Point::new(r, b),
            Point::new(r, t),
            Point::new(l, t),
        ])
    }

    #[test]
    fn signed_area_and_winding() {
        let sq = square(0, 0, 10, 10);
        assert_eq!(sq.signed_area2(), 200);
        assert_eq!(sq.winding(), Winding::CounterClockwise);
        let cw = sq.clone().with_winding(Winding::Clockwise);
        assert_eq!(cw.signed_area2(), -200);
        assert_eq!(
            cw.with_winding(Winding::CounterClockwise).winding(),
            Winding::CounterClockwise
        );
    }

    #[test]
    fn collinear_line_is_degenerate() {
        let line = Ring::new(vec![Point::new(0, 0), Point::new(5, 0), Point::new(10, 0)]);
        assert_eq!(line.winding(), Winding::Degenerate);
    }

    #[test]
    fn simple_rings_do_not_self_cross() {
        assert_eq!(square(0, 0, 10, 10).self_crossing(), None);
        let l_shape = Ring::new(vec![
            Point::new(0, 0),
            Point::new(20, 0),
            Point::new(20, 5),
            Point::new(5, 5),
            Point::new(5, 20),
            Point::new(0, 20),
        ]);
        assert_eq!(l_shape.self_crossing(), None);
    }

    #[test]
    fn spike_is_a_self_crossing() {
        let spike = Ring::new(vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(10, 5),
            Point::new(0, 10),
        ]);
        assert!(spike.self_crossing().is_some());
    }

    #[test]
    fn boundary_distance_between_rings() {
        let a = square(0, 0, 10, 10);
        let b = square(13, 0, 20, 10);
        assert_eq!(a.boundary_distance(&b), 3.0);
        assert!(!a.boundary_meets(&b));
        assert!(a.boundary_meets(&square(10, 0, 20, 10)));
    }
}
