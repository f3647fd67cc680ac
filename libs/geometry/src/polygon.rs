//! Integer coordinate polygons with holes.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::contains::{Containment, Contains};
use crate::point::Point;
use crate::rect::Rect;
use crate::ring::{Ring, Winding};
use crate::winding::Location;

/// A polygon with an outer boundary and zero or more holes.
///
/// [`Polygon::orient`] normalizes the outer ring to counter-clockwise and
/// every hole to clockwise.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Polygon {
    outer: Ring,
    holes: Vec<Ring>,
}

impl Polygon {
    /// Creates a polygon with given vertices and no holes.
    pub fn from_verts(vec: Vec<Point>) -> Self {
        Self {
            outer: Ring::new(vec),
            holes: Vec::new(),
        }
    }

    /// Creates a polygon from an outer ring and its holes.
    pub fn with_holes(outer: Ring, holes: Vec<Ring>) -> Self {
        Self { outer, holes }
    }

    /// Creates a counter-clockwise polygon covering `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        Self::from_verts(rect.corners().to_vec())
    }

    /// Returns the outer ring.
    #[inline]
    pub fn outer(&self) -> &Ring {
        &self.outer
    }

    /// Returns the holes.
    #[inline]
    pub fn holes(&self) -> &[Ring] {
        &self.holes
    }

    /// Returns the vertices of the outer ring.
    #[inline]
    pub fn points(&self) -> &[Point] {
        self.outer.points()
    }

    /// Iterates over every ring, outer first.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Adds a hole.
    pub fn push_hole(&mut self, hole: Ring) {
        self.holes.push(hole);
    }

    /// Twice the unsigned area enclosed by the polygon, net of its holes.
    pub fn area2(&self) -> i128 {
        self.outer.signed_area2().abs()
            - self
                .holes
                .iter()
                .map(|h| h.signed_area2().abs())
                .sum::<i128>()
    }

    /// The enclosed area, in squared grid units.
    pub fn area(&self) -> f64 {
        self.area2() as f64 / 2.0
    }

    /// Normalizes ring orientation: outer counter-clockwise, holes clockwise.
    ///
    /// Applying this twice is the same as applying it once.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let cw = Polygon::from_verts(vec![
    ///     Point::new(0, 0),
    ///     Point::new(0, 10),
    ///     Point::new(10, 10),
    ///     Point::new(10, 0),
    /// ]);
    /// let once = cw.orient();
    /// assert_eq!(once.outer().winding(), Winding::CounterClockwise);
    /// assert_eq!(once.clone().orient(), once);
    /// ```
    pub fn orient(self) -> Self {
        Self {
            outer: self.outer.with_winding(Winding::CounterClockwise),
            holes: self
                .holes
                .into_iter()
                .map(|h| h.with_winding(Winding::Clockwise))
                .collect(),
        }
    }

    /// Locates a point against the polygon, respecting holes.
    pub fn locate(&self, p: Point) -> Location {
        match self.outer.locate(p) {
            Location::Outside => Location::Outside,
            Location::Boundary => Location::Boundary,
            Location::Inside => {
                for hole in &self.holes {
                    match hole.locate(p) {
                        Location::Inside => return Location::Outside,
                        Location::Boundary => return Location::Boundary,
                        Location::Outside => {}
                    }
                }
                Location::Inside
            }
        }
    }

    /// Returns `true` if the two closed polygons share at least one point.
    ///
    /// Touching boundaries count as overlap.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let a = Polygon::from_rect(Rect::from_sides(0, 0, 10, 10));
    /// let b = Polygon::from_rect(Rect::from_sides(10, 0, 20, 10));
    /// let c = Polygon::from_rect(Rect::from_sides(11, 0, 20, 10));
    /// assert!(a.overlaps(&b));
    /// assert!(!a.overlaps(&c));
    /// ```
    pub fn overlaps(&self, other: &Polygon) -> bool {
        let (Some(a), Some(b)) = (self.bbox(), other.bbox()) else {
            return false;
        };
        if a.intersection(b).is_none() {
            return false;
        }
        if self
            .rings()
            .any(|r| other.rings().any(|s| r.boundary_meets(s)))
        {
            return true;
        }
        // No boundary contact: either one lies within the other, or they are disjoint.
        other
            .points()
            .first()
            .is_some_and(|p| self.locate(*p).is_covered())
            || self
                .points()
                .first()
                .is_some_and(|p| other.locate(*p).is_covered())
    }

    /// The shortest distance between two polygons; zero if they overlap.
    pub fn distance(&self, other: &Polygon) -> f64 {
        if self.overlaps(other) {
            return 0.0;
        }
        self.rings()
            .flat_map(|r| other.rings().map(move |s| r.boundary_distance(s)))
            .fold(f64::INFINITY, f64::min)
    }

    /// Finds a location where any ring of this polygon crosses itself or
    /// where a hole crosses the outer ring.
    pub fn self_crossing(&self) -> Option<Point> {
        for ring in self.rings() {
            if let Some(p) = ring.self_crossing() {
                return Some(p);
            }
        }
        for hole in &self.holes {
            for e in self.outer.edges() {
                for f in hole.edges() {
                    if e.crossing(&f).meets() {
                        return e.meeting_point(&f);
                    }
                }
            }
        }
        None
    }

    /// Returns the bottom y-coordinate in the polygon.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let points = vec![
    ///     Point { x: 0, y: 0 },
    ///     Point { x: 1, y: 2 },
    ///     Point { x: -4, y: 5 },
    /// ];
    /// let polygon = Polygon::from_verts(points);
    /// assert_eq!(polygon.bot(), 0);
    /// assert_eq!(polygon.top(), 5);
    /// assert_eq!(polygon.left(), -4);
    /// assert_eq!(polygon.right(), 1);
    /// ```
    pub fn bot(&self) -> i64 {
        self.points().iter().map(|point| point.y).min().unwrap_or_default()
    }

    /// Returns the top y-coordinate in the polygon.
    pub fn top(&self) -> i64 {
        self.points().iter().map(|point| point.y).max().unwrap_or_default()
    }

    /// Returns the leftmost x-coordinate in the polygon.
    pub fn left(&self) -> i64 {
        self.points().iter().map(|point| point.x).min().unwrap_or_default()
    }

    /// Returns the rightmost x-coordinate in the polygon.
    pub fn right(&self) -> i64 {
        self.points().iter().map(|point| point.x).max().unwrap_or_default()
    }

    /// Returns the vertex with the smallest `(x, y)`.
    pub fn min_point(&self) -> Option<Point> {
        self.points().iter().min().copied()
    }
}

impl Bbox for Polygon {
    fn bbox(&self) -> Option<Rect> {
        self.outer.bbox()
    }
}

impl Contains<Point> for Polygon {
    /// Determines if a point is contained within a polygon.
    ///
    /// Points on the boundary are contained; points in holes are not.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let points = vec![
    ///     Point { x: -4, y: 0 },
    ///     Point { x: 0, y: 0 },
    ///     Point { x: 1, y: 2 },
    ///     Point { x: 2, y: 2 },
    ///     Point { x: -4, y: 5 },
    /// ];
    /// let polygon = Polygon::from_verts(points);
    /// assert_eq!(polygon.contains(&Point::new(0, 0)), Containment::Full);
    /// assert_eq!(polygon.contains(&Point::new(0, 4)), Containment::None);
    /// assert_eq!(polygon.contains(&Point::new(-5, 3)), Containment::None);
    /// assert_eq!(polygon.contains(&Point::new(-2, 4)), Containment::Full);
    /// assert_eq!(polygon.contains(&Point::new(-2, 2)), Containment::Full);
    /// ```
    fn contains(&self, p: &Point) -> Containment {
        if self.locate(*p).is_covered() {
            Containment::Full
        } else {
            Containment::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donut() -> Polygon {
        let mut p = Polygon::from_rect(Rect::from_sides(0, 0, 30, 30));
        p.push_hole(Ring::new(
            Rect::from_sides(10, 10, 20, 20).corners().to_vec(),
        ));
        p.orient()
    }

    #[test]
    fn holes_reduce_area_and_exclude_points() {
        let d = donut();
        assert_eq!(d.area2(), 2 * (900 - 100));
        assert_eq!(d.holes()[0].winding(), Winding::Clockwise);
        assert_eq!(d.locate(Point::new(15, 15)), Location::Outside);
        assert_eq!(d.locate(Point::new(10, 15)), Location::Boundary);
        assert_eq!(d.locate(Point::new(5, 5)), Location::Inside);
    }

    #[test]
    fn shape_in_hole_does_not_overlap() {
        let d = donut();
        let island = Polygon::from_rect(Rect::from_sides(12, 12, 18, 18));
        assert!(!d.overlaps(&island));
        assert!(!island.overlaps(&d));
        assert_eq!(d.distance(&island), 2.0);
    }

    #[test]
    fn nested_polygon_overlaps() {
        let big = Polygon::from_rect(Rect::from_sides(0, 0, 100, 100));
        let small = Polygon::from_rect(Rect::from_sides(40, 40, 60, 60));
        assert!(big.overlaps(&small));
        assert!(small.overlaps(&big));
        assert_eq!(big.distance(&small), 0.0);
    }

    #[test]
    fn orient_is_idempotent() {
        let d = donut();
        assert_eq!(d.clone().orient(), d);
        let flipped = Polygon::with_holes(
            d.outer().clone().with_winding(Winding::Clockwise),
            vec![d.holes()[0].clone().with_winding(Winding::CounterClockwise)],
        );
        assert_eq!(flipped.orient(), d);
    }
}
