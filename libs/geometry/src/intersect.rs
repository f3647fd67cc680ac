//! Intersections of geometric objects.

use crate::point::Point;

/// Trait for calculating the intersection with another geometric object.
pub trait Intersect<T: ?Sized> {
    /// The type of the output shape representing the intersection.
    type Output;
    /// Calculates the intersection of this shape with `other`.
    ///
    /// If no part of this shape lies within `other`,
    /// returns [`None`].
    fn intersect(&self, other: &T) -> Option<Self::Output>;
}

/// A closed line segment between two grid points.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    /// The first endpoint.
    pub a: Point,
    /// The second endpoint.
    pub b: Point,
}

/// How two closed segments meet.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Crossing {
    /// The segments share no point.
    Disjoint,
    /// The segments meet at an endpoint of at least one of them,
    /// without overlapping collinearly.
    Touch,
    /// The segments cross at a point interior to both.
    Proper,
    /// The segments are collinear and share more than one point.
    Collinear,
}

impl Crossing {
    /// Returns `true` if the segments share at least one point.
    #[inline]
    pub fn meets(&self) -> bool {
        !matches!(self, Self::Disjoint)
    }
}

impl Segment {
    /// Creates a new segment.
    #[inline]
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// Returns `true` if `p` lies on this closed segment.
    pub fn contains_point(&self, p: Point) -> bool {
        self.a.cross(self.b, p) == 0 && self.in_box(p)
    }

    fn in_box(&self, p: Point) -> bool {
        p.x >= self.a.x.min(self.b.x)
            && p.x <= self.a.x.max(self.b.x)
            && p.y >= self.a.y.min(self.b.y)
            && p.y <= self.a.y.max(self.b.y)
    }

    /// Classifies how this segment meets `other`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let s = Segment::new(Point::new(0, 0), Point::new(10, 10));
    /// let t = Segment::new(Point::new(0, 10), Point::new(10, 0));
    /// assert_eq!(s.crossing(&t), Crossing::Proper);
    /// let u = Segment::new(Point::new(10, 10), Point::new(20, 0));
    /// assert_eq!(s.crossing(&u), Crossing::Touch);
    /// ```
    pub fn crossing(&self, other: &Segment) -> Crossing {
        let d1 = other.a.cross(other.b, self.a).signum();
        let d2 = other.a.cross(other.b, self.b).signum();
        let d3 = self.a.cross(self.b, other.a).signum();
        let d4 = self.a.cross(self.b, other.b).signum();

        if d1 == 0 && d2 == 0 {
            // Collinear: compare the projections.
            let shared = [self.a, self.b]
                .into_iter()
                .filter(|p| other.in_box(*p))
                .chain([other.a, other.b].into_iter().filter(|p| self.in_box(*p)))
                .collect::<std::collections::BTreeSet<_>>();
            return match shared.len() {
                0 => Crossing::Disjoint,
                1 => Crossing::Touch,
                _ => Crossing::Collinear,
            };
        }

        if d1 * d2 < 0 && d3 * d4 < 0 {
            return Crossing::Proper;
        }

        if (d1 == 0 && other.in_box(self.a))
            || (d2 == 0 && other.in_box(self.b))
            || (d3 == 0 && self.in_box(other.a))
            || (d4 == 0 && self.in_box(other.b))
        {
            Crossing::Touch
        } else {
            Crossing::Disjoint
        }
    }

    /// An approximate location where two meeting segments meet.
    ///
    /// For collinear overlaps, returns an endpoint within the overlap.
    pub fn meeting_point(&self, other: &Segment) -> Option<Point> {
        match self.crossing(other) {
            Crossing::Disjoint => None,
            Crossing::Touch | Crossing::Collinear => [self.a, self.b]
                .into_iter()
                .find(|p| other.contains_point(*p))
                .or_else(|| {
                    [other.a, other.b]
                        .into_iter()
                        .find(|p| self.contains_point(*p))
                }),
            Crossing::Proper => {
                let (x1, y1) = self.a.to_f64();
                let (x2, y2) = self.b.to_f64();
                let (x3, y3) = other.a.to_f64();
                let (x4, y4) = other.b.to_f64();
                let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
                let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
                Some(Point::new(
                    (x1 + t * (x2 - x1)).round() as i64,
                    (y1 + t * (y2 - y1)).round() as i64,
                ))
            }
        }
    }

    /// The shortest distance from `p` to this segment.
    pub fn distance_to_point(&self, p: Point) -> f64 {
        let (ax, ay) = self.a.to_f64();
        let (bx, by) = self.b.to_f64();
        let (px, py) = p.to_f64();
        let (dx, dy) = (bx - ax, by - ay);
        let len2 = dx * dx + dy * dy;
        if len2 == 0.0 {
            return self.a.distance(p);
        }
        let t = (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0);
        let (cx, cy) = (ax + t * dx, ay + t * dy);
        (px - cx).hypot(py - cy)
    }

    /// The shortest distance between two segments.
    pub fn distance(&self, other: &Segment) -> f64 {
        if self.crossing(other).meets() {
            return 0.0;
        }
        self.distance_to_point(other.a)
            .min(self.distance_to_point(other.b))
            .min(other.distance_to_point(self.a))
            .min(other.distance_to_point(self.b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(ax: i64, ay: i64, bx: i64, by: i64) -> Segment {
        Segment::new(Point::new(ax, ay), Point::new(bx, by))
    }

    #[test]
    fn collinear_overlap_and_touch() {
        assert_eq!(seg(0, 0, 10, 0).crossing(&seg(5, 0, 15, 0)), Crossing::Collinear);
        assert_eq!(seg(0, 0, 10, 0).crossing(&seg(10, 0, 15, 0)), Crossing::Touch);
        assert_eq!(seg(0, 0, 10, 0).crossing(&seg(11, 0, 15, 0)), Crossing::Disjoint);
    }

    #[test]
    fn t_junction_is_touch() {
        assert_eq!(seg(0, 0, 10, 0).crossing(&seg(5, 0, 5, 5)), Crossing::Touch);
        assert_eq!(seg(0, 0, 10, 0).crossing(&seg(5, 1, 5, 5)), Crossing::Disjoint);
    }

    #[test]
    fn proper_crossing_location() {
        let p = seg(0, 0, 10, 10).meeting_point(&seg(0, 10, 10, 0));
        assert_eq!(p, Some(Point::new(5, 5)));
    }

    #[test]
    fn segment_distance() {
        assert_eq!(seg(0, 0, 10, 0).distance(&seg(0, 3, 10, 3)), 3.0);
        assert_eq!(seg(0, 0, 10, 0).distance(&seg(5, -3, 5, 3)), 0.0);
    }
}
