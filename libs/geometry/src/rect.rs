//! Axis-aligned rectangles.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::contains::{Containment, Contains};
use crate::intersect::Intersect;
use crate::point::Point;
use crate::span::Span;

/// An axis-aligned rectangle, specified by lower-left and upper-right corners.
#[derive(
    Debug, Default, Copy, Clone, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Rect {
    /// The lower-left corner.
    p0: Point,
    /// The upper-right corner.
    p1: Point,
}

impl Rect {
    /// Creates a rectangle from all 4 sides (left, bottom, right, top).
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(15, 20, 30, 40);
    /// assert_eq!(rect.left(), 15);
    /// assert_eq!(rect.bot(), 20);
    /// assert_eq!(rect.right(), 30);
    /// assert_eq!(rect.top(), 40);
    /// ```
    ///
    /// # Panics
    ///
    /// This method panics if `left > right` or if `bot > top`.
    ///
    /// If you want sides to be sorted for you, consider using [`Rect::new`] instead.
    #[inline]
    pub fn from_sides(left: i64, bot: i64, right: i64, top: i64) -> Self {
        assert!(
            left <= right,
            "Rect::from_sides requires that left ({}) <= right ({})",
            left,
            right
        );
        assert!(
            bot <= top,
            "Rect::from_sides requires that bot ({}) <= top ({})",
            bot,
            top
        );
        Self::new(Point::new(left, bot), Point::new(right, top))
    }

    /// Creates a zero-area rectangle containing the given point.
    pub const fn from_point(p: Point) -> Self {
        Self { p0: p, p1: p }
    }

    /// Creates a new rectangle from the given opposite corner points.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::new(Point::new(30, 20), Point::new(15, 40));
    /// assert_eq!(rect, Rect::from_sides(15, 20, 30, 40));
    /// ```
    #[inline]
    pub fn new(lower_left: Point, upper_right: Point) -> Self {
        let p0 = lower_left;
        let p1 = upper_right;
        Self {
            p0: Point::new(p0.x.min(p1.x), p0.y.min(p1.y)),
            p1: Point::new(p0.x.max(p1.x), p0.y.max(p1.y)),
        }
    }

    /// Creates a rectangle from horizontal and vertical [`Span`]s.
    pub fn from_spans(h: Span, v: Span) -> Self {
        Self {
            p0: Point::new(h.start(), v.start()),
            p1: Point::new(h.stop(), v.stop()),
        }
    }

    /// Returns the bottom y-coordinate of the rectangle.
    #[inline]
    pub const fn bot(&self) -> i64 {
        self.p0.y
    }

    /// Returns the top y-coordinate of the rectangle.
    #[inline]
    pub const fn top(&self) -> i64 {
        self.p1.y
    }

    /// Returns the left x-coordinate of the rectangle.
    #[inline]
    pub const fn left(&self) -> i64 {
        self.p0.x
    }

    /// Returns the right x-coordinate of the rectangle.
    #[inline]
    pub const fn right(&self) -> i64 {
        self.p1.x
    }

    /// Returns the horizontal span of the rectangle.
    pub fn hspan(&self) -> Span {
        Span::new(self.p0.x, self.p1.x)
    }

    /// Returns the vertical span of the rectangle.
    pub fn vspan(&self) -> Span {
        Span::new(self.p0.y, self.p1.y)
    }

    /// Returns the four corners, counter-clockwise from the lower left.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.p0,
            Point::new(self.p1.x, self.p0.y),
            self.p1,
            Point::new(self.p0.x, self.p1.y),
        ]
    }

    /// Returns the center point of the rectangle, rounded down.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(0, 0, 200, 100);
    /// assert_eq!(rect.center(), Point::new(100, 50));
    /// ```
    pub fn center(&self) -> Point {
        Point::new(self.hspan().center(), self.vspan().center())
    }

    /// Returns the smallest rectangle containing both rectangles.
    pub fn union(self, other: Self) -> Self {
        Rect::new(
            Point::new(self.left().min(other.left()), self.bot().min(other.bot())),
            Point::new(
                self.right().max(other.right()),
                self.top().max(other.top()),
            ),
        )
    }

    /// Returns the smallest rectangle containing every rectangle in `rects`.
    ///
    /// Returns [`None`] if the iterator is empty.
    pub fn union_all_option(rects: impl IntoIterator<Item = Rect>) -> Option<Self> {
        rects.into_iter().reduce(|acc, r| acc.union(r))
    }

    /// Calculates the intersection of two closed rectangles.
    ///
    /// Touching rectangles intersect in a zero-area rectangle.
    pub fn intersection(self, other: Self) -> Option<Self> {
        let h = self.hspan().intersect(&other.hspan())?;
        let v = self.vspan().intersect(&other.vspan())?;
        Some(Self::from_spans(h, v))
    }

    /// Gets the Chebyshev gap between two rectangles (0 if they touch or overlap).
    pub fn gap(&self, other: &Rect) -> i64 {
        self.hspan()
            .gap(other.hspan())
            .max(self.vspan().gap(other.vspan()))
    }
}

impl Bbox for Rect {
    fn bbox(&self) -> Option<Rect> {
        Some(*self)
    }
}

impl Intersect<Rect> for Rect {
    type Output = Self;

    fn intersect(&self, other: &Rect) -> Option<Self::Output> {
        self.intersection(*other)
    }
}

impl Contains<Point> for Rect {
    fn contains(&self, other: &Point) -> Containment {
        if other.x >= self.p0.x
            && other.x <= self.p1.x
            && other.y >= self.p0.y
            && other.y <= self.p1.y
        {
            Containment::Full
        } else {
            Containment::None
        }
    }
}

impl Contains<Rect> for Rect {
    fn contains(&self, other: &Rect) -> Containment {
        let h = self.hspan().contains(&other.hspan());
        let v = self.vspan().contains(&other.vspan());
        h.min(v)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn touching_rects_intersect() {
        let r1 = Rect::from_sides(0, 0, 10, 10);
        let r2 = Rect::from_sides(10, 5, 20, 15);
        assert_eq!(r1.intersection(r2), Some(Rect::from_sides(10, 5, 10, 10)));
        let r3 = Rect::from_sides(11, 5, 20, 15);
        assert_eq!(r1.intersection(r3), None);
        assert_eq!(r1.gap(&r3), 1);
    }

    #[test]
    fn rect_containment() {
        let outer = Rect::from_sides(0, 0, 100, 100);
        assert_eq!(
            outer.contains(&Rect::from_sides(10, 10, 20, 20)),
            Containment::Full
        );
        assert_eq!(
            outer.contains(&Rect::from_sides(90, 90, 120, 120)),
            Containment::Partial
        );
        assert_eq!(
            outer.contains(&Rect::from_sides(101, 0, 120, 120)),
            Containment::None
        );
    }
}
