//! 2-D points.

use serde::{Deserialize, Serialize};

/// A point in two-dimensional space.
#[derive(
    Debug, Copy, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Point {
    /// The x-coordinate of the point.
    pub x: i64,
    /// The y-coordinate of the point.
    pub y: i64,
}

impl Point {
    /// Creates a new [`Point`] from (x,y) coordinates.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Returns the origin, `(0, 0)`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let origin = Point::zero();
    /// assert_eq!(origin, Point::new(0, 0));
    /// ```
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// The z-component of the cross product `(a - self) x (b - self)`.
    ///
    /// Positive when `self -> a -> b` turns counter-clockwise, negative when it
    /// turns clockwise, and zero when the three points are collinear.
    /// Computed in 128-bit arithmetic so that it never overflows.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let o = Point::zero();
    /// assert!(o.cross(Point::new(1, 0), Point::new(0, 1)) > 0);
    /// assert!(o.cross(Point::new(0, 1), Point::new(1, 0)) < 0);
    /// assert_eq!(o.cross(Point::new(1, 1), Point::new(2, 2)), 0);
    /// ```
    pub fn cross(&self, a: Point, b: Point) -> i128 {
        let (ax, ay) = ((a.x - self.x) as i128, (a.y - self.y) as i128);
        let (bx, by) = ((b.x - self.x) as i128, (b.y - self.y) as i128);
        ax * by - ay * bx
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: Point) -> f64 {
        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        dx.hypot(dy)
    }

    /// Returns the point as floating-point `(x, y)` coordinates.
    #[inline]
    pub fn to_f64(self) -> (f64, f64) {
        (self.x as f64, self.y as f64)
    }
}

impl std::ops::Add<Point> for Point {
    type Output = Self;
    fn add(self, rhs: Point) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign<Point> for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub<Point> for Point {
    type Output = Self;
    fn sub(self, rhs: Point) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::SubAssign<Point> for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl From<(i64, i64)> for Point {
    fn from(value: (i64, i64)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
