//! A one-dimensional span.
//!
//! A span represents the closed interval `[start, stop]`.
use serde::{Deserialize, Serialize};

use crate::contains::{Containment, Contains};
use crate::intersect::Intersect;

/// A closed interval of coordinates in one dimension.
///
/// Represents the range `[start, stop]`.
#[derive(
    Debug, Default, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize, PartialEq, Eq,
)]
pub struct Span {
    start: i64,
    stop: i64,
}

impl Span {
    /// Creates a new [`Span`] between two integers.
    pub fn new(start: i64, stop: i64) -> Self {
        use std::cmp::{max, min};
        Self {
            start: min(start, stop),
            stop: max(start, stop),
        }
    }

    /// Creates a span of zero length encompassing the given point.
    pub const fn from_point(x: i64) -> Self {
        Self { start: x, stop: x }
    }

    /// Gets the gap between two spans, or 0 if they touch or overlap.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Span::new(0, 4).gap(Span::new(7, 9)), 3);
    /// assert_eq!(Span::new(0, 4).gap(Span::new(4, 9)), 0);
    /// ```
    pub fn gap(&self, other: Span) -> i64 {
        (other.start - self.stop).max(self.start - other.stop).max(0)
    }

    /// Gets the starting (lower) endpoint of a span.
    #[inline]
    pub const fn start(&self) -> i64 {
        self.start
    }

    /// Gets the stopping (upper) endpoint of a span.
    #[inline]
    pub const fn stop(&self) -> i64 {
        self.stop
    }

    /// Gets the center of the span, rounded down.
    #[inline]
    pub const fn center(&self) -> i64 {
        (self.start + self.stop).div_euclid(2)
    }

    /// Returns `true` if the two closed intervals share at least one coordinate.
    #[inline]
    pub fn touches(&self, other: Span) -> bool {
        self.start <= other.stop && other.start <= self.stop
    }

}

impl Intersect<Span> for Span {
    type Output = Self;

    fn intersect(&self, other: &Span) -> Option<Self::Output> {
        let start = std::cmp::max(self.start, other.start);
        let stop = std::cmp::min(self.stop, other.stop);
        if start > stop {
            None
        } else {
            Some(Self { start, stop })
        }
    }
}

impl Contains<Span> for Span {
    fn contains(&self, other: &Span) -> Containment {
        if self.start <= other.start && self.stop >= other.stop {
            Containment::Full
        } else if self.touches(*other) {
            Containment::Partial
        } else {
            Containment::None
        }
    }
}

impl Contains<i64> for Span {
    fn contains(&self, other: &i64) -> Containment {
        if self.start <= *other && *other <= self.stop {
            Containment::Full
        } else {
            Containment::None
        }
    }
}

impl From<(i64, i64)> for Span {
    #[inline]
    fn from(tup: (i64, i64)) -> Self {
        Self::new(tup.0, tup.1)
    }
}
