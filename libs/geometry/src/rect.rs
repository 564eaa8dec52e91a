//! Axis-aligned rectangles.

use serde::{Deserialize, Serialize};

use crate::point::Point;

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
    /// Creates a rectangle from all four sides (left, bottom, right, top).
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(1, 2, 7, 8);
    /// assert_eq!(rect.left(), 1);
    /// assert_eq!(rect.top(), 8);
    /// ```
    pub const fn from_sides(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self {
            p0: Point::new(x0, y0),
            p1: Point::new(x1, y1),
        }
    }

    /// Creates a zero-area rectangle containing the given point.
    #[inline]
    pub const fn from_point(p: Point) -> Self {
        Self { p0: p, p1: p }
    }

    /// The lower x-coordinate.
    pub const fn left(&self) -> i64 {
        self.p0.x
    }

    /// The lower y-coordinate.
    pub const fn bot(&self) -> i64 {
        self.p0.y
    }

    /// The upper x-coordinate.
    pub const fn right(&self) -> i64 {
        self.p1.x
    }

    /// The upper y-coordinate.
    pub const fn top(&self) -> i64 {
        self.p1.y
    }

    /// The width of the rectangle (inclusive of both edge coordinates).
    pub const fn width(&self) -> i64 {
        self.p1.x - self.p0.x + 1
    }

    /// The height of the rectangle (inclusive of both edge coordinates).
    pub const fn height(&self) -> i64 {
        self.p1.y - self.p0.y + 1
    }

    /// Expands the rectangle by `amount` on all sides.
    pub const fn expand_all(&self, amount: i64) -> Self {
        Self::from_sides(
            self.p0.x - amount,
            self.p0.y - amount,
            self.p1.x + amount,
            self.p1.y + amount,
        )
    }

    /// The smallest rectangle covering both `self` and `other`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let a = Rect::from_point(Point::new(0, 5));
    /// let b = Rect::from_point(Point::new(3, 1));
    /// assert_eq!(a.union(b), Rect::from_sides(0, 1, 3, 5));
    /// ```
    pub fn union(&self, other: Rect) -> Self {
        Self::from_sides(
            self.p0.x.min(other.p0.x),
            self.p0.y.min(other.p0.y),
            self.p1.x.max(other.p1.x),
            self.p1.y.max(other.p1.y),
        )
    }

    /// The intersection of `self` and `other`, or [`None`] if they are disjoint.
    pub fn intersection(&self, other: Rect) -> Option<Self> {
        let x0 = self.p0.x.max(other.p0.x);
        let y0 = self.p0.y.max(other.p0.y);
        let x1 = self.p1.x.min(other.p1.x);
        let y1 = self.p1.y.min(other.p1.y);
        (x0 <= x1 && y0 <= y1).then(|| Self::from_sides(x0, y0, x1, y1))
    }

    /// Whether the rectangle contains the given point (edges inclusive).
    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.p0.x && p.x <= self.p1.x && p.y >= self.p0.y && p.y <= self.p1.y
    }
}
