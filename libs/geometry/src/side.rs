//! The sides of an axis-aligned rectangle, doubling as the four cardinal
//! directions of travel on a unit grid.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::dir::Dir;
use crate::point::Point;

/// An enumeration of the sides of an axis-aligned rectangle.
///
/// A wire escaping a pin on the top side of a component travels in the
/// [`Side::Top`] direction, and so on; [`Side::offset`] gives the matching
/// unit step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[repr(u8)]
pub enum Side {
    /// The top side (positive y travel).
    Top,
    /// The bottom side (negative y travel).
    Bot,
    /// The right side (positive x travel).
    Right,
    /// The left side (negative x travel).
    Left,
}

impl Side {
    /// All four sides, in a fixed order.
    ///
    /// Grid searches expand neighbors in this order, so it is part of the
    /// determinism contract of the router.
    pub const ALL: [Side; 4] = [Side::Top, Side::Bot, Side::Right, Side::Left];

    /// The unit step taken when traveling toward this side.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Side::Top.offset(), Point::new(0, 1));
    /// assert_eq!(Side::Left.offset(), Point::new(-1, 0));
    /// ```
    pub const fn offset(&self) -> Point {
        match *self {
            Side::Top => Point::new(0, 1),
            Side::Bot => Point::new(0, -1),
            Side::Right => Point::new(1, 0),
            Side::Left => Point::new(-1, 0),
        }
    }

    /// The axis along which travel toward this side moves.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Side::Top.dir(), Dir::Vert);
    /// assert_eq!(Side::Right.dir(), Dir::Horiz);
    /// ```
    pub const fn dir(&self) -> Dir {
        match *self {
            Side::Top | Side::Bot => Dir::Vert,
            Side::Left | Side::Right => Dir::Horiz,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Side::Top => write!(f, "top"),
            Side::Bot => write!(f, "bottom"),
            Side::Right => write!(f, "right"),
            Side::Left => write!(f, "left"),
        }
    }
}
