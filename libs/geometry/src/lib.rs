//! 2-D geometric primitives for schematic routing grids.
//!
//! All coordinates are integers: routing operates on a uniform unit grid,
//! so there is no fractional geometry anywhere in this crate.
//!
//! # Examples
//!
//! Create a [rectangle](crate::rect::Rect) and grow it by a margin:
//!
//! ```
//! # use geometry::prelude::*;
//! let rect = Rect::from_sides(2, 3, 6, 9).expand_all(1);
//! assert_eq!(rect, Rect::from_sides(1, 2, 7, 10));
//! ```
#![warn(missing_docs)]

pub mod dir;
pub mod point;
pub mod prelude;
pub mod rect;
pub mod side;
