//! A prelude exporting the most commonly used items.

pub use crate::dir::Dir;
pub use crate::point::Point;
pub use crate::rect::Rect;
pub use crate::side::Side;
