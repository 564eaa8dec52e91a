//! The dense routing grid: cell states, placement, and occupancy tracking.

use arcstr::ArcStr;
use geometry::prelude::{Point, Rect};
use rustc_hash::FxHashMap;

use crate::{CellState, Component, Port};

/// Padding, in cells, added around a component outline by
/// [`RoutingGrid::for_outline`].
pub const OUTLINE_PADDING: i64 = 3;

/// A dense grid of routing cells plus sparse per-cell metadata.
///
/// Coordinates are `(x, y)` with the origin at the lower-left corner; cell
/// `(0, 0)` is the bottom-left cell. All cells start [`CellState::Empty`].
#[derive(Debug, Clone)]
pub struct RoutingGrid {
    cells: ::grid::Grid<CellState>,
    /// Net/pin identity of placed terminal cells.
    names: FxHashMap<Point, ArcStr>,
    /// Number of committed wires crossing each cell.
    usage: FxHashMap<Point, u32>,
    width: i64,
    height: i64,
}

impl RoutingGrid {
    /// Creates an empty grid of the given dimensions.
    pub fn new(width: i64, height: i64) -> Self {
        Self {
            cells: ::grid::Grid::new(height as usize, width as usize),
            names: FxHashMap::default(),
            usage: FxHashMap::default(),
            width,
            height,
        }
    }

    /// Creates an empty grid sized to enclose `outline` with
    /// [`OUTLINE_PADDING`] empty cells on every side.
    ///
    /// The outline's lower-left corner is assumed to sit at the origin.
    pub fn for_outline(outline: Rect) -> Self {
        Self::new(
            outline.width() + 2 * OUTLINE_PADDING,
            outline.height() + 2 * OUTLINE_PADDING,
        )
    }

    /// The width of the grid, in cells.
    #[inline]
    pub fn width(&self) -> i64 {
        self.width
    }

    /// The height of the grid, in cells.
    #[inline]
    pub fn height(&self) -> i64 {
        self.height
    }

    /// The rectangle of valid cell coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::from_sides(0, 0, self.width - 1, self.height - 1)
    }

    /// Whether `p` is a valid cell coordinate.
    #[inline]
    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    /// The state of the cell at `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p` is out of bounds.
    pub fn state(&self, p: Point) -> CellState {
        self.cells[(p.y as usize, p.x as usize)]
    }

    /// Sets the state of the cell at `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p` is out of bounds.
    pub fn set_state(&mut self, p: Point, state: CellState) {
        self.cells[(p.y as usize, p.x as usize)] = state;
    }

    /// The net/pin identity recorded at `p`, if any.
    pub fn name_at(&self, p: Point) -> Option<&ArcStr> {
        self.names.get(&p)
    }

    /// The number of committed wires currently crossing `p`.
    pub fn usage_at(&self, p: Point) -> u32 {
        self.usage.get(&p).copied().unwrap_or(0)
    }

    /// Records one wire crossing `p`.
    ///
    /// The first wire through an [`CellState::Empty`] cell promotes it to
    /// [`CellState::Routed`]; terminal and marker cells keep their state and
    /// only accumulate usage.
    pub fn mark_used(&mut self, p: Point) {
        *self.usage.entry(p).or_insert(0) += 1;
        if self.state(p) == CellState::Empty {
            self.set_state(p, CellState::Routed);
        }
    }

    /// Removes one wire crossing from `p`, inverting [`Self::mark_used`].
    ///
    /// When the last crossing is released, a [`CellState::Routed`] cell
    /// reverts to [`CellState::Empty`].
    pub fn release(&mut self, p: Point) {
        if let Some(uses) = self.usage.get_mut(&p) {
            *uses = uses.saturating_sub(1);
            if *uses == 0 {
                self.usage.remove(&p);
                if self.state(p) == CellState::Routed {
                    self.set_state(p, CellState::Empty);
                }
            }
        }
    }

    /// Stamps a component onto the grid.
    ///
    /// The body rectangle becomes [`CellState::Blocked`]; each pin cell
    /// becomes [`CellState::Pin`] and is named `owner.label`; the cell one
    /// escape step out from each pin becomes [`CellState::DirectionMarker`]
    /// if it lies in bounds.
    pub fn place_component(&mut self, component: &Component) {
        let b = component.bounds;
        for y in b.bot()..=b.top() {
            for x in b.left()..=b.right() {
                self.set_state(Point::new(x, y), CellState::Blocked);
            }
        }
        for (label, pin) in &component.pins {
            self.set_state(pin.loc, CellState::Pin);
            self.names
                .insert(pin.loc, arcstr::format!("{}.{}", pin.owner, label));
            let marker = pin.loc + pin.escape.offset();
            if self.in_bounds(marker) {
                self.set_state(marker, CellState::DirectionMarker);
            }
        }
    }

    /// Stamps a port onto the grid.
    ///
    /// The port cell becomes [`CellState::Port`] and is named after the
    /// port's net; the cell one escape step out becomes
    /// [`CellState::DirectionMarker`] if it lies in bounds.
    pub fn place_port(&mut self, port: &Port) {
        self.set_state(port.loc, CellState::Port);
        self.names.insert(port.loc, port.name.clone());
        let marker = port.loc + port.escape.offset();
        if self.in_bounds(marker) {
            self.set_state(marker, CellState::DirectionMarker);
        }
    }

    /// Renders the grid as ASCII art, top row first.
    ///
    /// Cell legend: `.` empty, `+` routed, `,` direction marker, `#`
    /// blocked, `o` pin, `@` port.
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                out.push(match self.state(Point::new(x, y)) {
                    CellState::Empty => '.',
                    CellState::Routed => '+',
                    CellState::DirectionMarker => ',',
                    CellState::Blocked => '#',
                    CellState::Pin => 'o',
                    CellState::Port => '@',
                });
            }
            out.push('\n');
        }
        out
    }
}

/// A dense integer key for the cell at `p` on a grid of the given height.
///
/// Cells are numbered column-major, so keys are stable across grids of equal
/// height regardless of width.
#[inline]
pub fn node_key(p: Point, height: i64) -> u32 {
    (p.x * height + p.y) as u32
}

#[cfg(test)]
mod tests {
    use geometry::prelude::Side;

    use super::*;

    #[test]
    fn placement_stamps_body_pins_and_markers() {
        let mut grid = RoutingGrid::new(12, 12);
        let c = Component::new(3, 3, 5, 5, "m0");
        grid.place_component(&c);

        assert_eq!(grid.state(Point::new(3, 5)), CellState::Pin); // W pin at the side midpoint
        assert_eq!(grid.state(Point::new(3, 3)), CellState::Blocked); // body corner
        assert_eq!(grid.state(Point::new(4, 4)), CellState::Blocked);
        assert_eq!(grid.state(Point::new(5, 3)), CellState::Pin); // S pin
        assert_eq!(grid.state(Point::new(5, 2)), CellState::DirectionMarker);
        assert_eq!(grid.state(Point::new(2, 5)), CellState::DirectionMarker);
        assert_eq!(grid.name_at(Point::new(5, 7)).unwrap(), "m0.N");
        assert_eq!(grid.state(Point::new(0, 0)), CellState::Empty);
    }

    #[test]
    fn marker_outside_grid_is_skipped() {
        let mut grid = RoutingGrid::new(8, 8);
        let port = Port::new(0, 4, "clk", Side::Left);
        grid.place_port(&port);
        assert_eq!(grid.state(Point::new(0, 4)), CellState::Port);
        // The escape step at (-1, 4) is out of bounds; nothing to assert
        // beyond not panicking, but the neighbor stays empty.
        assert_eq!(grid.state(Point::new(1, 4)), CellState::Empty);
    }

    #[test]
    fn usage_counts_nest() {
        let mut grid = RoutingGrid::new(4, 4);
        let p = Point::new(1, 1);
        grid.mark_used(p);
        grid.mark_used(p);
        assert_eq!(grid.state(p), CellState::Routed);
        assert_eq!(grid.usage_at(p), 2);
        grid.release(p);
        assert_eq!(grid.state(p), CellState::Routed);
        grid.release(p);
        assert_eq!(grid.state(p), CellState::Empty);
        assert_eq!(grid.usage_at(p), 0);
    }

    #[test]
    fn release_does_not_clear_terminals() {
        let mut grid = RoutingGrid::new(8, 8);
        let port = Port::new(2, 2, "a", Side::Right);
        grid.place_port(&port);
        grid.mark_used(Point::new(2, 2));
        grid.release(Point::new(2, 2));
        assert_eq!(grid.state(Point::new(2, 2)), CellState::Port);
    }

    #[test]
    fn outline_padding() {
        let grid = RoutingGrid::for_outline(Rect::from_sides(0, 0, 9, 5));
        assert_eq!(grid.width(), 16);
        assert_eq!(grid.height(), 12);
    }

    #[test]
    fn ascii_rendering_is_top_down() {
        let mut grid = RoutingGrid::new(3, 2);
        grid.set_state(Point::new(0, 0), CellState::Blocked);
        grid.set_state(Point::new(2, 1), CellState::Routed);
        assert_eq!(grid.render_ascii(), "..+\n#..\n");
    }
}
