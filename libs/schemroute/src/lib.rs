//! Schemroute: schematic wire autorouting on a uniform unit grid.
//!
//! Given placed components (with pins at fixed grid positions and required
//! escape directions) and a set of required point-to-point connections, the
//! router computes obstacle-avoiding, axis-aligned wire paths, resolves
//! congestion between competing nets, and reduces the results to corner-only
//! polylines suitable for storage and rendering.
//!
//! # Grid structure
//!
//! The routing area is a dense grid of unit cells. Component bodies occupy
//! rectangles of [`CellState::Blocked`] cells; pins and ports occupy single
//! [`CellState::Pin`]/[`CellState::Port`] cells on the grid. Every pin and
//! port declares an *escape direction*: the single cardinal direction a wire
//! must initially travel when leaving it. Placement marks the cell one step
//! along the escape direction with [`CellState::DirectionMarker`]; a search
//! may pass straight over a marker but may not turn on it, which forces
//! wires to leave terminals straight before turning.
//!
//! # Routing phases
//!
//! 1. *Placement* ([`grid`]) stamps components and ports onto the grid and
//!    records a sparse map from grid position back to net/pin identity.
//! 2. *Ordering* ([`order`]) sorts connections by net fan-out (descending)
//!    then squared distance (ascending), so the hardest nets route first.
//! 3. Per connection, the orchestrator ([`route`]) consults the blocked-move
//!    index ([`blocked`]) and runs an A* search ([`path`]), optionally
//!    branching onto the net's own existing wiring ("shortcut" routing),
//!    with a bounded rip-up/reroute retry when a connection fails.
//! 4. *Simplification* ([`simplify`]) reduces raw unit-step paths to
//!    corner-only polylines.
//!
//! Routing is single-threaded and deterministic: identical inputs always
//! produce identical wire geometry.
#![warn(missing_docs)]

pub mod blocked;
pub mod grid;
pub mod order;
pub(crate) mod path;
pub mod route;
pub mod simplify;

#[cfg(test)]
mod tests;

use arcstr::ArcStr;
use geometry::prelude::{Point, Rect, Side};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use route::{GreedyRouter, RoutingResult};

/// A result type returning router errors.
pub type Result<T, E = RouterError> = std::result::Result<T, E>;

/// The error type for router configuration and invariant violations.
///
/// Failure to route an individual connection is *not* an error: it is
/// reported in [`RoutingResult::failures`] and routing continues. The
/// variants here indicate bugs in the caller's data model, not congestion.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// A net was flagged for shortcut routing but has no interior branch
    /// points to attach to.
    #[error("net `{net}` has committed paths but no interior branch points")]
    NoBranchPoints {
        /// The name of the offending net.
        net: ArcStr,
    },
    /// A connection references a pin that was never placed on the grid.
    #[error("no placed terminal at ({x}, {y})")]
    UnplacedTerminal {
        /// The x-coordinate of the unresolvable terminal.
        x: i64,
        /// The y-coordinate of the unresolvable terminal.
        y: i64,
    },
}

/// The state of a single cell on the routing grid.
///
/// States are ordinal-ordered: any state greater than or equal to
/// [`CellState::Blocked`] is impassable to wires.
#[derive(
    Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub enum CellState {
    /// The cell is unoccupied.
    #[default]
    Empty,
    /// The cell carries at least one committed wire.
    Routed,
    /// The cell is the escape step of a pin or port: passable, but a wire
    /// standing on it may not change direction.
    DirectionMarker,
    /// The cell is covered by a component body.
    Blocked,
    /// The cell is a component pin.
    Pin,
    /// The cell is a schematic port.
    Port,
}

impl CellState {
    /// Whether wires may pass through a cell in this state.
    #[inline]
    pub fn is_impassable(&self) -> bool {
        *self >= CellState::Blocked
    }
}

/// An inner connection point on a placed component.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Pin {
    /// The pin's position, in grid coordinates.
    pub loc: Point,
    /// The cardinal direction a wire must initially travel when leaving
    /// this pin.
    pub escape: Side,
    /// The name of the component this pin belongs to.
    pub owner: ArcStr,
}

impl Pin {
    /// Creates a new [`Pin`].
    pub fn new(x: i64, y: i64, escape: Side, owner: impl Into<ArcStr>) -> Self {
        Self {
            loc: Point::new(x, y),
            escape,
            owner: owner.into(),
        }
    }
}

/// An externally visible net terminal of the schematic.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Port {
    /// The port's position, in grid coordinates.
    pub loc: Point,
    /// The net name this port exposes.
    pub name: ArcStr,
    /// The cardinal direction a wire must initially travel when leaving
    /// this port.
    pub escape: Side,
    /// Whether this port participates in automatic wiring.
    ///
    /// Ports with `route = false` are placed on the grid (so other wires
    /// avoid them) but connections touching them are skipped.
    pub route: bool,
}

impl Port {
    /// Creates a new routable [`Port`].
    pub fn new(x: i64, y: i64, name: impl Into<ArcStr>, escape: Side) -> Self {
        Self {
            loc: Point::new(x, y),
            name: name.into(),
            escape,
            route: true,
        }
    }
}

/// A placed component: an occupied rectangle plus its named pin set.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// The rectangle of grid cells covered by the component body.
    pub bounds: Rect,
    /// The component's instance name.
    pub name: ArcStr,
    /// The component's pins, keyed by pin label.
    pub pins: IndexMap<ArcStr, Pin>,
}

impl Component {
    /// Creates a component with pins synthesized at the midpoints of its
    /// four sides, each escaping outward.
    pub fn new(x: i64, y: i64, width: i64, height: i64, name: impl Into<ArcStr>) -> Self {
        let name = name.into();
        let pins = IndexMap::from_iter([
            (
                arcstr::literal!("S"),
                Pin::new(x + width / 2, y, Side::Bot, name.clone()),
            ),
            (
                arcstr::literal!("N"),
                Pin::new(x + width / 2, y + height - 1, Side::Top, name.clone()),
            ),
            (
                arcstr::literal!("W"),
                Pin::new(x, y + height / 2, Side::Left, name.clone()),
            ),
            (
                arcstr::literal!("E"),
                Pin::new(x + width - 1, y + height / 2, Side::Right, name.clone()),
            ),
        ]);
        Self {
            bounds: Rect::from_sides(x, y, x + width - 1, y + height - 1),
            name,
            pins,
        }
    }

    /// Creates a component with an explicit pin set.
    pub fn with_pins(
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        name: impl Into<ArcStr>,
        pins: IndexMap<ArcStr, Pin>,
    ) -> Self {
        Self {
            bounds: Rect::from_sides(x, y, x + width - 1, y + height - 1),
            name: name.into(),
            pins,
        }
    }

    /// Returns the pin with the given label, if present.
    pub fn pin(&self, label: &str) -> Option<&Pin> {
        self.pins.get(label)
    }
}

/// One endpoint of a requested connection.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Terminal {
    /// A schematic port.
    Port(Port),
    /// A component pin.
    Pin(Pin),
}

impl Terminal {
    /// The terminal's position, in grid coordinates.
    pub fn loc(&self) -> Point {
        match self {
            Terminal::Port(p) => p.loc,
            Terminal::Pin(p) => p.loc,
        }
    }

    /// The terminal's escape direction.
    pub fn escape(&self) -> Side {
        match self {
            Terminal::Port(p) => p.escape,
            Terminal::Pin(p) => p.escape,
        }
    }

    /// The position one step along the escape direction: the effective
    /// search endpoint for this terminal.
    pub fn escape_loc(&self) -> Point {
        self.loc() + self.escape().offset()
    }
}

impl From<Port> for Terminal {
    fn from(value: Port) -> Self {
        Terminal::Port(value)
    }
}

impl From<Pin> for Terminal {
    fn from(value: Pin) -> Self {
        Terminal::Pin(value)
    }
}

impl From<&Port> for Terminal {
    fn from(value: &Port) -> Self {
        Terminal::Port(value.clone())
    }
}

impl From<&Pin> for Terminal {
    fn from(value: &Pin) -> Self {
        Terminal::Pin(value.clone())
    }
}

/// A requested point-to-point connection.
///
/// The name associated with the *start* terminal (its port name, or the
/// placed identity of its pin) determines which net's path bucket the routed
/// wire belongs to.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// The start terminal.
    pub start: Terminal,
    /// The end terminal.
    pub end: Terminal,
}

impl Connection {
    /// Creates a new [`Connection`].
    pub fn new(start: impl Into<Terminal>, end: impl Into<Terminal>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Options controlling router behavior.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RouterOptions {
    /// Whether later connections of a net may branch directly onto the
    /// net's existing wiring instead of routing back to the original
    /// terminal.
    pub shortcut: bool,
    /// How many committed connections a failing connection may rip up.
    ///
    /// Rip-up undoes the most recent commits one at a time, up to this
    /// budget, until the failing connection routes in the freed space; the
    /// undone connections are then rerouted oldest-first. If the failing
    /// connection never routes, or a rerouted connection ends up stranded,
    /// the undone commits are restored exactly, so the
    /// committed-connection count never decreases.
    pub ripup_retries: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            shortcut: true,
            ripup_retries: 1,
        }
    }
}
