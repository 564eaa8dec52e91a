//! Connection ordering and net-name resolution.

use std::cmp::Reverse;

use arcstr::ArcStr;
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::grid::RoutingGrid;
use crate::{Connection, Result, RouterError, Terminal};
use geometry::prelude::Point;

/// The routing schedule: connections in routing order plus the escape-step
/// endpoint set of every net.
#[derive(Debug, Clone)]
pub struct RouteOrder {
    /// For each net, the escape-step positions of all its connection
    /// endpoints. Searches may turn on these cells even when they carry
    /// direction markers.
    pub endpoints: FxHashMap<ArcStr, IndexSet<Point>>,
    /// The connections to route, in order.
    pub connections: Vec<Connection>,
}

/// Resolves the net name of a connection, taken from its start terminal.
///
/// Ports carry their net name directly; pins are looked up by position in
/// the grid's placed-name map.
pub fn resolve_net(grid: &RoutingGrid, conn: &Connection) -> Result<ArcStr> {
    match &conn.start {
        Terminal::Port(port) => Ok(port.name.clone()),
        Terminal::Pin(pin) => grid
            .name_at(pin.loc)
            .cloned()
            .ok_or(RouterError::UnplacedTerminal {
                x: pin.loc.x,
                y: pin.loc.y,
            }),
    }
}

/// Orders connections for routing and collects per-net endpoint sets.
///
/// Connections touching a port with `route = false` are dropped before
/// ordering. The rest sort by net fan-out descending (fan-out counts a
/// net's distinct destination cells), then squared start-to-end distance
/// ascending, then original submission order, so high-fan-out nets claim
/// grid resources first and short hops within a net route before long
/// ones.
pub fn order_connections(grid: &RoutingGrid, connections: Vec<Connection>) -> Result<RouteOrder> {
    let mut routable = Vec::with_capacity(connections.len());
    for conn in connections {
        let opt_out = [&conn.start, &conn.end].into_iter().any(|t| match t {
            Terminal::Port(p) => !p.route,
            Terminal::Pin(_) => false,
        });
        if opt_out {
            tracing::debug!(
                start = ?conn.start.loc(),
                end = ?conn.end.loc(),
                "skipping connection to non-routed port"
            );
            continue;
        }
        routable.push(conn);
    }

    let mut fanout: FxHashMap<ArcStr, FxHashSet<Point>> = FxHashMap::default();
    let mut endpoints: FxHashMap<ArcStr, IndexSet<Point>> = FxHashMap::default();
    let mut keyed = Vec::with_capacity(routable.len());
    for (idx, conn) in routable.into_iter().enumerate() {
        let net = resolve_net(grid, &conn)?;
        fanout.entry(net.clone()).or_default().insert(conn.end.loc());
        let set = endpoints.entry(net.clone()).or_default();
        set.insert(conn.start.escape_loc());
        set.insert(conn.end.escape_loc());
        keyed.push((net, idx, conn));
    }

    keyed.sort_by_key(|(net, idx, conn)| {
        (
            Reverse(fanout[net].len()),
            conn.start.loc().distance_squared(conn.end.loc()),
            *idx,
        )
    });

    Ok(RouteOrder {
        endpoints,
        connections: keyed.into_iter().map(|(_, _, conn)| conn).collect(),
    })
}
