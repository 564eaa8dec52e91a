use geometry::prelude::{Point, Side};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use test_log::test;

use crate::{
    CellState, Component, Connection, GreedyRouter, Pin, Port, RouterError, RouterOptions,
    RoutingResult,
};

/// A small inverter-like placement: pull-down and pull-up bodies stacked
/// vertically, rails below and above, input on the left, output on the
/// right. Every net has fan-out two.
fn inverter_fixture() -> (Vec<Component>, Vec<Port>, Vec<Connection>) {
    let pd = Component::new(9, 7, 5, 5, "pd");
    let pu = Component::new(9, 15, 5, 5, "pu");
    let vss = Port::new(6, 6, "vss", Side::Right);
    let vdd = Port::new(6, 20, "vdd", Side::Right);
    let y = Port::new(15, 13, "y", Side::Right);
    let a = Port::new(6, 13, "a", Side::Right);
    let connections = vec![
        Connection::new(vss.clone(), pd.pin("S").unwrap()),
        Connection::new(vss.clone(), pd.pin("E").unwrap()),
        Connection::new(vdd.clone(), pu.pin("N").unwrap()),
        Connection::new(vdd.clone(), pu.pin("E").unwrap()),
        Connection::new(a.clone(), pd.pin("W").unwrap()),
        Connection::new(a.clone(), pu.pin("W").unwrap()),
        Connection::new(y.clone(), pd.pin("N").unwrap()),
        Connection::new(y.clone(), pu.pin("S").unwrap()),
    ];
    (vec![pd, pu], vec![vss, vdd, y, a], connections)
}

fn route_inverter(options: RouterOptions) -> RoutingResult {
    let (components, ports, connections) = inverter_fixture();
    GreedyRouter::new(options)
        .route(22, 40, &components, &ports, connections)
        .unwrap()
}

/// All unit cells covered by a net's wires.
fn wire_cells(wires: &[Vec<Point>]) -> FxHashSet<Point> {
    let mut cells = FxHashSet::default();
    for edge in wire_edges(wires) {
        cells.insert(edge.0);
        cells.insert(edge.1);
    }
    for wire in wires {
        cells.extend(wire.iter().copied());
    }
    cells
}

/// All unit edges covered by a net's wires, endpoint-order normalized.
fn wire_edges(wires: &[Vec<Point>]) -> FxHashSet<(Point, Point)> {
    let mut edges = FxHashSet::default();
    for wire in wires {
        for pair in wire.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let step = Point::new((b.x - a.x).signum(), (b.y - a.y).signum());
            let mut cur = a;
            while cur != b {
                let next = cur + step;
                edges.insert((cur.min(next), cur.max(next)));
                cur = next;
            }
        }
    }
    edges
}

#[test]
fn inverter_routes_completely() {
    let result = route_inverter(RouterOptions::default());
    assert!(result.failures.is_empty());

    let nets: Vec<&str> = result.wires.keys().map(|n| n.as_str()).collect();
    assert_eq!(nets.len(), 4);
    for net in ["vss", "vdd", "a", "y"] {
        assert!(nets.contains(&net), "missing net {net}");
        assert_eq!(result.wires[net].len(), 2, "net {net} should have 2 wires");
    }
}

#[test]
fn inverter_wires_start_and_end_at_terminals() {
    let result = route_inverter(RouterOptions::default());
    // The first wire of each net runs port-to-pin; the schedule puts the
    // shortest connection of each net first.
    let expected = [
        ("vss", Point::new(6, 6), Point::new(11, 7)),   // vss -> pd.S
        ("vdd", Point::new(6, 20), Point::new(11, 19)), // vdd -> pu.N
        ("a", Point::new(6, 13), Point::new(9, 9)),     // a -> pd.W
        ("y", Point::new(15, 13), Point::new(11, 11)),  // y -> pd.N
    ];
    for (net, port_loc, pin_loc) in expected {
        let wire = &result.wires[net][0];
        assert_eq!(wire.first(), Some(&port_loc), "net {net} start");
        assert_eq!(wire.last(), Some(&pin_loc), "net {net} end");
    }
}

#[test]
fn inverter_wires_respect_escape_directions() {
    let result = route_inverter(RouterOptions::default());
    let escapes = [
        ("vss", Side::Right, Side::Bot),
        ("vdd", Side::Right, Side::Top),
        ("a", Side::Right, Side::Left),
        ("y", Side::Right, Side::Top),
    ];
    for (net, port_escape, pin_escape) in escapes {
        let wire = &result.wires[net][0];
        // Leaving the port: the first step matches the port's escape.
        assert_eq!(wire[1] - wire[0], port_escape.offset(), "net {net} start");
        // Entering the pin: the final approach runs against the pin's
        // escape direction.
        let last = wire[wire.len() - 1];
        let prev = wire[wire.len() - 2];
        let approach = Point::new((last.x - prev.x).signum(), (last.y - prev.y).signum());
        assert_eq!(
            approach,
            Point::zero() - pin_escape.offset(),
            "net {net} end"
        );
    }
}

#[test]
fn inverter_wires_avoid_component_bodies() {
    let result = route_inverter(RouterOptions::default());
    for (net, wires) in &result.wires {
        // A net's own terminal cells are the ends of its wires; any other
        // pin or port cell is foreign and off-limits.
        let mut terminals = FxHashSet::default();
        for wire in wires {
            terminals.extend(wire.first().copied());
            terminals.extend(wire.last().copied());
        }
        for cell in wire_cells(wires) {
            let state = result.grid.state(cell);
            assert_ne!(
                state,
                CellState::Blocked,
                "net {net} crosses a component body at {cell:?}"
            );
            if matches!(state, CellState::Pin | CellState::Port) {
                assert!(
                    terminals.contains(&cell),
                    "net {net} crosses a foreign terminal at {cell:?}"
                );
            }
        }
    }
}

#[test]
fn inverter_nets_never_overlap() {
    let result = route_inverter(RouterOptions::default());
    let per_net: Vec<(&str, FxHashSet<(Point, Point)>)> = result
        .wires
        .iter()
        .map(|(net, wires)| (net.as_str(), wire_edges(wires)))
        .collect();
    for (i, (net_a, edges_a)) in per_net.iter().enumerate() {
        for (net_b, edges_b) in &per_net[i + 1..] {
            let shared: Vec<_> = edges_a.intersection(edges_b).collect();
            assert!(
                shared.is_empty(),
                "nets {net_a} and {net_b} share edges: {shared:?}"
            );
        }
    }
}

#[test]
fn routing_is_deterministic() {
    let first = route_inverter(RouterOptions::default());
    let second = route_inverter(RouterOptions::default());
    assert_eq!(first.wires, second.wires);
    assert_eq!(first.failures, second.failures);
}

#[test]
fn ripup_never_hurts() {
    let without = route_inverter(RouterOptions {
        ripup_retries: 0,
        ..Default::default()
    });
    let with = route_inverter(RouterOptions::default());
    assert!(with.failures.len() <= without.failures.len());
}

/// A channel whose only two exits are both crossed by a single committed
/// wire, with an unrelated commit stacked on top of it. The channel port
/// routes only after both commits are undone, so the exchange needs a
/// rip-up budget of two.
///
/// Layout on a 20 x 12 grid: an upper wall at y = 8 with gaps at x = 4,
/// 18, and 19; a lower wall at y = 4 with a gap at x = 10, open from
/// x = 13 east; and a seal at x = 13 closing the channel's east end. Net
/// "m" runs top-to-bottom through both western gaps; net "n" runs down
/// the open east side. Nets "m" and "n" carry a second short connection
/// so their fan-out schedules them ahead of "c".
fn sealed_channel_fixture() -> (Vec<Component>, Vec<Port>, Vec<Connection>) {
    let walls = vec![
        Component::with_pins(0, 8, 4, 1, "w0", IndexMap::new()),
        Component::with_pins(5, 8, 13, 1, "w1", IndexMap::new()),
        Component::with_pins(0, 4, 10, 1, "w2", IndexMap::new()),
        Component::with_pins(11, 4, 2, 1, "w3", IndexMap::new()),
        Component::with_pins(13, 5, 1, 3, "w4", IndexMap::new()),
    ];
    let m = Port::new(4, 10, "m", Side::Bot);
    let m2 = Port::new(0, 0, "m", Side::Right);
    let md1 = Port::new(12, 1, "md1", Side::Top);
    let md2 = Port::new(2, 0, "md2", Side::Left);
    let n = Port::new(18, 11, "n", Side::Bot);
    let n2 = Port::new(17, 0, "n", Side::Right);
    let nd1 = Port::new(13, 0, "nd1", Side::Top);
    let nd2 = Port::new(19, 0, "nd2", Side::Left);
    let c = Port::new(1, 6, "c", Side::Right);
    let cd = Port::new(1, 1, "cd", Side::Top);
    let connections = vec![
        Connection::new(m2.clone(), md2.clone()),
        Connection::new(m.clone(), md1.clone()),
        Connection::new(n2.clone(), nd2.clone()),
        Connection::new(n.clone(), nd1.clone()),
        Connection::new(c.clone(), cd.clone()),
    ];
    let ports = vec![m, m2, md1, md2, n, n2, nd1, nd2, c, cd];
    (walls, ports, connections)
}

fn route_sealed_channel(ripup_retries: usize) -> RoutingResult {
    let (components, ports, connections) = sealed_channel_fixture();
    GreedyRouter::new(RouterOptions {
        shortcut: false,
        ripup_retries,
    })
    .route(20, 12, &components, &ports, connections)
    .unwrap()
}

#[test]
fn ripup_budget_of_one_cannot_free_a_double_seal() {
    let result = route_sealed_channel(1);
    assert_eq!(result.failures.len(), 1);
    // The single undone commit is restored exactly.
    assert_eq!(result.wires["m"].len(), 2);
    assert_eq!(result.wires["n"].len(), 2);
    assert!(!result.wires.contains_key("c"));
}

#[test]
fn ripup_budget_spans_multiple_commits() {
    let result = route_sealed_channel(2);
    assert!(result.failures.is_empty());
    assert_eq!(result.wires["c"].len(), 1);
    assert_eq!(result.wires["m"].len(), 2);
    assert_eq!(result.wires["n"].len(), 2);
}

#[test]
fn inverter_grid_renders() {
    let result = route_inverter(RouterOptions::default());
    let art = result.grid.render_ascii();
    assert_eq!(art.lines().count(), 40);
    assert!(art.contains('#'));
    assert!(art.contains('@'));
    assert!(art.contains('+'));
}

#[test]
fn duplicate_connection_branches_trivially() {
    let a = Port::new(1, 5, "n", Side::Right);
    let b = Port::new(9, 5, "dst", Side::Left);
    let conns = vec![
        Connection::new(a.clone(), b.clone()),
        Connection::new(a.clone(), b.clone()),
    ];
    let result = GreedyRouter::new(RouterOptions::default())
        .route(12, 12, &[], &[a, b], conns)
        .unwrap();
    assert!(result.failures.is_empty());
    let wires = &result.wires["n"];
    assert_eq!(wires.len(), 2);
    // The duplicate finds its own escape step already on the net's wiring
    // and degenerates to a single attachment segment.
    assert_eq!(wires[1], vec![Point::new(8, 5), Point::new(9, 5)]);
}

#[test]
fn shared_prefixes_dedup_without_shortcut() {
    let a = Port::new(1, 5, "n", Side::Right);
    let b = Port::new(9, 5, "dst", Side::Left);
    let conns = vec![
        Connection::new(a.clone(), b.clone()),
        Connection::new(a.clone(), b.clone()),
    ];
    let result = GreedyRouter::new(RouterOptions {
        shortcut: false,
        ..Default::default()
    })
    .route(12, 12, &[], &[a, b], conns)
    .unwrap();
    assert!(result.failures.is_empty());
    let wires = &result.wires["n"];
    assert_eq!(wires.len(), 2);
    // Both connections take the identical straight route; the duplicate is
    // fully absorbed by the first wire.
    assert_eq!(wires[0].first(), Some(&Point::new(1, 5)));
    assert_eq!(wires[0].last(), Some(&Point::new(9, 5)));
    assert!(wires[1].is_empty());
}

#[test]
fn unplaced_pin_is_rejected() {
    let a = Port::new(1, 5, "n", Side::Right);
    let ghost = Pin::new(7, 7, Side::Left, "ghost");
    let result = GreedyRouter::new(RouterOptions::default()).route(
        12,
        12,
        &[],
        &[a.clone()],
        vec![Connection::new(ghost, a)],
    );
    assert_eq!(
        result.unwrap_err(),
        RouterError::UnplacedTerminal { x: 7, y: 7 }
    );
}

#[test]
fn unreachable_connection_is_reported_not_fatal() {
    // Box in the destination port with component bodies on three sides;
    // the grid edge closes the fourth.
    let walls = vec![
        Component::with_pins(6, 3, 4, 1, "w0", IndexMap::new()),
        Component::with_pins(6, 7, 4, 1, "w1", IndexMap::new()),
        Component::with_pins(6, 4, 1, 3, "w2", IndexMap::new()),
    ];
    let a = Port::new(1, 5, "n", Side::Right);
    let b = Port::new(8, 5, "dst", Side::Left);
    let conns = vec![Connection::new(a.clone(), b.clone())];
    let result = GreedyRouter::new(RouterOptions::default())
        .route(10, 10, &walls, &[a, b], conns)
        .unwrap();
    assert_eq!(result.failures.len(), 1);
    assert!(result.wires.is_empty());
}

#[test]
fn non_routed_ports_produce_no_wires() {
    let a = Port::new(1, 5, "n", Side::Right);
    let mut nc = Port::new(9, 5, "nc", Side::Left);
    nc.route = false;
    let conns = vec![Connection::new(nc.clone(), a.clone())];
    let result = GreedyRouter::new(RouterOptions::default())
        .route(12, 12, &[], &[a, nc], conns)
        .unwrap();
    assert!(result.wires.is_empty());
    assert!(result.failures.is_empty());
}
