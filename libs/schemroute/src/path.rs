//! Grid pathfinding: windowed A* with direction-change and congestion
//! penalties.
//!
//! All costs are integers, scaled by [`STEP_COST`] per unit move so the
//! sub-unit penalty ratios stay exact without leaving integer arithmetic.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use geometry::prelude::{Point, Rect, Side};
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::grid::{node_key, RoutingGrid};
use crate::CellState;

/// The cost of a single unit move.
pub(crate) const STEP_COST: i64 = 4;

/// The floor of the direction-change penalty.
const MIN_TURN_COST: i64 = 40;

/// Window margins tried in order before falling back to the whole grid.
///
/// Most wires fit comfortably near the bounding box of their endpoints;
/// searching a small window first keeps the common case fast while the
/// final unrestricted pass preserves completeness.
const WINDOW_MARGINS: [Option<i64>; 3] = [Some(4), Some(10), None];

/// Shared inputs of a single pathfinding call.
pub(crate) struct SearchParams<'a> {
    /// The routing grid.
    pub grid: &'a RoutingGrid,
    /// Blocked-direction masks for the searching net, keyed by [`node_key`].
    pub masks: &'a FxHashMap<u32, u8>,
    /// Escape-step endpoints of the searching net. Turns are allowed on
    /// these cells even when they carry direction markers.
    pub endpoints: &'a IndexSet<Point>,
    /// Whether to charge for crossing cells already used by other wires.
    pub use_congestion: bool,
}

/// An open-set entry. Ordered as a min-heap on `(f, seq)`: equal-cost
/// entries pop in insertion order, which keeps tie-breaking deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f: i64,
    seq: u64,
    node: Point,
    dir: Option<Side>,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.f, other.seq).cmp(&(self.f, self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn turn_cost(dist_to_goal: i64) -> i64 {
    MIN_TURN_COST.max(2 * dist_to_goal)
}

fn congestion_cost(grid: &RoutingGrid, p: Point) -> i64 {
    let uses = grid.usage_at(p) as i64;
    if uses > 0 {
        1 + 8 * uses
    } else {
        0
    }
}

/// Whether a search standing on `node` while traveling `dir` may turn onto
/// a different axis.
fn may_turn(params: &SearchParams, node: Point, origin: Point) -> bool {
    params.grid.state(node) != CellState::DirectionMarker
        || node == origin
        || params.endpoints.contains(&node)
}

/// Finds a unit-step path from `start` to `end`, trying successively larger
/// search windows around the endpoints' bounding box.
///
/// Returns the path including both endpoints, or an empty vector if no path
/// exists even with the window fully open.
pub(crate) fn find_path(
    params: &SearchParams,
    start: Point,
    start_dir: Option<Side>,
    end: Point,
) -> Vec<Point> {
    let bbox = Rect::from_point(start).union(Rect::from_point(end));
    for margin in WINDOW_MARGINS {
        let window = match margin {
            Some(m) => match bbox.expand_all(m).intersection(params.grid.bounds()) {
                Some(w) => w,
                None => continue,
            },
            None => params.grid.bounds(),
        };
        let path = astar(params, start, start_dir, end, window);
        if !path.is_empty() {
            if margin.is_none() {
                tracing::debug!(?start, ?end, "path found only with unrestricted window");
            }
            return path;
        }
    }
    Vec::new()
}

fn astar(
    params: &SearchParams,
    start: Point,
    start_dir: Option<Side>,
    end: Point,
    window: Rect,
) -> Vec<Point> {
    let height = params.grid.height();
    let mut open = BinaryHeap::new();
    let mut in_open: FxHashSet<Point> = FxHashSet::default();
    let mut g: FxHashMap<Point, i64> = FxHashMap::default();
    let mut came_from: FxHashMap<Point, Point> = FxHashMap::default();
    let mut seq = 0u64;

    g.insert(start, 0);
    in_open.insert(start);
    open.push(OpenEntry {
        f: STEP_COST * start.manhattan_distance(end),
        seq,
        node: start,
        dir: start_dir,
    });

    while let Some(OpenEntry { node, dir, .. }) = open.pop() {
        in_open.remove(&node);
        if node == end {
            return reconstruct(&came_from, start, end);
        }
        let node_g = g[&node];
        let blocked_mask = params
            .masks
            .get(&node_key(node, height))
            .copied()
            .unwrap_or(0);

        for side in Side::ALL {
            if blocked_mask & crate::blocked::side_bit(side) != 0 {
                continue;
            }
            let neighbor = node + side.offset();
            if !window.contains(neighbor) || !params.grid.in_bounds(neighbor) {
                continue;
            }
            if params.grid.state(neighbor).is_impassable() {
                continue;
            }
            let turning = dir.is_some_and(|d| d != side);
            if turning && !may_turn(params, node, start) {
                continue;
            }
            let mut cost = node_g + STEP_COST;
            if turning {
                cost += turn_cost(neighbor.manhattan_distance(end));
            }
            if params.use_congestion {
                cost += congestion_cost(params.grid, neighbor);
            }
            if g.get(&neighbor).is_some_and(|&prev| prev <= cost) {
                continue;
            }

            g.insert(neighbor, cost);
            came_from.insert(neighbor, node);
            // A node still queued keeps its entry; the improved score and
            // parent take effect when it pops.
            if in_open.insert(neighbor) {
                seq += 1;
                open.push(OpenEntry {
                    f: cost + STEP_COST * neighbor.manhattan_distance(end),
                    seq,
                    node: neighbor,
                    dir: Some(side),
                });
            }
        }
    }
    Vec::new()
}

fn reconstruct(came_from: &FxHashMap<Point, Point>, start: Point, end: Point) -> Vec<Point> {
    let mut path = vec![end];
    let mut cur = end;
    while cur != start {
        cur = came_from[&cur];
        path.push(cur);
    }
    path.reverse();
    path
}

/// Finds the cheapest path from any of `candidates` to `end`, searching
/// outward from `end`.
///
/// Used for shortcut routing: `candidates` are interior vertices of the
/// net's existing wiring, and the returned path runs candidate-first so it
/// can be committed in wire direction directly. Returns an empty vector if
/// no candidate is reachable.
pub(crate) fn find_branch_path(
    params: &SearchParams,
    end: Point,
    end_dir: Option<Side>,
    candidates: &[Point],
) -> Vec<Point> {
    let bbox = candidates
        .iter()
        .fold(Rect::from_point(end), |acc, &c| {
            acc.union(Rect::from_point(c))
        });
    for margin in WINDOW_MARGINS {
        let window = match margin {
            Some(m) => match bbox.expand_all(m).intersection(params.grid.bounds()) {
                Some(w) => w,
                None => continue,
            },
            None => params.grid.bounds(),
        };
        let path = reverse_astar(params, end, end_dir, candidates, window);
        if !path.is_empty() {
            return path;
        }
    }
    Vec::new()
}

fn reverse_astar(
    params: &SearchParams,
    end: Point,
    end_dir: Option<Side>,
    candidates: &[Point],
    window: Rect,
) -> Vec<Point> {
    let height = params.grid.height();
    let goal_dist = |p: Point| {
        candidates
            .iter()
            .map(|&c| p.manhattan_distance(c))
            .min()
            .unwrap_or(0)
    };

    let mut open = BinaryHeap::new();
    let mut in_open: FxHashSet<Point> = FxHashSet::default();
    let mut g: FxHashMap<Point, i64> = FxHashMap::default();
    let mut came_from: FxHashMap<Point, Point> = FxHashMap::default();
    let mut seq = 0u64;
    let mut best: Option<(i64, Vec<Point>)> = None;

    g.insert(end, 0);
    in_open.insert(end);
    open.push(OpenEntry {
        f: STEP_COST * goal_dist(end),
        seq,
        node: end,
        dir: end_dir,
    });

    while let Some(OpenEntry { node, dir, .. }) = open.pop() {
        in_open.remove(&node);
        let node_g = g[&node];
        if best.as_ref().is_some_and(|(cost, _)| node_g >= *cost) {
            continue;
        }
        if candidates.contains(&node) {
            // came_from points back toward `end`, so this walk already
            // yields the path in candidate-to-end order.
            let mut path = vec![node];
            let mut cur = node;
            while cur != end {
                cur = came_from[&cur];
                path.push(cur);
            }
            best = Some((node_g, path));
            continue;
        }
        let blocked_mask = params
            .masks
            .get(&node_key(node, height))
            .copied()
            .unwrap_or(0);

        for side in Side::ALL {
            if blocked_mask & crate::blocked::side_bit(side) != 0 {
                continue;
            }
            let neighbor = node + side.offset();
            if !window.contains(neighbor) || !params.grid.in_bounds(neighbor) {
                continue;
            }
            if params.grid.state(neighbor).is_impassable() {
                continue;
            }
            let turning = dir.is_some_and(|d| d != side);
            if turning && !may_turn(params, node, end) {
                continue;
            }
            let mut cost = node_g + STEP_COST;
            if turning {
                cost += turn_cost(goal_dist(neighbor));
            }
            if params.use_congestion {
                cost += congestion_cost(params.grid, neighbor);
            }
            if g.get(&neighbor).is_some_and(|&prev| prev <= cost) {
                continue;
            }

            g.insert(neighbor, cost);
            came_from.insert(neighbor, node);
            if in_open.insert(neighbor) {
                seq += 1;
                open.push(OpenEntry {
                    f: cost + STEP_COST * goal_dist(neighbor),
                    seq,
                    node: neighbor,
                    dir: Some(side),
                });
            }
        }
    }
    best.map(|(_, path)| path).unwrap_or_default()
}
