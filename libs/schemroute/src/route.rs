//! The routing orchestrator: placement, scheduling, search, commit, and
//! recovery.

use arcstr::ArcStr;
use geometry::prelude::Point;
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;

use crate::blocked::{BlockedMoveIndex, Segment};
use crate::grid::RoutingGrid;
use crate::order::{order_connections, resolve_net};
use crate::path::{find_branch_path, find_path, SearchParams};
use crate::simplify::{dedup_shared_prefixes, polyline_segments, reduce_to_corners};
use crate::{Component, Connection, Port, Result, RouterError, RouterOptions};

/// The outcome of a routing run.
#[derive(Debug, Clone)]
pub struct RoutingResult {
    /// Corner-only wire polylines per net, in net commit order.
    pub wires: IndexMap<ArcStr, Vec<Vec<Point>>>,
    /// Connections that could not be routed.
    pub failures: Vec<Connection>,
    /// The final grid, with all committed wires stamped in.
    pub grid: RoutingGrid,
}

/// A sequential, greedy schematic wire router.
///
/// Connections are routed one at a time in schedule order; each committed
/// wire becomes an obstacle (soft, via congestion and blocked moves) for
/// later ones. A connection that cannot be routed triggers a bounded
/// rip-up/reroute exchange with the most recently committed connections
/// before being reported as a failure.
#[derive(Debug, Clone, Default)]
pub struct GreedyRouter {
    options: RouterOptions,
}

impl GreedyRouter {
    /// Creates a router with the given options.
    pub fn new(options: RouterOptions) -> Self {
        Self { options }
    }

    /// Routes `connections` on a `width` by `height` grid populated with
    /// the given components and ports.
    ///
    /// Unroutable connections are collected in
    /// [`RoutingResult::failures`]; only malformed inputs produce an
    /// [`Err`].
    pub fn route(
        &self,
        width: i64,
        height: i64,
        components: &[Component],
        ports: &[Port],
        connections: Vec<Connection>,
    ) -> Result<RoutingResult> {
        let mut grid = RoutingGrid::new(width, height);
        for component in components {
            grid.place_component(component);
        }
        for port in ports {
            grid.place_port(port);
        }

        let order = order_connections(&grid, connections)?;
        let mut state = RouterState {
            grid,
            endpoints: order.endpoints,
            buckets: IndexMap::new(),
            segments: IndexMap::new(),
            versions: IndexMap::new(),
            blocked: BlockedMoveIndex::new(),
            commits: Vec::new(),
            failures: Vec::new(),
            options: self.options,
        };

        for conn in order.connections {
            state.route_connection(conn)?;
        }
        Ok(state.finish())
    }
}

/// A committed connection, retained so rip-up can undo it exactly.
#[derive(Debug, Clone)]
struct Committed {
    net: ArcStr,
    conn: Connection,
    path: Vec<Point>,
}

struct RouterState {
    grid: RoutingGrid,
    endpoints: FxHashMap<ArcStr, IndexSet<Point>>,
    /// Raw unit-step paths per net, in commit order.
    buckets: IndexMap<ArcStr, Vec<Vec<Point>>>,
    /// Corner segments per net, mirroring `buckets`; input to the
    /// blocked-move index.
    segments: IndexMap<ArcStr, Vec<Vec<Segment>>>,
    /// Per-net commit counters. Bumped on every commit *and* every undo,
    /// so other nets' blocked-move caches always refresh.
    versions: IndexMap<ArcStr, u64>,
    blocked: BlockedMoveIndex,
    commits: Vec<Committed>,
    failures: Vec<Connection>,
    options: RouterOptions,
}

impl RouterState {
    fn route_connection(&mut self, conn: Connection) -> Result<()> {
        match self.attempt(&conn)? {
            Some((net, path)) => {
                tracing::debug!(%net, points = path.len(), "committed connection");
                self.commit(net, conn, path);
            }
            None => {
                if !self.ripup_reroute(&conn)? {
                    tracing::warn!(
                        start = ?conn.start.loc(),
                        end = ?conn.end.loc(),
                        "failed to route connection"
                    );
                    self.failures.push(conn);
                }
            }
        }
        Ok(())
    }

    /// Searches for a path for `conn` without mutating routing state.
    ///
    /// Returns the net name and the full raw path (terminal cells
    /// included), or [`None`] if no path exists.
    fn attempt(&mut self, conn: &Connection) -> Result<Option<(ArcStr, Vec<Point>)>> {
        let net = resolve_net(&self.grid, conn)?;
        let start_adj = conn.start.escape_loc();
        let end_adj = conn.end.escape_loc();
        let height = self.grid.height();

        let entry = self.blocked.entry(&net, &self.segments, &self.versions);
        let masks = entry.masks(height);
        let empty = IndexSet::new();
        let endpoints = self.endpoints.get(&net).unwrap_or(&empty);

        let mut used_shortcut = false;
        let mut path = Vec::new();
        let committed = self.buckets.get(&net).is_some_and(|b| !b.is_empty());
        if self.options.shortcut && committed {
            let candidates: Vec<Point> = self.buckets[&net]
                .iter()
                .filter(|p| p.len() > 2)
                .flat_map(|p| p[1..p.len() - 1].iter().copied())
                .collect();
            if candidates.is_empty() {
                return Err(RouterError::NoBranchPoints { net });
            }
            if candidates.contains(&end_adj) {
                // The escape step already lies on the net's wiring.
                path = vec![end_adj];
                used_shortcut = true;
            } else {
                let params = SearchParams {
                    grid: &self.grid,
                    masks,
                    endpoints,
                    use_congestion: false,
                };
                path = find_branch_path(&params, end_adj, Some(conn.end.escape()), &candidates);
                used_shortcut = !path.is_empty();
            }
        }

        if !used_shortcut && path.is_empty() {
            let params = SearchParams {
                grid: &self.grid,
                masks,
                endpoints,
                use_congestion: true,
            };
            path = find_path(&params, start_adj, Some(conn.start.escape()), end_adj);
            if path.is_empty() {
                return Ok(None);
            }
        }

        let mut full = Vec::with_capacity(path.len() + 2);
        if !used_shortcut {
            full.push(conn.start.loc());
        }
        full.extend(path);
        full.push(conn.end.loc());
        Ok(Some((net, full)))
    }

    fn commit(&mut self, net: ArcStr, conn: Connection, path: Vec<Point>) {
        for &p in &path {
            self.grid.mark_used(p);
        }
        let reduced = reduce_to_corners(std::slice::from_ref(&path));
        self.segments
            .entry(net.clone())
            .or_default()
            .extend(polyline_segments(&reduced));
        self.buckets.entry(net.clone()).or_default().push(path.clone());
        *self.versions.entry(net.clone()).or_insert(0) += 1;
        self.commits.push(Committed { net, conn, path });
    }

    fn uncommit_last(&mut self) -> Option<Committed> {
        let committed = self.commits.pop()?;
        for &p in &committed.path {
            self.grid.release(p);
        }
        if let Some(bucket) = self.buckets.get_mut(&committed.net) {
            bucket.pop();
        }
        if let Some(segs) = self.segments.get_mut(&committed.net) {
            segs.pop();
        }
        *self.versions.entry(committed.net.clone()).or_insert(0) += 1;
        Some(committed)
    }

    /// Undoes recent commits one at a time, up to the rip-up budget, until
    /// `conn` routes in the freed space, then reroutes the undone
    /// connections oldest-first.
    ///
    /// If `conn` never routes, or rerouting strands one of the undone
    /// connections, the previous state is restored exactly, so a failed
    /// exchange never loses an already-committed connection. Returns
    /// whether `conn` was committed.
    fn ripup_reroute(&mut self, conn: &Connection) -> Result<bool> {
        let mut victims: Vec<Committed> = Vec::new();
        let routed = loop {
            if victims.len() >= self.options.ripup_retries {
                break None;
            }
            let Some(victim) = self.uncommit_last() else {
                break None;
            };
            tracing::debug!(
                victim = %victim.net,
                freed = victims.len() + 1,
                "ripping up committed connection"
            );
            victims.push(victim);
            if let Some(found) = self.attempt(conn)? {
                break Some(found);
            }
        };

        let Some((net, path)) = routed else {
            self.restore(victims);
            return Ok(false);
        };
        self.commit(net, conn.clone(), path);

        let mut rerouted = 0;
        for victim in victims.iter().rev() {
            match self.attempt(&victim.conn)? {
                Some((vnet, vpath)) => {
                    self.commit(vnet, victim.conn.clone(), vpath);
                    rerouted += 1;
                }
                None => break,
            }
        }
        if rerouted == victims.len() {
            return Ok(true);
        }
        // The exchange stranded a victim; undo the reroutes and `conn`
        // itself, then put every victim back on its original path.
        for _ in 0..=rerouted {
            let _ = self.uncommit_last();
        }
        self.restore(victims);
        Ok(false)
    }

    /// Re-commits undone connections on their original paths, oldest first.
    fn restore(&mut self, victims: Vec<Committed>) {
        for victim in victims.into_iter().rev() {
            self.commit(victim.net, victim.conn, victim.path);
        }
    }

    fn finish(self) -> RoutingResult {
        let mut wires = IndexMap::with_capacity(self.buckets.len());
        for (net, paths) in &self.buckets {
            let simplified = if self.options.shortcut {
                reduce_to_corners(paths)
            } else {
                reduce_to_corners(&dedup_shared_prefixes(paths))
            };
            wires.insert(net.clone(), simplified);
        }
        RoutingResult {
            wires,
            failures: self.failures,
            grid: self.grid,
        }
    }
}
