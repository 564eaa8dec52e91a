//! The blocked-move index: per-edge crossing restrictions derived from
//! committed wires.
//!
//! A committed wire does not block the cells it crosses outright (nets may
//! cross each other perpendicularly); instead it blocks *movement along* its
//! own straight runs, so a later net cannot overlap it in parallel. Interior
//! corner vertices are blocked in all four directions, since a wire passing
//! through another net's corner would be indistinguishable from a junction.

use arcstr::ArcStr;
use geometry::prelude::{Point, Side};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::grid::node_key;

/// A straight wire segment between two corner points.
pub type Segment = (Point, Point);

/// The bit recording that travel *toward* `side` is blocked.
#[inline]
pub fn side_bit(side: Side) -> u8 {
    match side {
        Side::Top => 1 << 0,
        Side::Bot => 1 << 1,
        Side::Right => 1 << 2,
        Side::Left => 1 << 3,
    }
}

/// The blocked moves visible to one net, with the per-cell direction masks
/// derived from them.
#[derive(Debug, Default)]
pub struct BlockedMoves {
    version: u64,
    /// Directed unit moves `(from, to)` that are forbidden.
    moves: FxHashSet<(Point, Point)>,
    /// For each grid height, a map from [`node_key`] to a 4-bit mask of
    /// blocked travel directions out of that cell.
    masks: FxHashMap<i64, FxHashMap<u32, u8>>,
}

impl BlockedMoves {
    /// Whether the unit move `from -> to` is blocked.
    pub fn is_blocked(&self, from: Point, to: Point) -> bool {
        self.moves.contains(&(from, to))
    }

    /// The per-cell direction masks for a grid of the given height.
    pub fn masks(&mut self, height: i64) -> &FxHashMap<u32, u8> {
        self.masks.entry(height).or_insert_with(|| {
            let mut masks: FxHashMap<u32, u8> = FxHashMap::default();
            for &(from, to) in &self.moves {
                let step = to - from;
                let side = Side::ALL
                    .into_iter()
                    .find(|s| s.offset() == step)
                    .expect("blocked moves are unit steps");
                *masks.entry(node_key(from, height)).or_insert(0) |= side_bit(side);
            }
            masks
        })
    }

    fn block_move(&mut self, a: Point, b: Point) {
        self.moves.insert((a, b));
        self.moves.insert((b, a));
    }

    fn block_all_directions(&mut self, p: Point) {
        for side in Side::ALL {
            self.block_move(p, p + side.offset());
        }
    }
}

/// A cache of [`BlockedMoves`] per querying net.
///
/// The entry for net `n` summarizes the committed wiring of every net
/// *other than* `n`, and is invalidated by bumping any of those nets'
/// version counters.
#[derive(Debug, Default)]
pub struct BlockedMoveIndex {
    cache: FxHashMap<ArcStr, BlockedMoves>,
}

impl BlockedMoveIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// The blocked moves visible to `net`, recomputing from `segments` if
    /// any other net's version counter changed since the last query.
    ///
    /// `segments` maps each net to its committed wires, one segment list per
    /// wire; `versions` carries each net's commit counter.
    pub fn entry(
        &mut self,
        net: &ArcStr,
        segments: &IndexMap<ArcStr, Vec<Vec<Segment>>>,
        versions: &IndexMap<ArcStr, u64>,
    ) -> &mut BlockedMoves {
        let version: u64 = versions
            .iter()
            .filter(|(other, _)| *other != net)
            .map(|(_, v)| *v)
            .sum::<u64>()
            .wrapping_add(1);

        let entry = self.cache.entry(net.clone()).or_default();
        if entry.version != version {
            tracing::debug!(%net, version, "recomputing blocked moves");
            *entry = compute_blocked_moves(net, segments);
            entry.version = version;
        }
        entry
    }
}

fn compute_blocked_moves(
    net: &ArcStr,
    segments: &IndexMap<ArcStr, Vec<Vec<Segment>>>,
) -> BlockedMoves {
    let mut blocked = BlockedMoves::default();
    for (other, wires) in segments {
        if other == net {
            continue;
        }
        for runs in wires {
            for &(a, b) in runs {
                let span = b - a;
                let len = span.x.abs() + span.y.abs();
                if len == 0 {
                    continue;
                }
                let step = Point::new(span.x.signum(), span.y.signum());
                let mut cur = a;
                for _ in 0..len {
                    let next = cur + step;
                    blocked.block_move(cur, next);
                    cur = next;
                }
            }
            // Wires with more than one run turn at the shared endpoints of
            // consecutive runs; those corner cells admit no traffic at all.
            if runs.len() > 1 {
                for pair in runs.windows(2) {
                    blocked.block_all_directions(pair[0].1);
                }
            }
        }
    }
    blocked
}
