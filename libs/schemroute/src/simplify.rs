//! Polyline simplification for committed wire paths.

use geometry::prelude::Point;
use itertools::Itertools;
use rustc_hash::FxHashSet;

use crate::blocked::Segment;

/// Reduces unit-step paths to corner-only polylines.
///
/// Every retained point is an endpoint, a corner, or a *starter*: the first
/// vertex of a later path in the same list, preserved so branch attachment
/// points stay addressable after simplification. The first path of a
/// multi-path list additionally keeps its second point, pinning the escape
/// step of the net's primary terminal.
///
/// Paths of two or fewer points pass through unchanged. The operation is
/// idempotent: reapplying it to its own output returns the output.
pub fn reduce_to_corners(paths: &[Vec<Point>]) -> Vec<Vec<Point>> {
    let starters: FxHashSet<Point> = paths.iter().skip(1).filter_map(|p| p.first().copied()).collect();
    let mut first_path = true;
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        if path.len() <= 2 {
            out.push(path.clone());
            continue;
        }
        let mut kept;
        let scan_from;
        if first_path && paths.len() > 1 {
            kept = vec![path[0], path[1]];
            scan_from = 2;
        } else {
            kept = vec![path[0]];
            scan_from = 1;
        }
        first_path = false;
        for i in scan_from..path.len() - 1 {
            let (prev, cur, next) = (path[i - 1], path[i], path[i + 1]);
            let corner = (prev.x != cur.x && cur.y != next.y) || (prev.y != cur.y && cur.x != next.x);
            if corner || starters.contains(&cur) {
                kept.push(cur);
            }
        }
        kept.push(path[path.len() - 1]);
        out.push(kept);
    }
    out
}

/// Removes the prefix each later path shares with the *first* path in the
/// list.
///
/// When all paths of a net leave the same terminal, their common initial
/// run would otherwise be drawn once per path. The first path is always
/// kept whole; each later path is trimmed to begin at the last shared
/// point, so the wiring still connects. Paths sharing no prefix with the
/// first path are kept unchanged, and a path fully contained in the first
/// path's prefix becomes empty.
pub fn dedup_shared_prefixes(paths: &[Vec<Point>]) -> Vec<Vec<Point>> {
    let Some(first) = paths.first() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(paths.len());
    out.push(first.clone());
    for path in &paths[1..] {
        let overlap = path
            .iter()
            .zip(first.iter())
            .take_while(|(a, b)| a == b)
            .count();
        if overlap == path.len() {
            out.push(Vec::new());
        } else if overlap == 0 {
            out.push(path.clone());
        } else {
            out.push(path[overlap - 1..].to_vec());
        }
    }
    out
}

/// Converts corner polylines to flat lists of straight segments.
pub fn polyline_segments(paths: &[Vec<Point>]) -> Vec<Vec<Segment>> {
    paths
        .iter()
        .map(|path| path.iter().copied().tuple_windows().collect())
        .collect()
}
