//! Path enumeration, maximum-weight search and path ordering.

use rustc_hash::FxHashSet;
use std::cmp::Ordering;

use crate::graph::NetGraph;
use crate::models::EventId;
use crate::path::Path;

/// Relative float comparison: `|a - b| <= tol * max(1, |a|, |b|)`.
#[inline]
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * 1.0_f64.max(a.abs()).max(b.abs())
}

/// Enumerate every simple path from `start` to `end` by depth-first search.
///
/// Paths are built from `end` backwards with [`Path::prepend`]. Events
/// already on the current route are skipped, so the search terminates even
/// on a graph that failed validation.
pub fn find_paths(graph: &NetGraph, start: EventId, end: EventId) -> Vec<Path> {
    let mut on_route = FxHashSet::default();
    let mut out = Vec::new();
    collect_paths(graph, start, end, &mut on_route, &mut out);
    out
}

fn collect_paths(
    graph: &NetGraph,
    current: EventId,
    end: EventId,
    on_route: &mut FxHashSet<EventId>,
    out: &mut Vec<Path>,
) {
    if current == end {
        out.push(Path::new(graph, end));
        return;
    }
    let Some(event) = graph.event(current) else {
        return;
    };
    on_route.insert(current);

    let mut seen_next = FxHashSet::default();
    for &op in event.outgoing() {
        let Some(next) = graph.operation(op).and_then(|o| o.end()) else {
            continue;
        };
        // Parallel operations describe the same event sequence.
        if on_route.contains(&next) || !seen_next.insert(next) {
            continue;
        }
        let mut tails = Vec::new();
        collect_paths(graph, next, end, on_route, &mut tails);
        for mut tail in tails {
            tail.prepend(graph, current);
            out.push(tail);
        }
    }

    on_route.remove(&current);
}

/// Largest weight among `paths`, or zero when there are none.
pub fn max_weight(paths: &[Path]) -> f64 {
    paths
        .iter()
        .map(Path::weight)
        .fold(None, |best: Option<f64>, w| Some(best.map_or(w, |b| b.max(w))))
        .unwrap_or(0.0)
}

/// Paths whose weight equals the maximum, within tolerance. Every tied path
/// is kept.
pub fn select_max(paths: &[Path], tolerance: f64) -> Vec<Path> {
    let best = max_weight(paths);
    paths
        .iter()
        .filter(|p| approx_eq(p.weight(), best, tolerance))
        .cloned()
        .collect()
}

/// All maximum-weight paths from `start` to `end`.
pub fn max_paths(graph: &NetGraph, start: EventId, end: EventId, tolerance: f64) -> Vec<Path> {
    select_max(&find_paths(graph, start, end), tolerance)
}

/// Weight of the heaviest path from `start` to `end` (zero if none).
pub fn max_path_weight(graph: &NetGraph, start: EventId, end: EventId) -> f64 {
    max_weight(&find_paths(graph, start, end))
}

/// Display order: heavier paths first, then by code.
pub fn cmp_paths(a: &Path, b: &Path) -> Ordering {
    b.weight()
        .partial_cmp(&a.weight())
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.code().cmp(b.code()))
}

/// Stable sort by [`cmp_paths`].
pub fn sort_paths(paths: &mut [Path]) {
    paths.sort_by(cmp_paths);
}

/// Unstable (quicksort-based) sort by [`cmp_paths`]. Gives the same result
/// as [`sort_paths`] because path codes are unique within one network.
pub fn sort_paths_unstable(paths: &mut [Path]) {
    paths.sort_unstable_by(cmp_paths);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(g: &mut NetGraph, a: EventId, b: EventId, d: f64) {
        let op = g.alloc_operation(d);
        g.connect(a, op, b);
    }

    /// Diamond: 1-(2)->2-(2)->4 and 1-(5)->3-(1)->4
    fn diamond() -> (NetGraph, Vec<EventId>) {
        let mut g = NetGraph::new();
        let e: Vec<EventId> = (0..4).map(|i| g.insert_event(i, i as i32 + 1)).collect();
        link(&mut g, e[0], e[1], 2.0);
        link(&mut g, e[1], e[3], 2.0);
        link(&mut g, e[0], e[2], 5.0);
        link(&mut g, e[2], e[3], 1.0);
        (g, e)
    }

    #[test]
    fn test_enumerates_all_paths() {
        let (g, e) = diamond();
        let mut paths = find_paths(&g, e[0], e[3]);
        assert_eq!(paths.len(), 2);

        sort_paths(&mut paths);
        assert_eq!(paths[0].code(), "  1 -  3 -  4");
        assert!((paths[0].weight() - 6.0).abs() < 1e-9);
        assert_eq!(paths[1].code(), "  1 -  2 -  4");
        assert!((paths[1].weight() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_paths_keeps_ties() {
        let (mut g, e) = diamond();
        // Make the upper branch as heavy as the lower one.
        let op = g.operation_between(e[0], e[1]).unwrap();
        g.operation_mut(op).unwrap().wait_time = 4.0;

        let best = max_paths(&g, e[0], e[3], 1e-9);
        assert_eq!(best.len(), 2);
        assert!((max_path_weight(&g, e[0], e[3]) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_start_and_end() {
        let (g, e) = diamond();
        let paths = find_paths(&g, e[2], e[2]);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].weight(), 0.0);
        assert_eq!(max_path_weight(&g, e[2], e[2]), 0.0);
    }

    #[test]
    fn test_no_path_between_events() {
        let (g, e) = diamond();
        assert!(find_paths(&g, e[3], e[0]).is_empty());
        assert_eq!(max_path_weight(&g, e[3], e[0]), 0.0);
        assert!(max_paths(&g, e[3], e[0], 1e-9).is_empty());
    }

    #[test]
    fn test_terminates_on_cycle() {
        let (mut g, e) = diamond();
        link(&mut g, e[3], e[0], 1.0);
        assert_eq!(find_paths(&g, e[0], e[3]).len(), 2);
    }

    #[test]
    fn test_sort_orders_agree() {
        let (g, e) = diamond();
        let mut stable = find_paths(&g, e[0], e[3]);
        let mut unstable = stable.clone();
        sort_paths(&mut stable);
        sort_paths_unstable(&mut unstable);
        assert_eq!(stable, unstable);
    }

    #[test]
    fn test_approx_eq_is_relative() {
        assert!(approx_eq(0.1 + 0.2, 0.3, 1e-9));
        assert!(approx_eq(1e12, 1e12 + 1e-1, 1e-9));
        assert!(!approx_eq(1.0, 1.001, 1e-9));
    }
}
