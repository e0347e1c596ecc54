use log::{debug, trace};
use ordered_float::OrderedFloat;
use sarroute_structs::plan::Route;
use sarroute_structs::{Point, VisitPoint};

/// Nearest-neighbor visiting order over `locs`, starting at `start`.
///
/// Each step picks the closest remaining location to the current cursor
/// and moves the cursor there. Ties go to the location that comes first in
/// `locs`, so the result only depends on the input order and coordinates.
/// This is O(n^2) and makes no attempt at optimality.
pub fn nearest_neighbor_order(start: Point, locs: &[Point]) -> Vec<usize> {
    let mut remaining = (0..locs.len()).collect::<Vec<_>>();
    let mut order = Vec::with_capacity(locs.len());
    let mut cursor = start;

    while let Some((pos, idx)) = remaining
        .iter()
        .copied()
        .enumerate()
        .min_by_key(|(_, i)| OrderedFloat(cursor.dist(&locs[*i])))
    {
        trace!(" nearest to {:?} is #{} at {:?}", cursor, idx, locs[idx]);
        // `remove`, not `swap_remove`: the tie-break depends on input order.
        remaining.remove(pos);
        cursor = locs[idx];
        order.push(idx);
    }

    order
}

/// The pending points reordered into visiting order.
pub fn greedy_tour(start: Point, pending: &[VisitPoint]) -> Vec<VisitPoint> {
    let locs = pending.iter().map(|p| p.loc).collect::<Vec<_>>();
    nearest_neighbor_order(start, &locs)
        .into_iter()
        .map(|i| pending[i].clone())
        .collect()
}

pub fn build_tour(start: Point, pending: &[VisitPoint]) -> Route {
    let tour = greedy_tour(start, pending);
    debug!(
        "built tour from ({}, {}) over {} points: {:?}",
        start.x,
        start.y,
        tour.len(),
        tour.iter().map(|p| p.id.as_str()).collect::<Vec<_>>()
    );
    Route::new(tour.into_iter().map(|p| p.loc).collect())
}
