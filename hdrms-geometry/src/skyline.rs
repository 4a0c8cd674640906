use std::borrow::Borrow;

use itertools::Itertools;

use crate::point::{Point, PointSet, PointView};

/// `a` dominates `b` when it is at least as good everywhere and strictly
/// better somewhere (larger is better).
pub fn dominates(a: &Point, b: &Point) -> bool {
    let mut strictly = false;
    for (x, y) in a.coords().iter().zip(b.coords()) {
        if x < y {
            return false;
        }
        if x > y {
            strictly = true;
        }
    }
    strictly
}

/// Points of `set` not dominated by any other member, in input order.
///
/// Block-nested loop over candidates sorted by coordinate sum: a point can
/// only be dominated by one with a strictly larger sum, so each candidate is
/// compared against the window of survivors seen so far.
pub fn skyline<P: Borrow<Point>>(set: &PointSet<P>) -> PointView<'_> {
    let points: Vec<&Point> = set.iter().collect();
    let sums: Vec<f64> = points.iter().map(|p| p.coords().iter().sum()).collect();
    let order = (0..points.len()).sorted_by(|&a, &b| sums[b].total_cmp(&sums[a]).then(a.cmp(&b)));

    let mut keep = vec![false; points.len()];
    let mut window: Vec<usize> = Vec::new();
    for i in order {
        if window.iter().any(|&w| dominates(points[w], points[i])) {
            continue;
        }
        keep[i] = true;
        window.push(i);
    }

    points
        .into_iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(p))
        .collect()
}
