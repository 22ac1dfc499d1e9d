//! NSGA-II selection: fast non-dominated sorting plus crowding distance.
//!
//! All objectives are minimised.

use crate::fitness::Fitness;

/// Outcome of comparing two objective vectors.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParetoCompare {
    ADominatesB,
    Equal,
    BDominatesA,
}

/// `Equal` covers both identical and mutually non-dominated vectors.
pub fn pareto_compare(a: &Fitness, b: &Fitness) -> ParetoCompare {
    let mut a_better = false;
    let mut b_better = false;
    for (x, y) in a.objectives().into_iter().zip(b.objectives()) {
        if x < y {
            a_better = true;
        } else if x > y {
            b_better = true;
        }
    }
    match (a_better, b_better) {
        (true, false) => ParetoCompare::ADominatesB,
        (false, true) => ParetoCompare::BDominatesA,
        _ => ParetoCompare::Equal,
    }
}

/// `a` is no worse in every objective and strictly better in one.
#[inline]
pub fn dominates(a: &Fitness, b: &Fitness) -> bool {
    pareto_compare(a, b) == ParetoCompare::ADominatesB
}

/// Partition `fits` into successive non-dominated fronts.
///
/// Front 0 is the Pareto front.  Indices inside each front are ascending.
/// O(M·N²) for N individuals and M objectives.
pub fn non_dominated_sort(fits: &[Fitness]) -> Vec<Vec<usize>> {
    let n = fits.len();
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut domination_count = vec![0usize; n];

    for i in 0..n {
        for j in (i + 1)..n {
            match pareto_compare(&fits[i], &fits[j]) {
                ParetoCompare::ADominatesB => {
                    dominated_by[i].push(j);
                    domination_count[j] += 1;
                }
                ParetoCompare::BDominatesA => {
                    dominated_by[j].push(i);
                    domination_count[i] += 1;
                }
                ParetoCompare::Equal => {}
            }
        }
    }

    let mut fronts = Vec::new();
    let mut current: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();
    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            for &j in &dominated_by[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    next.push(j);
                }
            }
        }
        next.sort_unstable();
        fronts.push(current);
        current = next;
    }
    fronts
}

/// Crowding distance of every member of `front`, in `front` order.
///
/// Boundary members of each objective get `f64::INFINITY`.  Each objective's
/// contribution is normalised by its range over the front.
pub fn crowding_distance(fits: &[Fitness], front: &[usize]) -> Vec<f64> {
    let len = front.len();
    let mut dist = vec![0.0; len];
    if len == 0 {
        return dist;
    }
    if len <= 2 {
        dist.fill(f64::INFINITY);
        return dist;
    }

    let objectives = fits[front[0]].objectives().len();
    let mut order: Vec<usize> = (0..len).collect();
    for m in 0..objectives {
        let value = |k: usize| fits[front[k]].objectives()[m];
        order.sort_by(|&a, &b| value(a).total_cmp(&value(b)));

        let first = value(order[0]);
        let last = value(order[len - 1]);
        dist[order[0]] = f64::INFINITY;
        dist[order[len - 1]] = f64::INFINITY;

        let range = last - first;
        if range <= 0.0 {
            continue;
        }
        for w in 1..len - 1 {
            let k = order[w];
            dist[k] += (value(order[w + 1]) - value(order[w - 1])) / range;
        }
    }
    dist
}

/// Choose `k` survivors from `fits` (μ+λ truncation).
///
/// Whole fronts are taken in rank order; the front that overflows is cut by
/// descending crowding distance, ties keeping lower indices.
pub fn select(fits: &[Fitness], k: usize) -> Vec<usize> {
    let mut chosen = Vec::with_capacity(k);
    for front in non_dominated_sort(fits) {
        if chosen.len() >= k {
            break;
        }
        if chosen.len() + front.len() <= k {
            chosen.extend_from_slice(&front);
            continue;
        }
        let dist = crowding_distance(fits, &front);
        let mut ranked: Vec<usize> = (0..front.len()).collect();
        ranked.sort_by(|&a, &b| dist[b].total_cmp(&dist[a]));
        let room = k - chosen.len();
        chosen.extend(ranked.into_iter().take(room).map(|r| front[r]));
    }
    chosen
}
