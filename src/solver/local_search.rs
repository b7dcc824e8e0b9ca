use crate::problem::shortest_paths::DistanceMatrix;
use crate::problem::{CarpInstance, Cost};
use crate::solution::Solution;
use crate::solver::evaluation::route_cost;

/// First-improvement local search over a bounded number of passes.
///
/// Each pass tries inter-route relocation first and, only when no relocation
/// improves, intra-route segment reversal. The first strictly improving move
/// ends the pass and the scan restarts from the beginning. The loop stops on
/// a pass without any improving move, or when the budget runs out. Iteration
/// order is fixed (routes ascending, positions ascending), so the search is
/// deterministic.
pub fn improve(
    solution: &mut Solution,
    instance: &CarpInstance,
    distances: &DistanceMatrix,
    max_passes: usize,
) {
    let mut best_total = solution.total_cost();

    for _ in 0..max_passes {
        let improved = relocate_any(solution, instance, distances, &mut best_total)
            || reverse_any_segment(solution, instance, distances, &mut best_total);
        if !improved {
            break;
        }
    }
}

/// Moves a single service from one route into another, trying every ordered
/// route pair and every insertion position, and applies the first move that
/// keeps the target within capacity and strictly lowers the total cost.
fn relocate_any(
    solution: &mut Solution,
    instance: &CarpInstance,
    distances: &DistanceMatrix,
    best_total: &mut Cost,
) -> bool {
    for i in 0..solution.routes.len() {
        for j in 0..solution.routes.len() {
            if i == j {
                continue;
            }
            for pos_i in 0..solution.routes[i].len() {
                let service = solution.routes[i].services[pos_i];
                let demand = instance.service(service.id).demand;
                if solution.routes[j].demand + demand > instance.capacity {
                    continue;
                }

                for pos_j in 0..=solution.routes[j].len() {
                    let mut donor = solution.routes[i].services.clone();
                    donor.remove(pos_i);
                    let mut receiver = solution.routes[j].services.clone();
                    receiver.insert(pos_j, service);

                    let Some(donor_cost) = route_cost(&donor, instance, distances) else {
                        continue;
                    };
                    let Some(receiver_cost) = route_cost(&receiver, instance, distances) else {
                        continue;
                    };

                    let unchanged =
                        *best_total - solution.routes[i].cost - solution.routes[j].cost;
                    let new_total = unchanged + donor_cost + receiver_cost;
                    if new_total < *best_total {
                        let routes = &mut solution.routes;
                        routes[i].services = donor;
                        routes[i].cost = donor_cost;
                        routes[i].demand -= demand;
                        routes[j].services = receiver;
                        routes[j].cost = receiver_cost;
                        routes[j].demand += demand;
                        *best_total = new_total;
                        return true;
                    }
                }
            }
        }
    }
    false
}

/// Reverses a contiguous segment of at least two services within a route,
/// applying the first reversal that strictly lowers that route's own cost.
fn reverse_any_segment(
    solution: &mut Solution,
    instance: &CarpInstance,
    distances: &DistanceMatrix,
    best_total: &mut Cost,
) -> bool {
    for r in 0..solution.routes.len() {
        let len = solution.routes[r].len();
        for start in 0..len {
            for end in (start + 2)..=len {
                let mut reversed = solution.routes[r].services.clone();
                reversed[start..end].reverse();

                let Some(new_cost) = route_cost(&reversed, instance, distances) else {
                    continue;
                };
                if new_cost < solution.routes[r].cost {
                    solution.routes[r].services = reversed;
                    solution.routes[r].cost = new_cost;
                    *best_total = solution.total_cost();
                    return true;
                }
            }
        }
    }
    false
}
