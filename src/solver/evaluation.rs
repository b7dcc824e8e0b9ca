use itertools::Itertools;

use crate::problem::shortest_paths::{DistanceMatrix, UNREACHABLE};
use crate::problem::{CarpInstance, Cost};
use crate::solution::Service;

/// Total cost of servicing `services` in order, starting and ending at the
/// depot: depot to first origin, per-service service cost, travel between
/// consecutive services where destination and next origin differ, last
/// destination back to the depot.
///
/// This is the single source of truth for route cost; the improver recomputes
/// affected routes through here for every candidate move instead of trusting
/// incremental deltas. Returns `None` as soon as any travel leg is
/// unreachable, so an infinite distance can never pose as a cheap move.
pub fn route_cost(
    services: &[Service],
    instance: &CarpInstance,
    distances: &DistanceMatrix,
) -> Option<Cost> {
    let (first, last) = match (services.first(), services.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Some(0),
    };

    let mut cost = leg(distances.distance(instance.depot, first.from))?;

    for service in services {
        cost += service_cost_of(instance, service);
    }

    for (a, b) in services.iter().tuple_windows() {
        if a.to != b.from {
            cost += leg(distances.distance(a.to, b.from))?;
        }
    }

    cost += leg(distances.distance(last.to, instance.depot))?;

    Some(cost)
}

#[inline(always)]
fn leg(distance: Cost) -> Option<Cost> {
    (distance != UNREACHABLE).then_some(distance)
}

/// Service cost of a traversal: first record in input order whose endpoints
/// match, where non-required records also match with reversed endpoints.
/// Reversed matches contribute nothing today (non-required records carry no
/// service cost); the rule is kept as-is rather than tightened.
fn service_cost_of(instance: &CarpInstance, service: &Service) -> Cost {
    instance
        .edges
        .iter()
        .find(|e| {
            (e.from == service.from && e.to == service.to)
                || (!e.required && e.from == service.to && e.to == service.from)
        })
        .map(|e| e.service_cost)
        .unwrap_or(0)
}
