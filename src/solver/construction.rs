use anyhow::{anyhow, bail, Result};
use fixedbitset::FixedBitSet;

use crate::problem::shortest_paths::{DistanceMatrix, UNREACHABLE};
use crate::problem::{CarpInstance, Cost};
use crate::solution::{Route, Service, Solution};
use crate::solver::evaluation::route_cost;

/// Greedy path-scanning construction.
///
/// Vehicles are filled one at a time from the depot. Among the unserved
/// services that still fit the residual capacity, the next one minimizes
/// `(service_cost + distance(current, from)) / demand`, biased away from the
/// depot while the route is below 70% load and towards it afterwards. Ties
/// keep the first candidate in input order.
pub fn path_scanning(instance: &CarpInstance, distances: &DistanceMatrix) -> Result<Solution> {
    for edge in instance.required_edges() {
        if edge.demand > instance.capacity {
            bail!(
                "service {} ({} -> {}) has demand {} exceeding the vehicle capacity {}",
                edge.id,
                edge.from,
                edge.to,
                edge.demand,
                instance.capacity
            );
        }
        if edge.demand == 0 {
            bail!(
                "service {} ({} -> {}) has zero demand",
                edge.id,
                edge.from,
                edge.to
            );
        }
    }

    let num_required = instance.num_required();
    let mut unserved = FixedBitSet::with_capacity(num_required);
    unserved.insert_range(..);
    let mut remaining = num_required;

    let mut solution = Solution::new();

    while remaining > 0 {
        let mut route = Route::new();
        let mut current = instance.depot;

        loop {
            let mut best: Option<(usize, f64)> = None;
            let mut fits_but_unreachable: Option<usize> = None;

            for bit in unserved.ones() {
                let edge = instance.service(bit + 1);
                if route.demand + edge.demand > instance.capacity {
                    continue;
                }
                let reach = distances.distance(current, edge.from);
                if reach == UNREACHABLE {
                    fits_but_unreachable.get_or_insert(bit);
                    continue;
                }

                let from_to_depot = score_distance(distances.distance(edge.from, instance.depot));
                let to_to_depot = score_distance(distances.distance(edge.to, instance.depot));

                let mut score = (edge.service_cost + reach) as f64 / edge.demand as f64;
                if (route.demand as f64) < instance.capacity as f64 * 0.7 {
                    score -= from_to_depot.max(to_to_depot) * 0.3;
                } else {
                    score += from_to_depot.min(to_to_depot) * 0.3;
                }

                if best.map_or(true, |(_, best_score)| score < best_score) {
                    best = Some((bit, score));
                }
            }

            match best {
                Some((bit, _)) => {
                    let edge = instance.service(bit + 1);
                    route.services.push(Service {
                        from: edge.from,
                        to: edge.to,
                        id: edge.id,
                    });
                    route.demand += edge.demand;
                    current = edge.to;
                    unserved.set(bit, false);
                    remaining -= 1;
                }
                None => {
                    if let Some(bit) = fits_but_unreachable {
                        if route.is_empty() {
                            // a fresh vehicle starts at the depot; if even that
                            // cannot reach the service, nothing ever will
                            let edge = instance.service(bit + 1);
                            bail!(
                                "service {} ({} -> {}) cannot be reached from the depot {}",
                                edge.id,
                                edge.from,
                                edge.to,
                                instance.depot
                            );
                        }
                    }
                    break;
                }
            }
        }

        if !route.is_empty() {
            route.cost = route_cost(&route.services, instance, distances).ok_or_else(|| {
                anyhow!(
                    "route ending at vertex {} cannot return to the depot {}",
                    current,
                    instance.depot
                )
            })?;
            solution.routes.push(route);
        }
    }

    Ok(solution)
}

#[inline(always)]
fn score_distance(distance: Cost) -> f64 {
    if distance == UNREACHABLE {
        f64::INFINITY
    } else {
        distance as f64
    }
}

#[cfg(test)]
mod tests {
    use fixedbitset::FixedBitSet;

    use super::*;
    use crate::problem::adjacency::AdjacencyMatrixBuilder;
    use crate::problem::{create_instance_with, Capacity, EdgeKind, ServiceEdge, Vertex};

    fn required(
        from: Vertex,
        to: Vertex,
        cost: Cost,
        demand: Capacity,
        service_cost: Cost,
    ) -> ServiceEdge {
        ServiceEdge {
            from,
            to,
            traversal_cost: cost,
            demand,
            service_cost,
            kind: EdgeKind::Edge,
            required: true,
            id: 0,
        }
    }

    fn free_edge(from: Vertex, to: Vertex, cost: Cost) -> ServiceEdge {
        ServiceEdge {
            from,
            to,
            traversal_cost: cost,
            demand: 0,
            service_cost: 0,
            kind: EdgeKind::Edge,
            required: false,
            id: 0,
        }
    }

    fn build(edges: Vec<ServiceEdge>, n: usize, capacity: Capacity) -> CarpInstance {
        let mut builder = AdjacencyMatrixBuilder::with_num_vertices(n);
        for e in &edges {
            if e.required {
                builder.set_arc(e.from, e.to, e.traversal_cost);
            } else {
                builder.set_edge(e.from, e.to, e.traversal_cost);
            }
        }
        create_instance_with("test", builder.build(), edges, capacity, 1).unwrap()
    }

    fn assert_partition(instance: &CarpInstance, solution: &Solution) {
        let mut served = FixedBitSet::with_capacity(instance.num_required());
        for route in &solution.routes {
            for service in &route.services {
                assert!(
                    !served.contains(service.id - 1),
                    "service {} served twice",
                    service.id
                );
                served.insert(service.id - 1);
            }
        }
        assert_eq!(served.count_ones(..), instance.num_required());
    }

    #[test]
    fn chain_fits_a_single_route() -> Result<()> {
        let instance = build(
            vec![
                required(1, 2, 2, 3, 1),
                required(2, 3, 3, 4, 2),
                free_edge(3, 1, 4),
            ],
            4,
            10,
        );
        let distances = DistanceMatrix::floyd_warshall(&instance.adjacency);
        let solution = path_scanning(&instance, &distances)?;

        assert_eq!(solution.num_routes(), 1);
        let route = &solution.routes[0];
        assert_eq!(route.demand, 7);
        assert_eq!(route.cost, 7);
        assert_eq!(
            route.services,
            vec![
                Service { from: 1, to: 2, id: 1 },
                Service { from: 2, to: 3, id: 2 },
            ]
        );
        assert_partition(&instance, &solution);
        Ok(())
    }

    #[test]
    fn capacity_forces_a_second_vehicle() -> Result<()> {
        let instance = build(
            vec![
                required(1, 2, 2, 6, 1),
                required(2, 3, 3, 6, 2),
                free_edge(3, 1, 4),
                free_edge(2, 1, 2),
            ],
            4,
            10,
        );
        let distances = DistanceMatrix::floyd_warshall(&instance.adjacency);
        let solution = path_scanning(&instance, &distances)?;

        assert_eq!(solution.num_routes(), 2);
        for route in &solution.routes {
            assert!(route.demand <= instance.capacity);
            assert_eq!(
                route.cost,
                route_cost(&route.services, &instance, &distances).unwrap()
            );
        }
        assert_partition(&instance, &solution);
        Ok(())
    }

    #[test]
    fn oversized_demand_is_reported_not_looped() {
        let instance = build(vec![required(1, 2, 2, 15, 1), free_edge(2, 1, 2)], 3, 10);
        let distances = DistanceMatrix::floyd_warshall(&instance.adjacency);
        let err = path_scanning(&instance, &distances).unwrap_err();
        assert!(err.to_string().contains("demand 15"), "{}", err);
    }

    #[test]
    fn zero_demand_is_rejected() {
        let instance = build(vec![required(1, 2, 2, 0, 1), free_edge(2, 1, 2)], 3, 10);
        let distances = DistanceMatrix::floyd_warshall(&instance.adjacency);
        assert!(path_scanning(&instance, &distances).is_err());
    }

    #[test]
    fn unreachable_service_is_reported() {
        // vertices 4 and 5 hang in a separate component
        let instance = build(
            vec![
                required(1, 2, 2, 3, 1),
                free_edge(2, 1, 2),
                required(4, 5, 1, 2, 1),
            ],
            6,
            10,
        );
        let distances = DistanceMatrix::floyd_warshall(&instance.adjacency);
        let err = path_scanning(&instance, &distances).unwrap_err();
        assert!(err.to_string().contains("cannot be reached"), "{}", err);
    }

    #[test]
    fn construction_is_deterministic() -> Result<()> {
        let edges = vec![
            required(1, 2, 2, 3, 1),
            required(2, 3, 3, 4, 2),
            required(3, 4, 1, 5, 1),
            free_edge(4, 1, 2),
            free_edge(2, 4, 3),
            free_edge(3, 1, 5),
        ];
        let instance = build(edges, 5, 8);
        let distances = DistanceMatrix::floyd_warshall(&instance.adjacency);
        let first = path_scanning(&instance, &distances)?;
        let second = path_scanning(&instance, &distances)?;
        assert_eq!(first, second);
        assert_partition(&instance, &first);
        Ok(())
    }
}
