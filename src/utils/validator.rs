use fixedbitset::FixedBitSet;

use crate::problem::shortest_paths::DistanceMatrix;
use crate::problem::{CarpInstance, Capacity, Cost, ServiceId};
use crate::solution::{Route, Solution};
use crate::solver::evaluation::route_cost;

#[derive(Debug)]
pub enum Violation {
    EmptyRoute,
    UnknownService(ServiceId),
    Demand(Capacity),
    DemandCacheMismatch { cached: Capacity, actual: Capacity },
    UnreachableLeg,
}

#[derive(Debug)]
pub enum ValidatorResult {
    Valid(Cost),
    ConstraintViolation(Violation),
    CostCacheMismatch { cached: Cost, actual: Cost },
}

impl ValidatorResult {
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Valid(_) => true,
            _ => false,
        }
    }

    pub fn assert_valid(&self) {
        match self {
            Self::Valid(_) => {}
            Self::ConstraintViolation(violation) => {
                assert!(false, "{:?}", violation)
            }
            Self::CostCacheMismatch { cached, actual } => {
                assert!(false, "CostCacheMismatch(cached: {}, actual: {})", cached, actual)
            }
        }
    }
}

/// Re-derives a route's demand and cost from scratch and checks them against
/// the cached aggregates and the vehicle capacity.
pub fn validate_route(
    instance: &CarpInstance,
    distances: &DistanceMatrix,
    route: &Route,
) -> ValidatorResult {
    use ValidatorResult::*;
    use Violation::*;

    if route.is_empty() {
        return ConstraintViolation(EmptyRoute);
    }

    let mut demand: Capacity = 0;
    for service in &route.services {
        if service.id < 1 || service.id > instance.num_required() {
            return ConstraintViolation(UnknownService(service.id));
        }
        let edge = instance.service(service.id);
        if edge.from != service.from || edge.to != service.to {
            return ConstraintViolation(UnknownService(service.id));
        }
        demand += edge.demand;
    }

    if demand != route.demand {
        return ConstraintViolation(DemandCacheMismatch {
            cached: route.demand,
            actual: demand,
        });
    }
    if demand > instance.capacity {
        return ConstraintViolation(Demand(demand - instance.capacity));
    }

    match route_cost(&route.services, instance, distances) {
        None => ConstraintViolation(UnreachableLeg),
        Some(cost) if cost != route.cost => CostCacheMismatch {
            cached: route.cost,
            actual: cost,
        },
        Some(cost) => Valid(cost),
    }
}

/// Panics unless every required service appears in exactly one route exactly
/// once and every route passes [`validate_route`].
pub fn assert_valid_solution(
    instance: &CarpInstance,
    distances: &DistanceMatrix,
    solution: &Solution,
) {
    let mut served = FixedBitSet::with_capacity(instance.num_required());
    for route in &solution.routes {
        for service in &route.services {
            assert!(
                service.id >= 1 && service.id <= instance.num_required(),
                "unknown service id {}",
                service.id
            );
            assert!(
                !served.contains(service.id - 1),
                "service {} appears more than once",
                service.id
            );
            served.insert(service.id - 1);
        }
    }
    assert_eq!(
        served.count_ones(..),
        instance.num_required(),
        "not every required service is routed"
    );

    for route in &solution.routes {
        validate_route(instance, distances, route).assert_valid();
    }
}
