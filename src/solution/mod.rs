use crate::problem::{Capacity, Cost, ServiceId, Vertex};

/// One serviced traversal of a route: the required edge `id` serviced in its
/// declared direction `from -> to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Service {
    pub from: Vertex,
    pub to: Vertex,
    pub id: ServiceId,
}

/// An ordered sequence of serviced traversals with cached aggregates.
///
/// `demand` and `cost` mirror the current `services` at all times; every
/// mutation goes through code that refreshes them from a full recomputation
/// (see `solver::evaluation::route_cost`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub services: Vec<Service>,
    pub demand: Capacity,
    pub cost: Cost,
}

impl Route {
    pub fn new() -> Self {
        Self {
            services: vec![],
            demand: 0,
            cost: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Serviced traversals plus the two depot visits bracketing the route.
    pub fn visit_count(&self) -> usize {
        self.len() + 2
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    pub routes: Vec<Route>,
}

impl Solution {
    pub fn new() -> Self {
        Self { routes: vec![] }
    }

    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    pub fn num_services(&self) -> usize {
        self.routes.iter().map(|r| r.len()).sum()
    }

    pub fn total_cost(&self) -> Cost {
        self.routes.iter().map(|r| r.cost).sum()
    }

    /// Routes drained by relocation are kept during the search but never
    /// belong to a finished solution.
    pub fn prune_empty_routes(&mut self) {
        self.routes.retain(|r| !r.is_empty());
    }
}
