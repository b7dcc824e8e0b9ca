use anyhow::Result;
use log::info;
use took::{Timer, Took};

use crate::cli::SolverArguments;
use crate::problem::shortest_paths::DistanceMatrix;
use crate::problem::{CarpInstance, Cost};
use crate::solution::Solution;

pub mod construction;
pub mod evaluation;
pub mod local_search;

pub struct SolverResult {
    pub solution: Solution,
    pub total_cost: Cost,
    pub time: Took,
}

/// Full pipeline: all-pairs distances once, path-scanning construction, then
/// the improvement loop. The timer covers construction and improvement only.
pub fn solve(instance: &CarpInstance, args: &SolverArguments) -> Result<SolverResult> {
    let distances = DistanceMatrix::floyd_warshall(&instance.adjacency);

    let timer = Timer::new();
    let mut solution = construction::path_scanning(instance, &distances)?;
    info!(
        "construction: {} routes, objective {}, took: {}",
        solution.num_routes(),
        solution.total_cost(),
        timer.took()
    );

    local_search::improve(
        &mut solution,
        instance,
        &distances,
        args.improvement_iterations,
    );
    solution.prune_empty_routes();
    let total_cost = solution.total_cost();
    let time = timer.took();

    #[cfg(feature = "search_assertions")]
    crate::utils::validator::assert_valid_solution(instance, &distances, &solution);

    Ok(SolverResult {
        solution,
        total_cost,
        time,
    })
}

/// Construction without the improvement loop.
pub fn construction_only(instance: &CarpInstance) -> Result<SolverResult> {
    let distances = DistanceMatrix::floyd_warshall(&instance.adjacency);

    let timer = Timer::new();
    let solution = construction::path_scanning(instance, &distances)?;
    let total_cost = solution.total_cost();
    let time = timer.took();

    #[cfg(feature = "search_assertions")]
    crate::utils::validator::assert_valid_solution(instance, &distances, &solution);

    Ok(SolverResult {
        solution,
        total_cost,
        time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::adjacency::AdjacencyMatrixBuilder;
    use crate::problem::{create_instance_with, EdgeKind, ServiceEdge};
    use crate::utils::validator::assert_valid_solution;

    fn chain_instance() -> CarpInstance {
        let edges = vec![
            ServiceEdge {
                from: 1,
                to: 2,
                traversal_cost: 2,
                demand: 3,
                service_cost: 1,
                kind: EdgeKind::Edge,
                required: true,
                id: 0,
            },
            ServiceEdge {
                from: 2,
                to: 3,
                traversal_cost: 3,
                demand: 4,
                service_cost: 2,
                kind: EdgeKind::Edge,
                required: true,
                id: 0,
            },
            ServiceEdge {
                from: 3,
                to: 1,
                traversal_cost: 4,
                demand: 0,
                service_cost: 0,
                kind: EdgeKind::Edge,
                required: false,
                id: 0,
            },
        ];
        let mut builder = AdjacencyMatrixBuilder::with_num_vertices(4);
        builder.set_arc(1, 2, 2).set_arc(2, 3, 3).set_edge(3, 1, 4);
        create_instance_with("chain", builder.build(), edges, 10, 1).unwrap()
    }

    fn args() -> SolverArguments {
        SolverArguments {
            variant: crate::cli::Solver::PathScanning_LS,
            improvement_iterations: 1000,
        }
    }

    #[test]
    fn solves_the_two_edge_chain_in_one_route() -> Result<()> {
        let instance = chain_instance();
        let res = solve(&instance, &args())?;

        assert_eq!(res.solution.num_routes(), 1);
        assert_eq!(res.total_cost, 7);

        let distances = DistanceMatrix::floyd_warshall(&instance.adjacency);
        assert_valid_solution(&instance, &distances, &res.solution);
        Ok(())
    }

    #[test]
    fn repeated_solves_are_identical() -> Result<()> {
        let instance = chain_instance();
        let first = solve(&instance, &args())?;
        let second = solve(&instance, &args())?;

        assert_eq!(first.solution, second.solution);
        assert_eq!(first.total_cost, second.total_cost);
        Ok(())
    }

    #[test]
    fn improvement_never_exceeds_construction() -> Result<()> {
        let instance = chain_instance();
        let constructed = construction_only(&instance)?;
        let improved = solve(&instance, &args())?;
        assert!(improved.total_cost <= constructed.total_cost);
        Ok(())
    }

    #[test]
    fn solves_the_mixed_fixture_end_to_end() -> Result<()> {
        let instance = crate::io::load_instance("resources/instances/mixed-mini.dat")?;
        let res = solve(&instance, &args())?;

        // demands 2 + 3 + 4 against capacity 6 need at least two vehicles
        assert!(res.solution.num_routes() >= 2);

        let distances = DistanceMatrix::floyd_warshall(&instance.adjacency);
        assert_valid_solution(&instance, &distances, &res.solution);
        Ok(())
    }
}
