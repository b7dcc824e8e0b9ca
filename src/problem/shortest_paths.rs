use std::cmp::Reverse;
use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;

use crate::problem::adjacency::AdjacencyMatrix;
use crate::problem::{Cost, Vertex};

/// Sentinel for "no path". All finite distances are strictly below it.
pub const UNREACHABLE: Cost = Cost::MAX;

/// All-pairs shortest-path distances, computed once per solve and never
/// mutated afterwards. The diagonal is exactly 0; unreachable pairs hold
/// [`UNREACHABLE`]. Symmetry is not guaranteed (arcs are directed).
#[derive(Debug)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<Cost>,
}

impl DistanceMatrix {
    /// Floyd-Warshall over the adjacency matrix, O(V³).
    pub fn floyd_warshall(adjacency: &AdjacencyMatrix) -> Self {
        let n = adjacency.num_vertices();
        let mut data = vec![UNREACHABLE; n * n];

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    data[i * n + j] = 0;
                } else if adjacency.has_arc(i, j) {
                    data[i * n + j] = adjacency.cost(i, j);
                }
            }
        }

        for k in 0..n {
            for i in 0..n {
                let d_ik = data[i * n + k];
                if d_ik == UNREACHABLE {
                    continue;
                }
                for j in 0..n {
                    let d_kj = data[k * n + j];
                    if d_kj != UNREACHABLE && d_ik + d_kj < data[i * n + j] {
                        data[i * n + j] = d_ik + d_kj;
                    }
                }
            }
        }

        Self { n, data }
    }

    pub fn num_vertices(&self) -> usize {
        self.n
    }

    #[inline(always)]
    pub fn distance(&self, from: Vertex, to: Vertex) -> Cost {
        debug_assert!(from < self.n);
        debug_assert!(to < self.n);
        self.data[from * self.n + to]
    }

    #[inline(always)]
    pub fn is_reachable(&self, from: Vertex, to: Vertex) -> bool {
        self.distance(from, to) != UNREACHABLE
    }
}

/// Single-source Dijkstra over the adjacency matrix. Returns the distance
/// vector and the predecessor of every settled vertex.
pub fn dijkstra(
    adjacency: &AdjacencyMatrix,
    source: Vertex,
) -> (Vec<Cost>, Vec<Option<Vertex>>) {
    run_dijkstra(adjacency, source, None)
}

/// Explicit shortest path from `source` to `target` as a vertex sequence,
/// empty when the target is unreachable. Only callers that need the actual
/// vertices go through here; distance lookups use the [`DistanceMatrix`].
pub fn shortest_path(adjacency: &AdjacencyMatrix, source: Vertex, target: Vertex) -> Vec<Vertex> {
    let (_, predecessors) = run_dijkstra(adjacency, source, Some(target));

    if predecessors[target].is_none() {
        return vec![];
    }

    let mut path = vec![];
    let mut current = target;
    loop {
        path.push(current);
        match predecessors[current] {
            Some(prev) => current = prev,
            None => break,
        }
    }
    path.reverse();
    path
}

fn run_dijkstra(
    adjacency: &AdjacencyMatrix,
    source: Vertex,
    target: Option<Vertex>,
) -> (Vec<Cost>, Vec<Option<Vertex>>) {
    let n = adjacency.num_vertices();
    let mut distances = vec![UNREACHABLE; n];
    let mut predecessors: Vec<Option<Vertex>> = vec![None; n];
    let mut settled = FixedBitSet::with_capacity(n);
    let mut heap: BinaryHeap<Reverse<(Cost, Vertex)>> = BinaryHeap::new();

    distances[source] = 0;
    heap.push(Reverse((0, source)));

    while let Some(Reverse((distance, vertex))) = heap.pop() {
        if settled.contains(vertex) {
            // stale queue entry
            continue;
        }
        settled.insert(vertex);

        if target == Some(vertex) {
            break;
        }

        for neighbor in 0..n {
            if !adjacency.has_arc(vertex, neighbor) {
                continue;
            }
            let candidate = distance + adjacency.cost(vertex, neighbor);
            if candidate < distances[neighbor] {
                distances[neighbor] = candidate;
                predecessors[neighbor] = Some(vertex);
                heap.push(Reverse((candidate, neighbor)));
            }
        }
    }

    (distances, predecessors)
}
