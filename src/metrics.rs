use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use fixedbitset::FixedBitSet;
use serde::Serialize;

use crate::problem::shortest_paths::{dijkstra, shortest_path, UNREACHABLE};
use crate::problem::{CarpInstance, Cost};

/// Descriptive statistics of an instance graph, for reporting only; nothing
/// in the solver consumes them.
#[derive(Debug, Serialize)]
pub struct GraphMetrics {
    pub num_vertices: usize,
    pub num_edges: usize,
    pub num_arcs: usize,
    pub num_required_vertices: usize,
    pub num_required_edges: usize,
    pub num_required_arcs: usize,
    pub density: f64,
    pub num_components: usize,
    pub min_degree: usize,
    pub max_degree: usize,
    pub betweenness: Vec<usize>,
    pub mean_path_length: f64,
    pub diameter: Cost,
}

pub fn compute(instance: &CarpInstance) -> GraphMetrics {
    let n = instance.num_vertices();

    let num_edges = instance.edges.iter().filter(|e| e.kind.is_edge()).count();
    let num_arcs = instance.edges.iter().filter(|e| e.kind.is_arc()).count();
    let num_required_edges = instance
        .edges
        .iter()
        .filter(|e| e.required && e.kind.is_edge())
        .count();
    let num_required_arcs = instance
        .edges
        .iter()
        .filter(|e| e.required && e.kind.is_arc())
        .count();

    let mut required_vertices = FixedBitSet::with_capacity(n);
    for edge in instance.required_edges() {
        required_vertices.insert(edge.from);
        required_vertices.insert(edge.to);
    }

    let density = if n > 1 {
        (2 * num_edges) as f64 / (n * (n - 1)) as f64
    } else {
        0.0
    };

    let degrees: Vec<usize> = (0..n).map(|v| instance.adjacency.out_degree(v)).collect();

    let (mean_path_length, diameter) = path_statistics(instance);

    GraphMetrics {
        num_vertices: n,
        num_edges,
        num_arcs,
        num_required_vertices: required_vertices.count_ones(..),
        num_required_edges,
        num_required_arcs,
        density,
        num_components: count_components(instance),
        min_degree: degrees.iter().copied().min().unwrap_or(0),
        max_degree: degrees.iter().copied().max().unwrap_or(0),
        betweenness: betweenness(instance),
        mean_path_length,
        diameter,
    }
}

pub fn write_json(path: &Path, metrics: &GraphMetrics) -> Result<()> {
    let f = File::create(path)
        .with_context(|| format!("cannot create metrics file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(f), metrics)?;
    Ok(())
}

/// Connected components of the graph with arcs taken as undirected links.
fn count_components(instance: &CarpInstance) -> usize {
    let n = instance.num_vertices();
    let adjacency = &instance.adjacency;
    let mut visited = FixedBitSet::with_capacity(n);
    let mut components = 0;

    for start in 0..n {
        if visited.contains(start) {
            continue;
        }
        components += 1;
        let mut stack = vec![start];
        while let Some(vertex) = stack.pop() {
            if visited.contains(vertex) {
                continue;
            }
            visited.insert(vertex);
            for other in 0..n {
                if !visited.contains(other)
                    && (adjacency.has_arc(vertex, other) || adjacency.has_arc(other, vertex))
                {
                    stack.push(other);
                }
            }
        }
    }

    components
}

/// How often each vertex appears strictly inside a shortest path between an
/// ordered vertex pair. Needs the explicit paths, not just their lengths.
fn betweenness(instance: &CarpInstance) -> Vec<usize> {
    let n = instance.num_vertices();
    let mut counts = vec![0usize; n];

    for source in 0..n {
        for target in 0..n {
            if source == target {
                continue;
            }
            let path = shortest_path(&instance.adjacency, source, target);
            if path.len() > 2 {
                for &vertex in &path[1..path.len() - 1] {
                    counts[vertex] += 1;
                }
            }
        }
    }

    counts
}

fn path_statistics(instance: &CarpInstance) -> (f64, Cost) {
    let n = instance.num_vertices();
    let mut reachable_pairs = 0usize;
    let mut total_distance: Cost = 0;
    let mut diameter: Cost = 0;

    for source in 0..n {
        let (distances, _) = dijkstra(&instance.adjacency, source);
        for (target, &distance) in distances.iter().enumerate() {
            if source == target || distance == UNREACHABLE {
                continue;
            }
            reachable_pairs += 1;
            total_distance += distance;
            diameter = diameter.max(distance);
        }
    }

    let mean = if reachable_pairs > 0 {
        total_distance as f64 / reachable_pairs as f64
    } else {
        0.0
    };
    (mean, diameter)
}

impl Display for GraphMetrics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "vertices:           {}", self.num_vertices)?;
        writeln!(f, "edges:              {}", self.num_edges)?;
        writeln!(f, "arcs:               {}", self.num_arcs)?;
        writeln!(f, "required vertices:  {}", self.num_required_vertices)?;
        writeln!(f, "required edges:     {}", self.num_required_edges)?;
        writeln!(f, "required arcs:      {}", self.num_required_arcs)?;
        writeln!(f, "density:            {:.4}", self.density)?;
        writeln!(f, "components:         {}", self.num_components)?;
        writeln!(f, "min degree:         {}", self.min_degree)?;
        writeln!(f, "max degree:         {}", self.max_degree)?;
        writeln!(f, "mean path length:   {:.4}", self.mean_path_length)?;
        writeln!(f, "diameter:           {}", self.diameter)?;
        write!(f, "betweenness:        {:?}", self.betweenness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::carp_reader::parse_instance;

    const MIXED: &str = "\
Capacity:    6
Depot Node:  1

E1 1 2 3 2 2
E2 2 3 4 3 3
A1 3 4 2 4 1
NrE1 4 1 2
NrA1 3 1 5
";

    #[test]
    fn counts_records_by_kind() -> Result<()> {
        let instance = parse_instance("mixed", MIXED)?;
        let metrics = compute(&instance);

        assert_eq!(metrics.num_vertices, 5);
        assert_eq!(metrics.num_edges, 3);
        assert_eq!(metrics.num_arcs, 2);
        assert_eq!(metrics.num_required_edges, 2);
        assert_eq!(metrics.num_required_arcs, 1);
        assert_eq!(metrics.num_required_vertices, 4);
        Ok(())
    }

    #[test]
    fn vertex_zero_is_an_isolated_component() -> Result<()> {
        // ids are 1-based, so index 0 never carries an arc
        let instance = parse_instance("mixed", MIXED)?;
        let metrics = compute(&instance);

        assert_eq!(metrics.num_components, 2);
        assert_eq!(metrics.min_degree, 0);
        assert!(metrics.max_degree >= 2);
        Ok(())
    }

    #[test]
    fn diameter_is_the_longest_shortest_path() -> Result<()> {
        let instance = parse_instance("mixed", MIXED)?;
        let metrics = compute(&instance);

        assert!(metrics.diameter > 0);
        assert!(metrics.mean_path_length > 0.0);
        assert!(metrics.mean_path_length <= metrics.diameter as f64);
        Ok(())
    }

    #[test]
    fn interior_vertices_score_betweenness() -> Result<()> {
        let content = "\
Capacity:  5
Depot Node:  1
NrE1 1 2 1
NrE2 2 3 1
E1 1 3 5 1 1
";
        // 1 -> 2 -> 3 is shorter than the direct required edge, so vertex 2
        // lies inside shortest paths; the endpoints never do
        let instance = parse_instance("line", content)?;
        let metrics = compute(&instance);

        assert!(metrics.betweenness[2] > 0);
        assert_eq!(metrics.betweenness[0], 0);
        Ok(())
    }
}
