use std::fmt::{Debug, Formatter};

use anyhow::{ensure, Result};

use crate::problem::adjacency::AdjacencyMatrix;

pub mod adjacency;
pub mod shortest_paths;

pub type Vertex = usize;
pub type Cost = u64;
pub type ServiceId = usize;

pub(crate) type Capacity = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
    Edge,
    Arc,
}

impl EdgeKind {
    pub fn is_edge(&self) -> bool {
        match self {
            Self::Edge => true,
            _ => false,
        }
    }
    pub fn is_arc(&self) -> bool {
        match self {
            Self::Arc => true,
            _ => false,
        }
    }
}

/// A single edge or arc record of the instance. Required records are services
/// and carry a 1-based `id` (assigned in input order when the instance is
/// created); non-required records are free travel only.
#[derive(Clone, Debug)]
pub struct ServiceEdge {
    pub from: Vertex,
    pub to: Vertex,
    pub traversal_cost: Cost,
    pub demand: Capacity,
    pub service_cost: Cost,
    pub kind: EdgeKind,
    pub required: bool,
    pub id: ServiceId,
}

pub struct CarpInstance {
    pub name: String,
    pub adjacency: AdjacencyMatrix,
    /// All parsed records in input order, required and non-required.
    pub edges: Vec<ServiceEdge>,
    pub capacity: Capacity,
    pub depot: Vertex,
    service_index: Vec<usize>,
}

impl Debug for CarpInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "CARP instance {}:", self.name)
            .and(writeln!(
                f,
                "{} vertices, depot {}, vehicle capacity {}",
                self.num_vertices(),
                self.depot,
                self.capacity
            ))
            .and(write!(
                f,
                "{} required services among {} records",
                self.num_required(),
                self.edges.len()
            ))
    }
}

impl CarpInstance {
    pub fn num_vertices(&self) -> usize {
        self.adjacency.num_vertices()
    }
    pub fn num_required(&self) -> usize {
        self.service_index.len()
    }
    pub fn required_edges(&self) -> impl Iterator<Item = &ServiceEdge> {
        self.edges.iter().filter(|e| e.required)
    }
    /// The required record behind a service id. Ids are 1-based.
    #[inline(always)]
    pub fn service(&self, id: ServiceId) -> &ServiceEdge {
        debug_assert!(id >= 1 && id <= self.service_index.len());
        &self.edges[self.service_index[id - 1]]
    }
}

/// Assembles an instance and assigns service ids to the required records,
/// 1-based in input order. Ids are fixed from here on; solving never
/// reassigns them.
pub fn create_instance_with(
    name: impl Into<String>,
    adjacency: AdjacencyMatrix,
    mut edges: Vec<ServiceEdge>,
    capacity: Capacity,
    depot: Vertex,
) -> Result<CarpInstance> {
    ensure!(
        depot < adjacency.num_vertices(),
        "depot vertex {} outside the graph ({} vertices)",
        depot,
        adjacency.num_vertices()
    );

    let mut service_index = Vec::new();
    let mut next_id: ServiceId = 1;
    for (idx, edge) in edges.iter_mut().enumerate() {
        if edge.required {
            edge.id = next_id;
            service_index.push(idx);
            next_id += 1;
        }
    }

    Ok(CarpInstance {
        name: name.into(),
        adjacency,
        edges,
        capacity,
        depot,
        service_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::adjacency::AdjacencyMatrixBuilder;

    fn record(from: Vertex, to: Vertex, required: bool) -> ServiceEdge {
        ServiceEdge {
            from,
            to,
            traversal_cost: 1,
            demand: if required { 1 } else { 0 },
            service_cost: if required { 1 } else { 0 },
            kind: EdgeKind::Edge,
            required,
            id: 0,
        }
    }

    #[test]
    fn service_ids_follow_input_order() -> Result<()> {
        let mut builder = AdjacencyMatrixBuilder::with_num_vertices(4);
        builder.set_arc(1, 2, 1).set_edge(2, 3, 1).set_arc(3, 1, 1);
        let instance = create_instance_with(
            "test",
            builder.build(),
            vec![
                record(1, 2, true),
                record(2, 3, false),
                record(3, 1, true),
            ],
            10,
            1,
        )?;

        assert_eq!(instance.num_required(), 2);
        assert_eq!(instance.service(1).from, 1);
        assert_eq!(instance.service(2).from, 3);
        assert_eq!(instance.edges[1].id, 0);
        Ok(())
    }

    #[test]
    fn depot_must_be_a_graph_vertex() {
        let builder = AdjacencyMatrixBuilder::with_num_vertices(3);
        let result = create_instance_with("test", builder.build(), vec![], 10, 7);
        assert!(result.is_err());
    }
}
