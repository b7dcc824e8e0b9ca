use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::problem::adjacency::AdjacencyMatrixBuilder;
use crate::problem::{
    create_instance_with, Capacity, CarpInstance, Cost, EdgeKind, ServiceEdge, Vertex,
};

/**
CARP instance files are plain text. A header carries the vehicle data:

```text
Name:        gdb-1
Capacity:    5
Depot Node:  1
```

`Capacity:` and `Depot Node:` are mandatory; all other header lines are
ignored. The graph follows as one record per line, recognized by the leading
token:

```text
E1   1 2 13 5 13     required edge:     from to cost demand service_cost
NrE4 3 5 4           non-required edge: from to cost
A2   2 6 9 2 9       required arc:      from to cost demand service_cost
NrA7 6 1 7           non-required arc:  from to cost
```

Required records need at least 6 whitespace-separated fields, non-required
records at least 4; shorter lines and lines with an unknown leading token are
skipped. Vertex ids are 1-based; the adjacency matrix is sized to the largest
id referenced. Required records enter the matrix in their declared direction
only; non-required records enter both directions with the same cost.
 */
pub fn load_instance(path: impl Into<String> + Clone) -> Result<CarpInstance> {
    let path = path.into();
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("cannot read instance file {}", path))?;
    let name = Path::new(&path)
        .file_name()
        .map(|it| it.to_string_lossy().to_string())
        .unwrap_or(path.clone());
    parse_instance(name, &content)
}

pub(crate) fn parse_instance(name: impl Into<String>, content: &str) -> Result<CarpInstance> {
    let (capacity, depot) = read_header(content)?;
    let edges = read_records(content)?;

    if edges.is_empty() {
        bail!("instance contains no edge or arc records");
    }

    let max_vertex = edges.iter().map(|e| e.from.max(e.to)).max().unwrap_or(0);
    let mut builder = AdjacencyMatrixBuilder::with_num_vertices(max_vertex + 1);
    for edge in &edges {
        if edge.required {
            builder.set_arc(edge.from, edge.to, edge.traversal_cost);
        } else {
            builder.set_edge(edge.from, edge.to, edge.traversal_cost);
        }
    }

    create_instance_with(name, builder.build(), edges, capacity, depot)
}

fn read_header(content: &str) -> Result<(Capacity, Vertex)> {
    let mut capacity: Option<Capacity> = None;
    let mut depot: Option<Vertex> = None;

    for line in content.lines() {
        if let Some(value) = line.strip_prefix("Capacity:") {
            capacity = Some(
                value
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid `Capacity:` value `{}`", value.trim()))?,
            );
        } else if let Some(value) = line.strip_prefix("Depot Node:") {
            depot = Some(
                value
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid `Depot Node:` value `{}`", value.trim()))?,
            );
        }
        if capacity.is_some() && depot.is_some() {
            break;
        }
    }

    let capacity = capacity.context("instance header is missing the vehicle capacity (`Capacity:`)")?;
    let depot = depot.context("instance header is missing the depot vertex (`Depot Node:`)")?;
    Ok((capacity, depot))
}

fn read_records(content: &str) -> Result<Vec<ServiceEdge>> {
    let mut edges = Vec::new();

    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some(token) = fields.first() else {
            continue;
        };
        let Some((kind, required)) = classify(token) else {
            continue;
        };
        if fields.len() < if required { 6 } else { 4 } {
            continue;
        }

        let from: Vertex = parse_field(fields[1], token, line)?;
        let to: Vertex = parse_field(fields[2], token, line)?;
        let traversal_cost: Cost = parse_field(fields[3], token, line)?;
        let (demand, service_cost) = if required {
            (
                parse_field(fields[4], token, line)?,
                parse_field(fields[5], token, line)?,
            )
        } else {
            (0, 0)
        };

        edges.push(ServiceEdge {
            from,
            to,
            traversal_cost,
            demand,
            service_cost,
            kind,
            required,
            id: 0,
        });
    }

    Ok(edges)
}

fn classify(token: &str) -> Option<(EdgeKind, bool)> {
    if let Some(rest) = token.strip_prefix("NrE") {
        all_digits(rest).then_some((EdgeKind::Edge, false))
    } else if let Some(rest) = token.strip_prefix("NrA") {
        all_digits(rest).then_some((EdgeKind::Arc, false))
    } else if let Some(rest) = token.strip_prefix("E") {
        all_digits(rest).then_some((EdgeKind::Edge, true))
    } else if let Some(rest) = token.strip_prefix("A") {
        all_digits(rest).then_some((EdgeKind::Arc, true))
    } else {
        None
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn parse_field<T: std::str::FromStr>(field: &str, token: &str, line: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    field
        .parse()
        .with_context(|| format!("invalid value `{}` in record {} (`{}`)", field, token, line))
}
