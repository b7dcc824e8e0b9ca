use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};

use crate::problem::Cost;
use crate::solution::Solution;
use crate::solver::SolverResult;

/**
Solution files are plain text:

```text
327                      total cost
5                        number of routes
2490212                  reference clocks (nanoseconds)
2490212                  solution clocks (same value)
 0 1 1 5 81 5 (D 0,1,1) (S 1,1,2) (S 2,2,3) (S 4,4,5) (D 0,1,1)
 ...
```

Each route line reads: depot index, day, 1-based route index, total demand,
route cost, visit count (services plus the two depot visits), then the visit
sequence bracketed by `(D 0,1,1)` depot markers with one
`(S <id>,<from>,<to>)` entry per serviced edge in route order.
 */
pub fn render_solution(solution: &Solution, total_cost: Cost, clocks: u128) -> String {
    let mut out = String::new();
    writeln!(out, "{}", total_cost).unwrap();
    writeln!(out, "{}", solution.num_routes()).unwrap();
    writeln!(out, "{}", clocks).unwrap();
    writeln!(out, "{}", clocks).unwrap();

    for (idx, route) in solution.routes.iter().enumerate() {
        write!(
            out,
            " 0 1 {} {} {} {}",
            idx + 1,
            route.demand,
            route.cost,
            route.visit_count()
        )
        .unwrap();
        write!(out, " (D 0,1,1)").unwrap();
        for service in &route.services {
            write!(out, " (S {},{},{})", service.id, service.from, service.to).unwrap();
        }
        writeln!(out, " (D 0,1,1)").unwrap();
    }

    out
}

pub fn write_solution(path: impl Into<String>, result: &SolverResult) -> Result<()> {
    let path = path.into();
    let f = File::create(&path).with_context(|| format!("cannot create solution file {}", path))?;
    let mut file = BufWriter::new(&f);

    let rendered = render_solution(
        &result.solution,
        result.total_cost,
        result.time.as_std().as_nanos(),
    );
    file.write_all(rendered.as_bytes())?;

    Ok(())
}
