#![allow(dead_code)]

use std::path::Path;

use clap::Parser;
use log::info;
use took::Timer;

use crate::cli::Solver;

mod cli;
mod io;
mod metrics;
mod problem;
mod solution;
mod solver;
mod utils;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = argfile::expand_args_from(
        std::env::args_os(),
        argfile::parse_fromfile,
        argfile::PREFIX,
    )?;
    let args = cli::ProgramArguments::parse_from(args);
    info!("{:?}", &args);

    let instance_paths: Vec<String> = if let Some(ref path) = args.instance {
        vec![path.clone()]
    } else if let Some(ref dir) = args.instance_directory {
        io::discover_instances(dir)?
            .iter()
            .map(|it| it.to_string_lossy().to_string())
            .collect()
    } else {
        unreachable!("the cli requires an instance or an instance directory")
    };

    for instance_path in &instance_paths {
        run_instance(instance_path, &args)?;
    }

    Ok(())
}

fn run_instance(instance_path: &str, args: &cli::ProgramArguments) -> anyhow::Result<()> {
    let load_timer = Timer::new();
    let instance = io::load_instance(instance_path)?;
    info!("instance loaded after {}", load_timer.took());
    info!("{:?}", &instance);

    if args.metrics || args.metrics_json.is_some() {
        let report = metrics::compute(&instance);
        if args.metrics {
            println!("{}", report);
        }
        if let Some(ref path) = args.metrics_json {
            metrics::write_json(Path::new(path), &report)?;
        }
    }

    info!("starting solver {:?}", &args.solver.variant);
    let res = match &args.solver.variant {
        Solver::PathScanning_LS => solver::solve(&instance, &args.solver)?,
        Solver::Construction_Only => solver::construction_only(&instance)?,
    };

    info!("finished after {}", res.time);
    info!(
        "best solution found: {} routes, objective {}",
        res.solution.num_routes(),
        res.total_cost
    );

    if args.print_summary_to_stdout {
        println!(
            "{},{},{},{}",
            instance.name,
            res.solution.num_routes(),
            res.total_cost,
            res.time.as_std().as_secs()
        );
    }

    let solution_out = args.solution.clone().or(args.solution_directory.as_ref().map(|dir| {
        format!(
            "{}/{}.{}_{}.sol",
            dir,
            instance.name,
            res.solution.num_routes(),
            res.total_cost
        )
    }));

    if let Some(solution_path) = solution_out {
        info!("writing solution to {}", &solution_path);
        io::solution_writer::write_solution(solution_path, &res)?;
    }

    Ok(())
}
