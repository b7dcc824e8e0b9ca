use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(version)]
pub struct ProgramArguments {
    #[arg(
        short,
        long,
        help = "instance file path",
        required_unless_present = "instance_directory"
    )]
    pub instance: Option<String>,

    #[arg(
        long,
        help = "directory of .dat instance files to solve in sequence",
        conflicts_with = "instance"
    )]
    pub instance_directory: Option<String>,

    #[arg(
        short,
        long,
        help = "solution file path",
        conflicts_with = "instance_directory"
    )]
    pub solution: Option<String>,

    #[arg(
        long,
        help = "directory to store the solution",
        conflicts_with = "solution"
    )]
    pub solution_directory: Option<String>,

    #[command(flatten)]
    pub solver: SolverArguments,

    #[arg(long, help = "print the graph metrics report", default_value = "false")]
    pub metrics: bool,

    #[arg(long, help = "file to store the graph metrics report as JSON")]
    pub metrics_json: Option<String>,

    #[arg(long, help = "print summary to stdout", default_value = "false")]
    pub print_summary_to_stdout: bool,
}

#[allow(non_camel_case_types)]
#[derive(Clone, ValueEnum, Debug)]
pub enum Solver {
    PathScanning_LS,
    Construction_Only,
}

#[derive(clap::Args, Clone, Debug)]
pub struct SolverArguments {
    #[arg(long = "solver", value_enum, default_value = "path-scanning-ls")]
    pub variant: Solver,

    #[arg(
        long,
        default_value = "1000",
        help = "maximum number of improvement passes"
    )]
    pub improvement_iterations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        ProgramArguments::command().debug_assert()
    }

    #[test]
    fn instance_and_directory_exclude_each_other() {
        use clap::CommandFactory;
        let result = ProgramArguments::command().try_get_matches_from([
            "ls-carp-solver",
            "--instance",
            "a.dat",
            "--instance-directory",
            "dir",
        ]);
        assert!(result.is_err());
    }
}
