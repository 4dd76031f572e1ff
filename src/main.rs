use clap::Parser;
use savecast::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
