pub mod cli;
pub mod jq_exec;
pub mod logger;
pub mod route;

use std::process::ExitCode;
use colored::Colorize;

fn main() -> ExitCode {
    let command_line_interface = cli::CommandLineInterface::load();
    logger::init(command_line_interface.verbosity());
    match command_line_interface.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
