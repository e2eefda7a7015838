use bulkstep_cli::cli::cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    match cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("bulkstep: {err}");
            ExitCode::FAILURE
        }
    }
}
