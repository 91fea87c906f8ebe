//! Entry point for the `relaxroute` binary.
#![forbid(unsafe_code)]

use relaxroute_cli::CliError;

fn main() {
    match relaxroute_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("relaxroute: {:?}", eyre::Report::new(err));
            std::process::exit(1);
        }
    }
}
