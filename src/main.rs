//! Run a given While program and print its output log, final bindings, and
//! output variable to standard output.
//!
//! Example usage:
//!
//!     cargo run -- \
//!         --src-filepath programs/reverse.while \
//!         --input "(a b c)"

use clap::Parser;
use tracing_subscriber::EnvFilter;
use while_trees::end_to_end::{run_error_to_string, run_interpreter, InterpreterConfig};

fn main() {
    let interpreter_config = InterpreterConfig::parse();

    // RUST_LOG wins over --verbose when both are given.
    let default_level = match interpreter_config.verbose {
        true => "debug",
        false => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let interpreter_result = run_interpreter(&interpreter_config);

    match interpreter_result {
        Ok(execution_result) => {
            println!("{}", execution_result);
        }

        Err(run_error) => {
            eprintln!("{}", run_error_to_string(&run_error));
            std::process::exit(1);
        }
    }
}
