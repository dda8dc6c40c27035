//! bankconv: telemarketing conversion analysis CLI
//!
//! Loads a bank marketing dataset, prints descriptive reports, trains three
//! classifiers to predict conversion and renders charts.

use clap::Parser;

use bankconv::cli::{run, Cli};
use bankconv::error::PipelineError;
use bankconv::utils::print_error;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        match err.downcast_ref::<PipelineError>() {
            Some(not_found @ PipelineError::NotFound { .. }) => {
                print_error(&format!("{}. Nothing was analyzed.", not_found));
            }
            _ => {
                print_error("Run aborted");
                eprintln!("    {:?}", err);
            }
        }
        std::process::exit(1);
    }
}
