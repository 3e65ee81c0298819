//! End-to-end test runner for the protocol engine.
//!
//! Test cases are plain functions collected into an explicit list and handed
//! to the runner; there is no process-wide registry.

pub mod runner;
pub mod suites;
pub mod utils;

use clap::Parser;
use runner::{report_test_results, run_tests, TestResult};

#[derive(Debug, Parser)]
pub struct Cli {
    /// Only run test cases whose name contains one of these substrings
    #[clap(long = "filter")]
    pub filters: Option<Vec<String>>,
}

pub fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let filters = cli.filters.unwrap_or_default();

    let mut all_results = Vec::new();
    for (suite, cases) in suites::all() {
        println!("Running {suite} tests");
        let results = run_tests(cases, &filters);
        println!("{suite} tests: {}", report_test_results(&results));
        all_results.extend(results);
    }
    println!();

    if all_results.iter().any(|result| *result == TestResult::Failed) {
        std::process::exit(1);
    }
}
