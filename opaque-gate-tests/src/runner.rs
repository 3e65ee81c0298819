//! Runs an explicit collection of test cases and reports colored results.

use colored::Colorize;
use std::panic::{self, AssertUnwindSafe};

/// A single test case: a name and a function to run. Cases fail by
/// returning an error or by panicking in an `assert!`.
pub struct TestCase {
    pub name: &'static str,
    pub run: fn() -> anyhow::Result<()>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    Failed,
    Skipped,
}

/// Run every case in the collection, honoring name filters, and report the
/// name of any failing case.
pub fn run_tests(cases: Vec<TestCase>, filters: &[String]) -> Vec<TestResult> {
    cases
        .into_iter()
        .map(|case| run_test_case(case, filters))
        .collect()
}

fn matches_filters(name: &str, filters: &[String]) -> bool {
    filters.is_empty() || filters.iter().any(|filter| name.contains(filter.as_str()))
}

/// Runs a test case and manually handles any panics triggered by `assert`
/// macros.
fn run_test_case(case: TestCase, filters: &[String]) -> TestResult {
    // Create string for result so that we can print the whole thing at once
    let mut test_output = format!("\n{}:\n", case.name);

    if !matches_filters(case.name, filters) {
        test_output.push_str(&format!("{}", "skipped\n".bright_blue()));
        println!("{test_output}");
        return TestResult::Skipped;
    }

    // Store normal panic hook so we can set it back later
    let panic_hook = panic::take_hook();

    // Create a new panic hook to catch assert! checks
    panic::set_hook(Box::new(|_| {
        // Don't print panic details
    }));

    let outcome = panic::catch_unwind(AssertUnwindSafe(case.run));

    // Replace original panic hook
    panic::set_hook(panic_hook);

    let result = match outcome {
        Ok(Ok(())) => {
            test_output.push_str(&format!("{}", "ok\n".green()));
            TestResult::Passed
        }
        Ok(Err(error)) => {
            test_output.push_str(&format!("{}: {}\n", "failed".red(), error));
            TestResult::Failed
        }
        Err(panic) => {
            test_output.push_str(&format!("{}", "Test panicked\n".red()));

            // Try to convert message to `&str` or `String` and print
            if let Some(message) = panic.downcast_ref::<&str>() {
                test_output.push_str(&format!("{message}\n"));
            }
            if let Some(message) = panic.downcast_ref::<String>() {
                test_output.push_str(&format!("{message}\n"));
            }
            TestResult::Failed
        }
    };

    println!("{test_output}");
    result
}

pub fn report_test_results(results: &[TestResult]) -> String {
    let any_failed = results.iter().any(|r| *r == TestResult::Failed);
    if any_failed {
        return format!("{}", "FAILED".red());
    }

    let num_results = results.len();
    let num_skipped = results
        .iter()
        .filter(|r| **r == TestResult::Skipped)
        .count();

    if num_skipped == num_results {
        format!("{}", "SKIPPED".bright_blue())
    } else if num_skipped > 0 {
        format!(
            "{} ({} {})",
            "PASSED".green(),
            num_skipped,
            "SKIPPED".bright_blue()
        )
    } else {
        format!("{}", "PASSED".green())
    }
}
