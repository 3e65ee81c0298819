//! Test suite definitions. `all` builds the complete, explicit collection of
//! cases the runner executes.

pub mod errors;
pub mod lifecycle;
pub mod login;
pub mod registration;

use crate::runner::TestCase;

pub fn all() -> Vec<(&'static str, Vec<TestCase>)> {
    vec![
        ("lifecycle", lifecycle::cases()),
        ("registration", registration::cases()),
        ("login", login::cases()),
        ("error shape", errors::cases()),
    ]
}
