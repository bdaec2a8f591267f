//! Worker tests against an application linked into the test binary.

mod fixtures;
mod manager_tests;
mod worker_tests;
