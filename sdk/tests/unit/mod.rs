//! Unit tests of the public client API, run against the in-memory control
//! plane.

mod session_tests;
mod thread_pool_tests;
