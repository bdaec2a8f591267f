//! Test doubles for code built on sessions.
//!
//! Available in this crate's tests and, for downstream crates, with the
//! `testing` feature.

mod mock_control_plane;
mod recording_handler;

pub use mock_control_plane::{MockCall, MockControlPlane, MockOutcome, SubmittedRecord};
pub use recording_handler::RecordingHandler;
