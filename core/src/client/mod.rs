//! gRPC client wrappers for the ArmoniK control plane.
//!
//! Each wrapper owns a generated client over a [`tonic::transport::Channel`]
//! and exposes async methods speaking in SDK types instead of raw protobuf
//! messages.

mod results;
mod sessions;
mod submitter;
mod tasks;

pub use results::{ResultInfo, ResultStatus, ResultsClient};
pub use sessions::SessionsClient;
pub use submitter::{SubmitterClient, TaskOutput};
pub use tasks::{SubmittedTask, TaskCreation, TasksClient};
