//! # ArmoniK SDK Core
//!
//! Language-agnostic building blocks shared by the ArmoniK client and worker
//! SDKs.
//!
//! ## Modules
//!
//! - [`payload`] - Length-prefixed framing of a task's method call
//! - [`task_options`] - Default options of sessions and tasks
//! - [`config`] - JSON + environment configuration and its typed views
//! - [`generated`] - Protobuf messages and gRPC stubs of the control plane
//! - [`client`] - Async gRPC client wrappers
//! - [`logging`] - Tracing subscriber bootstrap
//! - [`error`] - Core error types

pub mod client;
pub mod config;
pub mod error;
pub mod generated;
pub mod logging;
pub mod payload;
pub mod task_options;

pub use error::{CoreError, CoreResult};

pub use client::{
    ResultInfo, ResultStatus, ResultsClient, SessionsClient, SubmittedTask, SubmitterClient,
    TaskCreation, TaskOutput, TasksClient,
};
pub use config::{Configuration, ControlPlaneConfig, Properties, WorkerConfig};
pub use logging::init_tracing;
pub use payload::TaskPayload;
pub use task_options::TaskOptions;
