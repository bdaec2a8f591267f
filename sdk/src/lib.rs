//! ArmoniK client SDK for Rust
//!
//! Submit tasks to an ArmoniK cluster and receive their results through
//! callbacks. A [`SessionService`] batches submissions and status polls,
//! and guarantees each task's outcome reaches its
//! [`ServiceInvocationHandler`] exactly once.
//!
//! ```ignore
//! use armonik_sdk::prelude::*;
//!
//! let mut configuration = Configuration::new();
//! configuration.add_json_file("appsettings.json")?.add_env();
//! let properties = Properties::new(configuration, TaskOptions::new("Echo", "1.0", "demo", "EchoService"));
//!
//! let session = SessionService::connect(&properties)?;
//! let handler = Arc::new(MyHandler);
//! session.submit(vec![TaskPayload::new("Echo", b"Test".to_vec())], handler)?;
//! session.wait_all();
//! ```
//!
//! The [`thread_pool`] and [`channel_pool`] modules hold the concurrency
//! primitives the SDK is built on; they are usable on their own.

#![allow(clippy::result_large_err)]

pub mod channel_pool;
pub mod control_plane;
pub mod error;
pub mod session;
pub mod thread_pool;

/// Test doubles for sessions.
/// Available only with the `testing` feature enabled.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{Result, SdkError};

pub use channel_pool::{ChannelFactory, ChannelGuard, ChannelPool, GrpcChannel, GrpcChannelFactory};
pub use control_plane::{ControlPlane, GrpcControlPlane, TaskSubmission};
pub use session::{ServiceInvocationHandler, SessionService, WaitBehavior, WaitOptions};
pub use thread_pool::{JoinSet, ThreadPool};

pub use armonik_sdk_core::{Configuration, Properties, ResultStatus, TaskOptions, TaskPayload};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Result, SdkError};
    pub use crate::session::{ServiceInvocationHandler, SessionService, WaitBehavior, WaitOptions};
    pub use crate::thread_pool::{JoinSet, ThreadPool};
    pub use armonik_sdk_core::{Configuration, Properties, TaskOptions, TaskPayload};
    pub use std::sync::Arc;
}
