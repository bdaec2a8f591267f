//! ArmoniK worker SDK for Rust
//!
//! The worker side of ArmoniK: a [`DynamicWorker`] decodes each task's
//! [`TaskPayload`](armonik_sdk_core::TaskPayload), loads the application
//! library named by the task options, and calls the requested method of the
//! requested service through a small C interface (see [`abi`]).
//!
//! Application libraries can be written in any language exposing that
//! interface. In Rust, implement [`ServiceBase`] and use [`export_service!`].
//!
//! ## Modules
//!
//! - [`abi`] - C entry points and status codes shared with libraries
//! - [`module`] - Loading libraries and resolving their entry points
//! - [`service_manager`] - One service instance and its current session
//! - [`application_manager`] - The loaded application and its active service
//! - [`dynamic_worker`] - Per-task entry point
//! - [`service_base`] - Authoring libraries in Rust

pub mod abi;
pub mod application_manager;
pub mod dynamic_worker;
pub mod error;
pub mod ids;
pub mod module;
pub mod service_base;
pub mod service_manager;
pub mod task_handler;

pub use service_base::export;

pub use application_manager::ApplicationManager;
pub use dynamic_worker::DynamicWorker;
pub use error::{WorkerError, WorkerResult};
pub use ids::{AppId, ServiceId};
pub use module::{ModuleLoader, NativeLoader, NativeModule, ServiceModule};
pub use service_base::{ServiceBase, ServiceResult};
pub use service_manager::{ServiceManager, UNKNOWN_ERROR_MESSAGE};
pub use task_handler::{ProcessStatus, TaskHandler};
