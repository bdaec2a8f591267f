//! Sessions: batched task submission and result dispatch.
//!
//! A [`SessionService`] submits [`TaskPayload`](armonik_sdk_core::TaskPayload)s
//! to the control plane, remembers which handler wants each task's result,
//! and delivers every result exactly once from
//! [`wait_results`](SessionService::wait_results).

mod handler;
mod service;
mod tracker;
mod wait;

pub use handler::ServiceInvocationHandler;
pub use service::SessionService;
pub use wait::{WaitBehavior, WaitOptions};
