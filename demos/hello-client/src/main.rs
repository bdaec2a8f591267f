//! Hello client
//!
//! Submits one greeting to the `HelloService` of an ArmoniK cluster and
//! prints the reply. Settings come from `appsettings.json`, when present,
//! then from the environment (`GrpcClient__Endpoint`, `PartitionId`,
//! `WorkerLib__Version`...).

use armonik_sdk::prelude::*;
use armonik_sdk_core::init_tracing;
use std::path::Path;
use tracing::{error, info, warn};

const SETTINGS_FILE: &str = "appsettings.json";

/// Logs the greeting sent back by the service
struct HelloHandler;

impl ServiceInvocationHandler for HelloHandler {
    fn handle_response(&self, payload: &[u8], task_id: &str) {
        info!(task_id, reply = %String::from_utf8_lossy(payload), "Received reply");
    }

    fn handle_error(&self, error: &SdkError, task_id: &str) {
        error!(task_id, error = %error, "Task failed");
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut config = Configuration::new();
    if Path::new(SETTINGS_FILE).exists() {
        config.add_json_file(SETTINGS_FILE)?;
    }
    config.add_env();
    init_tracing(&config);

    info!(endpoint = %config.get_or("GrpcClient__Endpoint", ""), "Starting hello client");

    let task_options = TaskOptions::new(
        "libArmoniK.SDK.Worker.Examples.Hello.so",
        config.get_or("WorkerLib__Version", ""),
        "Examples",
        "HelloService",
    )
    .with_partition(config.get_or("PartitionId", ""))
    .with_max_retries(1);
    let properties = Properties::new(config, task_options);

    let session = SessionService::connect(&properties)?;
    info!(session_id = %session.session_id(), "Session created");

    let task_ids = session.submit(
        vec![TaskPayload::new("HelloService", b"Hello,".to_vec())],
        Arc::new(HelloHandler),
    )?;
    match task_ids.first() {
        Some(task_id) => info!(task_id = %task_id, "Task submitted"),
        None => {
            warn!("Control plane accepted no task");
            return Ok(());
        }
    }

    session.wait_all();
    info!("Task processing complete");
    Ok(())
}
