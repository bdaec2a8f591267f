//! Entry point of the worker: one call per task.

use crate::application_manager::ApplicationManager;
use crate::error::WorkerResult;
use crate::ids::{AppId, ServiceId};
use crate::module::ModuleLoader;
use crate::task_handler::{ProcessStatus, TaskHandler};
use armonik_sdk_core::{Configuration, TaskPayload};
use tracing::{debug, error};

/// Runs tasks in the application and service named by their options.
pub struct DynamicWorker {
    manager: ApplicationManager,
}

impl DynamicWorker {
    /// Worker loading libraries from the configured application base path
    pub fn new(config: &Configuration) -> Self {
        Self {
            manager: ApplicationManager::new(&config.worker()),
        }
    }

    pub fn with_loader(config: &Configuration, loader: Box<dyn ModuleLoader>) -> Self {
        Self {
            manager: ApplicationManager::with_loader(&config.worker(), loader),
        }
    }

    pub fn manager(&self) -> &ApplicationManager {
        &self.manager
    }

    /// Process one task.
    ///
    /// Every failure, including a library that cannot be loaded, becomes an
    /// error status for the task.
    pub fn execute(&mut self, handler: &mut dyn TaskHandler) -> ProcessStatus {
        match self.try_execute(handler) {
            Ok(status) => status,
            Err(e) => {
                error!(task_id = %handler.task_id(), error = %e, "Task could not be processed");
                ProcessStatus::Error(e.to_string())
            }
        }
    }

    fn try_execute(&mut self, handler: &mut dyn TaskHandler) -> WorkerResult<ProcessStatus> {
        let payload = TaskPayload::deserialize(handler.payload())?;
        let options = handler.task_options();
        let app = AppId::from_task_options(options);
        let service = ServiceId::from_task_options(options);
        let session_id = handler.session_id().to_string();
        debug!(
            task_id = %handler.task_id(),
            service = %service,
            method = %payload.method_name,
            "Executing task"
        );

        self.manager
            .use_application(&app)?
            .use_service(&service)?
            .use_session(&session_id)?
            .execute(handler, &payload.method_name, &payload.arguments)
    }
}
