//! The loaded application and its active service.

use crate::error::{WorkerError, WorkerResult};
use crate::ids::{AppId, ServiceId};
use crate::module::{ModuleLoader, NativeLoader, ServiceModule};
use crate::service_manager::ServiceManager;
use crate::task_handler::{ProcessStatus, TaskHandler};
use armonik_sdk_core::WorkerConfig;
use std::path::{Path, PathBuf};
use tracing::info;

/// Keeps at most one application loaded and one of its services active.
///
/// Each `use_*` step is a no-op when asked for what is already in place, so
/// consecutive tasks of the same session reuse the library, the service and
/// the session state.
pub struct ApplicationManager {
    base_path: PathBuf,
    loader: Box<dyn ModuleLoader>,
    // Declared before `application` so the service is destroyed before its
    // library is unloaded.
    service: Option<ServiceManager>,
    application: Option<(AppId, Box<dyn ServiceModule>)>,
}

impl ApplicationManager {
    /// Load application libraries from disk
    pub fn new(config: &WorkerConfig) -> Self {
        Self::with_loader(config, Box::new(NativeLoader))
    }

    pub fn with_loader(config: &WorkerConfig, loader: Box<dyn ModuleLoader>) -> Self {
        Self {
            base_path: config.application_base_path.clone(),
            loader,
            service: None,
            application: None,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Where the library of `app` is expected
    pub fn library_path(&self, app: &AppId) -> PathBuf {
        self.base_path.join(app.library_name())
    }

    pub fn current_application(&self) -> Option<&AppId> {
        self.application.as_ref().map(|(id, _)| id)
    }

    pub fn current_service(&self) -> Option<&ServiceId> {
        self.service.as_ref().map(ServiceManager::id)
    }

    pub fn current_session(&self) -> Option<&str> {
        self.service.as_ref().and_then(ServiceManager::session_id)
    }

    /// Make `app` the loaded application, unloading the current one.
    ///
    /// On failure no application stays loaded.
    pub fn use_application(&mut self, app: &AppId) -> WorkerResult<&mut Self> {
        if self.current_application() == Some(app) {
            return Ok(self);
        }
        self.service = None;
        self.application = None;

        let path = self.library_path(app);
        let module = self.loader.load(&path)?;
        info!(application = %app, path = %path.display(), "Loaded application");
        self.application = Some((app.clone(), module));
        Ok(self)
    }

    /// Make `service` the active service of the loaded application.
    pub fn use_service(&mut self, service: &ServiceId) -> WorkerResult<&mut Self> {
        if self
            .service
            .as_ref()
            .is_some_and(|current| current.matches(service))
        {
            return Ok(self);
        }
        let functions = match &self.application {
            Some((_, module)) => module.functions(),
            None => return Err(WorkerError::NoApplication),
        };
        self.service = None;
        self.service = Some(ServiceManager::new(functions, service.clone())?);
        Ok(self)
    }

    /// Enter `session_id` in the active service
    pub fn use_session(&mut self, session_id: &str) -> WorkerResult<&mut Self> {
        match self.service.as_mut() {
            Some(service) => {
                service.use_session(session_id)?;
                Ok(self)
            }
            None => Err(WorkerError::NoService),
        }
    }

    /// Run a method of the active service in the entered session
    pub fn execute(
        &mut self,
        handler: &mut dyn TaskHandler,
        method_name: &str,
        arguments: &[u8],
    ) -> WorkerResult<ProcessStatus> {
        match self.service.as_mut() {
            Some(service) => service.execute(handler, method_name, arguments),
            None => Err(WorkerError::SessionNotInitialized),
        }
    }
}
