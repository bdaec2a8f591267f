//! One service instance of a loaded application and its current session.

use crate::abi::{bytes_from_raw, ArmoniKStatus, FunctionTable, ServiceContext, SessionContext};
use crate::error::{WorkerError, WorkerResult};
use crate::ids::ServiceId;
use crate::task_handler::{ProcessStatus, TaskHandler};
use std::ffi::{c_char, c_void, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// Status reported when the module fails without saying why
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error in worker, check logs.";

/// A service created through `armonik_create_service`.
///
/// Dropping it leaves the current session, if any, then destroys the
/// service. It must be dropped before the library providing its functions.
pub struct ServiceManager {
    id: ServiceId,
    functions: FunctionTable,
    service: ServiceContext,
    session: Option<(String, SessionContext)>,
}

impl ServiceManager {
    pub fn new(functions: FunctionTable, id: ServiceId) -> WorkerResult<Self> {
        let namespace = CString::new(id.namespace.as_str())?;
        let name = CString::new(id.name.as_str())?;
        // SAFETY: both strings outlive the call.
        let service = unsafe { (functions.create_service)(namespace.as_ptr(), name.as_ptr()) };
        info!(service = %id, "Service created");

        Ok(Self {
            id,
            functions,
            service: ServiceContext(service),
            session: None,
        })
    }

    pub fn id(&self) -> &ServiceId {
        &self.id
    }

    pub fn matches(&self, id: &ServiceId) -> bool {
        self.id == *id
    }

    /// Id of the entered session
    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|(id, _)| id.as_str())
    }

    /// Enter `session_id`, leaving the current session first if it differs.
    pub fn use_session(&mut self, session_id: &str) -> WorkerResult<&mut Self> {
        if self.session_id() == Some(session_id) {
            return Ok(self);
        }
        let c_session_id = CString::new(session_id)?;
        self.leave_session();

        // SAFETY: the service context came from this table's create function.
        let context =
            unsafe { (self.functions.enter_session)(self.service.0, c_session_id.as_ptr()) };
        debug!(service = %self.id, session_id, "Entered session");
        self.session = Some((session_id.to_string(), SessionContext(context)));
        Ok(self)
    }

    /// Call `method_name` in the entered session.
    ///
    /// Output reported by the module goes straight to the task's first
    /// expected result.
    pub fn execute(
        &mut self,
        handler: &mut dyn TaskHandler,
        method_name: &str,
        arguments: &[u8],
    ) -> WorkerResult<ProcessStatus> {
        let session = match &self.session {
            Some((_, context)) => *context,
            None => return Err(WorkerError::SessionNotInitialized),
        };
        let method = CString::new(method_name)?;
        let mut call = CallContext {
            handler,
            reported: None,
            send_error: None,
        };

        // SAFETY: `call` outlives the module call and is only accessed by
        // `report_result` during it; `arguments` stays borrowed meanwhile.
        let status = unsafe {
            (self.functions.call)(
                (&mut call as *mut CallContext<'_>).cast::<c_void>(),
                self.service.0,
                session.0,
                method.as_ptr(),
                arguments.as_ptr().cast::<c_char>(),
                arguments.len(),
                Some(report_result),
            )
        };

        if let Some(err) = call.send_error {
            return Err(err);
        }
        let outcome = match (status.is_ok(), call.reported) {
            (_, Some(Err(message))) => ProcessStatus::Error(message),
            (true, Some(Ok(()))) => ProcessStatus::Ok,
            (true, None) => ProcessStatus::Error("module did not report a result".to_string()),
            (false, _) => ProcessStatus::Error(UNKNOWN_ERROR_MESSAGE.to_string()),
        };
        if let ProcessStatus::Error(message) = &outcome {
            warn!(service = %self.id, method = method_name, error = %message, "Method failed");
        }
        Ok(outcome)
    }

    fn leave_session(&mut self) {
        if let Some((session_id, context)) = self.session.take() {
            // SAFETY: both contexts came from this table's functions.
            unsafe { (self.functions.leave_session)(self.service.0, context.0) };
            debug!(service = %self.id, session_id = %session_id, "Left session");
        }
    }
}

impl Drop for ServiceManager {
    fn drop(&mut self) {
        self.leave_session();
        // SAFETY: the service context is destroyed exactly once, here.
        unsafe { (self.functions.destroy_service)(self.service.0) };
        info!(service = %self.id, "Service destroyed");
    }
}

/// State shared with the module during one call
struct CallContext<'a> {
    handler: &'a mut dyn TaskHandler,
    reported: Option<Result<(), String>>,
    send_error: Option<WorkerError>,
}

unsafe extern "C" fn report_result(
    context: *mut c_void,
    status: ArmoniKStatus,
    data: *const c_char,
    size: usize,
) {
    if context.is_null() {
        return;
    }
    // SAFETY: modules hand back the context given to `armonik_call`, which is
    // alive for the whole call.
    let call = unsafe { &mut *context.cast::<CallContext<'_>>() };
    let bytes = unsafe { bytes_from_raw(data, size) };

    if !status.is_ok() {
        call.reported = Some(Err(String::from_utf8_lossy(bytes).into_owned()));
        return;
    }

    // Unwinding into the module is undefined, so panics stop here.
    let sent = catch_unwind(AssertUnwindSafe(|| {
        let result_id = call
            .handler
            .expected_results()
            .first()
            .cloned()
            .ok_or(WorkerError::NoExpectedResult)?;
        call.handler.send_result(&result_id, bytes)
    }));
    match sent {
        Ok(Ok(())) => call.reported = Some(Ok(())),
        Ok(Err(err)) => call.send_error = Some(err),
        Err(_) => {
            call.send_error = Some(WorkerError::Other(
                "task handler panicked while sending the result".to_string(),
            ))
        }
    }
}
