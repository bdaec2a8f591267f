//! Writing application libraries in Rust.
//!
//! Implement [`ServiceBase`] and export it with [`export_service!`]:
//!
//! ```ignore
//! use armonik_worker_sdk::{export_service, ServiceBase, ServiceResult};
//!
//! struct Echo;
//!
//! impl ServiceBase for Echo {
//!     type Session = ();
//!
//!     fn create(_namespace: &str, _name: &str) -> Self {
//!         Echo
//!     }
//!
//!     fn enter_session(&mut self, _session_id: &str) {}
//!
//!     fn call(&mut self, _session: &mut (), _method: &str, input: &[u8]) -> ServiceResult {
//!         Ok(input.to_vec())
//!     }
//! }
//!
//! export_service!(Echo);
//! ```
//!
//! The library must be built with `crate-type = ["cdylib"]`.

use std::error::Error;

/// Outcome of a service method: serialized output or an error
pub type ServiceResult = Result<Vec<u8>, Box<dyn Error + Send + Sync>>;

/// A service hosted in an application library
pub trait ServiceBase: Sized {
    /// Per-session state, created on entering a session
    type Session;

    fn create(service_namespace: &str, service_name: &str) -> Self;

    fn enter_session(&mut self, session_id: &str) -> Self::Session;

    /// Release a session's state. Dropping it is enough by default.
    fn leave_session(&mut self, session: Self::Session) {
        drop(session);
    }

    /// Run `method` on serialized `input`
    fn call(&mut self, session: &mut Self::Session, method: &str, input: &[u8]) -> ServiceResult;
}

/// Generate the five C entry points of an application library for a
/// [`ServiceBase`] implementation.
///
/// Panics raised by the service are caught at the boundary and reported as
/// errors.
#[macro_export]
macro_rules! export_service {
    ($service:ty) => {
        #[no_mangle]
        pub unsafe extern "C" fn armonik_create_service(
            service_namespace: *const ::std::ffi::c_char,
            service_name: *const ::std::ffi::c_char,
        ) -> *mut ::std::ffi::c_void {
            $crate::export::create_service::<$service>(service_namespace, service_name)
        }

        #[no_mangle]
        pub unsafe extern "C" fn armonik_destroy_service(service_context: *mut ::std::ffi::c_void) {
            $crate::export::destroy_service::<$service>(service_context)
        }

        #[no_mangle]
        pub unsafe extern "C" fn armonik_enter_session(
            service_context: *mut ::std::ffi::c_void,
            session_id: *const ::std::ffi::c_char,
        ) -> *mut ::std::ffi::c_void {
            $crate::export::enter_session::<$service>(service_context, session_id)
        }

        #[no_mangle]
        pub unsafe extern "C" fn armonik_leave_session(
            service_context: *mut ::std::ffi::c_void,
            session_context: *mut ::std::ffi::c_void,
        ) {
            $crate::export::leave_session::<$service>(service_context, session_context)
        }

        #[no_mangle]
        pub unsafe extern "C" fn armonik_call(
            armonik_context: *mut ::std::ffi::c_void,
            service_context: *mut ::std::ffi::c_void,
            session_context: *mut ::std::ffi::c_void,
            function_name: *const ::std::ffi::c_char,
            input: *const ::std::ffi::c_char,
            input_size: usize,
            callback: ::std::option::Option<$crate::abi::ResultCallback>,
        ) -> $crate::abi::ArmoniKStatus {
            $crate::export::call::<$service>(
                armonik_context,
                service_context,
                session_context,
                function_name,
                input,
                input_size,
                callback,
            )
        }
    };
}

/// Bodies of the functions generated by [`export_service!`].
#[doc(hidden)]
pub mod export {
    use super::ServiceBase;
    use crate::abi::{bytes_from_raw, ArmoniKStatus, ResultCallback};
    use std::ffi::{c_char, c_void, CStr};
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::ptr;
    use tracing::error;

    fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
        if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        }
    }

    unsafe fn text(value: *const c_char) -> String {
        if value.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(value) }.to_string_lossy().into_owned()
        }
    }

    /// # Safety
    ///
    /// Both pointers must be null or NUL-terminated strings.
    pub unsafe fn create_service<S: ServiceBase>(
        service_namespace: *const c_char,
        service_name: *const c_char,
    ) -> *mut c_void {
        let namespace = unsafe { text(service_namespace) };
        let name = unsafe { text(service_name) };
        match catch_unwind(|| S::create(&namespace, &name)) {
            Ok(service) => Box::into_raw(Box::new(service)).cast(),
            Err(payload) => {
                error!(panic = %panic_message(payload.as_ref()), "Service creation panicked");
                ptr::null_mut()
            }
        }
    }

    /// # Safety
    ///
    /// `service_context` must be null or come from [`create_service`] for
    /// the same `S`, and not be used afterwards.
    pub unsafe fn destroy_service<S: ServiceBase>(service_context: *mut c_void) {
        if service_context.is_null() {
            return;
        }
        let service = unsafe { Box::from_raw(service_context.cast::<S>()) };
        if let Err(payload) = catch_unwind(AssertUnwindSafe(move || drop(service))) {
            error!(panic = %panic_message(payload.as_ref()), "Service destruction panicked");
        }
    }

    /// # Safety
    ///
    /// `service_context` must be null or a live context from
    /// [`create_service`] for the same `S`; `session_id` must be null or a
    /// NUL-terminated string.
    pub unsafe fn enter_session<S: ServiceBase>(
        service_context: *mut c_void,
        session_id: *const c_char,
    ) -> *mut c_void {
        if service_context.is_null() {
            error!("Entering a session without a service");
            return ptr::null_mut();
        }
        let service = unsafe { &mut *service_context.cast::<S>() };
        let session_id = unsafe { text(session_id) };
        match catch_unwind(AssertUnwindSafe(|| service.enter_session(&session_id))) {
            Ok(session) => Box::into_raw(Box::new(session)).cast(),
            Err(payload) => {
                error!(
                    session_id = %session_id,
                    panic = %panic_message(payload.as_ref()),
                    "Entering session panicked"
                );
                ptr::null_mut()
            }
        }
    }

    /// # Safety
    ///
    /// Both contexts must be null or live contexts created for the same `S`.
    /// The session context must not be used afterwards.
    pub unsafe fn leave_session<S: ServiceBase>(
        service_context: *mut c_void,
        session_context: *mut c_void,
    ) {
        if service_context.is_null() || session_context.is_null() {
            return;
        }
        let service = unsafe { &mut *service_context.cast::<S>() };
        let session = unsafe { *Box::from_raw(session_context.cast::<S::Session>()) };
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| service.leave_session(session))) {
            error!(panic = %panic_message(payload.as_ref()), "Leaving session panicked");
        }
    }

    /// # Safety
    ///
    /// Contexts as for [`leave_session`]; `function_name` must be null or a
    /// NUL-terminated string and `input` must point to `input_size` bytes.
    #[allow(clippy::too_many_arguments)]
    pub unsafe fn call<S: ServiceBase>(
        armonik_context: *mut c_void,
        service_context: *mut c_void,
        session_context: *mut c_void,
        function_name: *const c_char,
        input: *const c_char,
        input_size: usize,
        callback: Option<ResultCallback>,
    ) -> ArmoniKStatus {
        let Some(callback) = callback else {
            error!("Method called without a result callback");
            return ArmoniKStatus::ERROR;
        };
        let report = |status: ArmoniKStatus, data: &[u8]| unsafe {
            callback(armonik_context, status, data.as_ptr().cast(), data.len())
        };

        if service_context.is_null() || session_context.is_null() {
            report(ArmoniKStatus::ERROR, b"Service or session is not initialized");
            return ArmoniKStatus::ERROR;
        }
        let service = unsafe { &mut *service_context.cast::<S>() };
        let session = unsafe { &mut *session_context.cast::<S::Session>() };
        let method = unsafe { text(function_name) };
        let input = unsafe { bytes_from_raw(input, input_size) };

        let outcome = match catch_unwind(AssertUnwindSafe(|| service.call(session, &method, input))) {
            Ok(outcome) => outcome.map_err(|e| e.to_string()),
            Err(payload) => Err(format!(
                "method {method} panicked: {}",
                panic_message(payload.as_ref())
            )),
        };
        match outcome {
            Ok(output) => {
                report(ArmoniKStatus::OK, &output);
                ArmoniKStatus::OK
            }
            Err(message) => {
                error!(method = %method, error = %message, "Service method failed");
                report(ArmoniKStatus::ERROR, message.as_bytes());
                ArmoniKStatus::ERROR
            }
        }
    }
}
