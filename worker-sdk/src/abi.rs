//! C interface between the worker and application libraries.
//!
//! An application library exports five functions under fixed names:
//!
//! ```text
//! void *armonik_create_service(const char *service_namespace, const char *service_name);
//! void  armonik_destroy_service(void *service_context);
//! void *armonik_enter_session(void *service_context, const char *session_id);
//! void  armonik_leave_session(void *service_context, void *session_context);
//! armonik_status_t armonik_call(void *armonik_context, void *service_context,
//!                               void *session_context, const char *function_name,
//!                               const char *input, size_t input_size,
//!                               armonik_callback_t callback);
//! ```
//!
//! `armonik_call` reports its outcome through
//! `callback(armonik_context, status, output_or_error, size)`.

use std::ffi::{c_char, c_int, c_void};

/// Status code crossing the C boundary
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmoniKStatus(pub c_int);

impl ArmoniKStatus {
    pub const OK: Self = Self(0);
    pub const ERROR: Self = Self(1);

    pub fn is_ok(self) -> bool {
        self == Self::OK
    }
}

pub type CreateServiceFn =
    unsafe extern "C" fn(service_namespace: *const c_char, service_name: *const c_char) -> *mut c_void;

pub type DestroyServiceFn = unsafe extern "C" fn(service_context: *mut c_void);

pub type EnterSessionFn =
    unsafe extern "C" fn(service_context: *mut c_void, session_id: *const c_char) -> *mut c_void;

pub type LeaveSessionFn =
    unsafe extern "C" fn(service_context: *mut c_void, session_context: *mut c_void);

pub type ResultCallback = unsafe extern "C" fn(
    armonik_context: *mut c_void,
    status: ArmoniKStatus,
    output_or_error: *const c_char,
    size: usize,
);

pub type CallFn = unsafe extern "C" fn(
    armonik_context: *mut c_void,
    service_context: *mut c_void,
    session_context: *mut c_void,
    function_name: *const c_char,
    input: *const c_char,
    input_size: usize,
    callback: Option<ResultCallback>,
) -> ArmoniKStatus;

pub const CREATE_SERVICE_SYMBOL: &str = "armonik_create_service";
pub const DESTROY_SERVICE_SYMBOL: &str = "armonik_destroy_service";
pub const ENTER_SESSION_SYMBOL: &str = "armonik_enter_session";
pub const LEAVE_SESSION_SYMBOL: &str = "armonik_leave_session";
pub const CALL_SYMBOL: &str = "armonik_call";

/// Entry points of one application library.
///
/// The pointers are only valid while the library that provided them stays
/// loaded.
#[derive(Debug, Clone, Copy)]
pub struct FunctionTable {
    pub create_service: CreateServiceFn,
    pub destroy_service: DestroyServiceFn,
    pub enter_session: EnterSessionFn,
    pub leave_session: LeaveSessionFn,
    pub call: CallFn,
}

/// Opaque service instance returned by `armonik_create_service`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceContext(pub *mut c_void);

/// Opaque session state returned by `armonik_enter_session`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext(pub *mut c_void);

// SAFETY: contexts are only handed back to the library by the manager owning
// them, which is used from one thread at a time.
unsafe impl Send for ServiceContext {}
unsafe impl Send for SessionContext {}

/// View `size` bytes at `data` as a slice, treating null as empty.
///
/// # Safety
///
/// A non-null `data` must point to `size` readable bytes that outlive the
/// returned slice.
pub unsafe fn bytes_from_raw<'a>(data: *const c_char, size: usize) -> &'a [u8] {
    if data.is_null() || size == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(data.cast::<u8>(), size)
    }
}
