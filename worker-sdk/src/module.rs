//! Loading of application libraries.

use crate::abi::{
    FunctionTable, CALL_SYMBOL, CREATE_SERVICE_SYMBOL, DESTROY_SERVICE_SYMBOL,
    ENTER_SESSION_SYMBOL, LEAVE_SESSION_SYMBOL,
};
use crate::error::{WorkerError, WorkerResult};
use libloading::Library;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A loaded application exposing the service entry points
pub trait ServiceModule: Send {
    fn functions(&self) -> FunctionTable;
}

/// Entry points linked into the current binary
impl ServiceModule for FunctionTable {
    fn functions(&self) -> FunctionTable {
        *self
    }
}

/// Turns an application library path into a loaded module
pub trait ModuleLoader: Send {
    fn load(&self, path: &Path) -> WorkerResult<Box<dyn ServiceModule>>;
}

/// A shared library opened with `libloading`.
///
/// Unloaded on drop, which invalidates its function table.
pub struct NativeModule {
    functions: FunctionTable,
    path: PathBuf,
    _library: Library,
}

impl NativeModule {
    /// Open the library at `path` and resolve every entry point.
    pub fn open(path: &Path) -> WorkerResult<Self> {
        if !path.exists() {
            return Err(WorkerError::NotFound(path.to_path_buf()));
        }
        // SAFETY: loading runs the library's initializers; application
        // libraries are trusted code deployed next to the worker.
        let library = unsafe { Library::new(path) }.map_err(|source| WorkerError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        let functions = FunctionTable {
            create_service: resolve(&library, path, CREATE_SERVICE_SYMBOL)?,
            destroy_service: resolve(&library, path, DESTROY_SERVICE_SYMBOL)?,
            enter_session: resolve(&library, path, ENTER_SESSION_SYMBOL)?,
            leave_session: resolve(&library, path, LEAVE_SESSION_SYMBOL)?,
            call: resolve(&library, path, CALL_SYMBOL)?,
        };
        debug!(path = %path.display(), "Resolved application entry points");

        Ok(Self {
            functions,
            path: path.to_path_buf(),
            _library: library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ServiceModule for NativeModule {
    fn functions(&self) -> FunctionTable {
        self.functions
    }
}

/// Copy a function pointer out of `library`.
///
/// The caller must not use it after `library` is dropped.
fn resolve<T: Copy>(library: &Library, path: &Path, symbol: &'static str) -> WorkerResult<T> {
    // SAFETY: `T` is the C signature documented for `symbol`.
    unsafe { library.get::<T>(symbol.as_bytes()) }
        .map(|function| *function)
        .map_err(|source| WorkerError::MissingSymbol {
            symbol,
            path: path.to_path_buf(),
            source,
        })
}

/// Loads application libraries from disk
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

impl ModuleLoader for NativeLoader {
    fn load(&self, path: &Path) -> WorkerResult<Box<dyn ServiceModule>> {
        Ok(Box::new(NativeModule::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libabsent.so");
        match NativeLoader.load(&path) {
            Err(WorkerError::NotFound(missing)) => assert_eq!(missing, path),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("loaded a missing library"),
        }
    }

    #[test]
    fn test_invalid_library_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libgarbage.so");
        std::fs::write(&path, b"not a shared object").unwrap();
        assert!(matches!(
            NativeLoader.load(&path),
            Err(WorkerError::Load { .. })
        ));
    }
}
