//! Identifiers of the application and service a task runs in.

use armonik_sdk_core::TaskOptions;
use std::fmt;

/// An application: one loadable library
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AppId {
    pub name: String,
    /// May be empty
    pub version: String,
}

impl AppId {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn from_task_options(options: &TaskOptions) -> Self {
        Self::new(&options.application_name, &options.application_version)
    }

    /// File name of the application's library: `name.version`, or `name`
    /// alone when there is no version.
    pub fn library_name(&self) -> String {
        if self.version.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.version)
        }
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.version)
        }
    }
}

/// A service inside an application. Namespace and name may be empty for
/// applications exposing a single service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ServiceId {
    pub app: AppId,
    pub namespace: String,
    pub name: String,
}

impl ServiceId {
    pub fn new(app: AppId, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            app,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn from_task_options(options: &TaskOptions) -> Self {
        Self::new(
            AppId::from_task_options(options),
            &options.application_namespace,
            &options.application_service,
        )
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{} in {}", self.namespace, self.name, self.app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_from_task_options() {
        let options = TaskOptions::new("libecho", "1.2", "demo", "EchoService");
        let service = ServiceId::from_task_options(&options);
        assert_eq!(service.app, AppId::new("libecho", "1.2"));
        assert_eq!(service.namespace, "demo");
        assert_eq!(service.name, "EchoService");
        assert_eq!(service.to_string(), "demo::EchoService in libecho (1.2)");
    }

    #[test]
    fn test_library_name() {
        assert_eq!(AppId::new("libecho.so", "1.0").library_name(), "libecho.so.1.0");
        assert_eq!(AppId::new("libecho.so", "").library_name(), "libecho.so");
    }
}
