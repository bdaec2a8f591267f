//! Configuration for ArmoniK clients and workers
//!
//! [`Configuration`] is a flat key/value store filled from JSON files and
//! environment variables. Nested JSON sections are flattened with a double
//! underscore, so `{"GrpcClient": {"Endpoint": "..."}}` becomes the key
//! `GrpcClient__Endpoint`, which is also the name of the environment variable
//! overriding it. Typed views ([`ControlPlaneConfig`], [`WorkerConfig`]) read
//! the keys they need and validate them.

use crate::error::{CoreError, CoreResult};
use crate::task_options::TaskOptions;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key of the control plane endpoint
pub const ENDPOINT_KEY: &str = "GrpcClient__Endpoint";
/// Key of the maximum number of result ids per status request
pub const WAIT_BATCH_SIZE_KEY: &str = "GrpcClient__WaitBatchSize";
/// Key of the maximum number of tasks per submission request
pub const SUBMIT_BATCH_SIZE_KEY: &str = "GrpcClient__SubmitBatchSize";
/// Key of the directory holding worker application modules
pub const APPLICATION_BASE_PATH_KEY: &str = "Worker__ApplicationBasePath";
/// Key of the default partition
pub const PARTITION_ID_KEY: &str = "PartitionId";
/// Key of the minimum log level
pub const LOG_LEVEL_KEY: &str = "Serilog__MinimumLevel";

const SECTION_SEPARATOR: &str = "__";

/// Flat key/value configuration store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    values: BTreeMap<String, String>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `key`, if set
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value of `key`, or `default` when unset or empty
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.get(key) {
            Some(value) if !value.is_empty() => value,
            _ => default,
        }
    }

    /// Integer value of `key`, or `default` when unset or empty
    pub fn get_usize(&self, key: &str, default: usize) -> CoreResult<usize> {
        match self.get(key) {
            None | Some("") => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| {
                CoreError::InvalidConfiguration(format!(
                    "{key} must be a non-negative integer, got {raw:?}"
                ))
            }),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(normalize_key(&key.into()), value.into());
        self
    }

    /// Copy every entry of `other` over this configuration
    pub fn merge(&mut self, other: &Configuration) -> &mut Self {
        self.values
            .extend(other.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// All entries, sorted by key
    pub fn list(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Overlay the entries of a JSON file
    pub fn add_json_file(&mut self, path: impl AsRef<Path>) -> CoreResult<&mut Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        self.add_json_str(&text)
    }

    /// Overlay the entries of a JSON document
    pub fn add_json_str(&mut self, json: &str) -> CoreResult<&mut Self> {
        let document: Value = serde_json::from_str(json)?;
        if !document.is_object() {
            return Err(CoreError::InvalidConfiguration(
                "configuration document must be a JSON object".to_string(),
            ));
        }
        flatten_into(&mut self.values, String::new(), &document);
        Ok(self)
    }

    /// Overlay the process environment
    pub fn add_env(&mut self) -> &mut Self {
        self.add_env_from(std::env::vars())
    }

    /// Overlay the given variables as if they came from the environment
    pub fn add_env_from<I, K, V>(&mut self, vars: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in vars {
            self.set(key, value);
        }
        self
    }

    /// Typed view of the control plane settings
    pub fn control_plane(&self) -> CoreResult<ControlPlaneConfig> {
        ControlPlaneConfig::from_configuration(self)
    }

    /// Typed view of the worker settings
    pub fn worker(&self) -> WorkerConfig {
        WorkerConfig::from_configuration(self)
    }

    /// Configured log level as a tracing filter directive
    pub fn log_level(&self) -> &'static str {
        match self.get_or(LOG_LEVEL_KEY, "Information").to_ascii_lowercase().as_str() {
            "verbose" | "trace" => "trace",
            "debug" => "debug",
            "warning" | "warn" => "warn",
            "error" | "fatal" | "critical" => "error",
            _ => "info",
        }
    }
}

fn normalize_key(key: &str) -> String {
    key.replace(['.', ':'], SECTION_SEPARATOR)
}

fn flatten_into(values: &mut BTreeMap<String, String>, prefix: String, value: &Value) {
    let child_key = |name: &str| {
        if prefix.is_empty() {
            normalize_key(name)
        } else {
            format!("{prefix}{SECTION_SEPARATOR}{}", normalize_key(name))
        }
    };
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                flatten_into(values, child_key(name), child);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(values, child_key(&index.to_string()), child);
            }
        }
        Value::String(s) => {
            values.insert(prefix, s.clone());
        }
        Value::Null => {
            values.insert(prefix, String::new());
        }
        other => {
            values.insert(prefix, other.to_string());
        }
    }
}

/// Settings used to reach the control plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPlaneConfig {
    /// Endpoint URI, e.g. `http://localhost:5001`
    pub endpoint: String,
    /// Maximum number of result ids per status request
    pub wait_batch_size: usize,
    /// Maximum number of tasks per submission request
    pub submit_batch_size: usize,
}

impl ControlPlaneConfig {
    pub const DEFAULT_WAIT_BATCH_SIZE: usize = 200;
    pub const DEFAULT_SUBMIT_BATCH_SIZE: usize = 200;

    /// Create a new configuration with validation
    pub fn new(
        endpoint: impl Into<String>,
        wait_batch_size: usize,
        submit_batch_size: usize,
    ) -> CoreResult<Self> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(CoreError::InvalidConfiguration(format!(
                "{ENDPOINT_KEY} must be set"
            )));
        }
        if wait_batch_size == 0 {
            return Err(CoreError::InvalidConfiguration(
                "wait_batch_size must be positive".to_string(),
            ));
        }
        if submit_batch_size == 0 {
            return Err(CoreError::InvalidConfiguration(
                "submit_batch_size must be positive".to_string(),
            ));
        }
        Ok(Self {
            endpoint,
            wait_batch_size,
            submit_batch_size,
        })
    }

    fn from_configuration(config: &Configuration) -> CoreResult<Self> {
        Self::new(
            config.get_or(ENDPOINT_KEY, ""),
            config.get_usize(WAIT_BATCH_SIZE_KEY, Self::DEFAULT_WAIT_BATCH_SIZE)?,
            config.get_usize(SUBMIT_BATCH_SIZE_KEY, Self::DEFAULT_SUBMIT_BATCH_SIZE)?,
        )
    }
}

/// Settings of the dynamic worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Directory holding the application modules
    pub application_base_path: PathBuf,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            application_base_path: PathBuf::from(Self::DEFAULT_APPLICATION_BASE_PATH),
        }
    }
}

impl WorkerConfig {
    pub const DEFAULT_APPLICATION_BASE_PATH: &'static str = "/data";

    fn from_configuration(config: &Configuration) -> Self {
        Self {
            application_base_path: PathBuf::from(config.get_or(
                APPLICATION_BASE_PATH_KEY,
                Self::DEFAULT_APPLICATION_BASE_PATH,
            )),
        }
    }
}

/// Everything a session needs: raw configuration plus default task options
#[derive(Debug, Clone, Default)]
pub struct Properties {
    pub configuration: Configuration,
    pub task_options: TaskOptions,
}

impl Properties {
    pub fn new(configuration: Configuration, task_options: TaskOptions) -> Self {
        Self {
            configuration,
            task_options,
        }
    }

    /// Partition the session is created in: the task options' partition,
    /// falling back to the configured default.
    pub fn partition_id(&self) -> Option<String> {
        let partition = if self.task_options.partition_id.is_empty() {
            self.configuration.get_or(PARTITION_ID_KEY, "")
        } else {
            self.task_options.partition_id.as_str()
        };
        (!partition.is_empty()).then(|| partition.to_string())
    }
}
