//! Default options attached to a session or to a batch of submitted tasks.

use crate::generated::armonik_v1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Options sent with every task of a session unless overridden per call.
///
/// The application fields route the task to a worker module: the worker
/// loads `{application_name}.{application_version}` and creates the service
/// `application_namespace`/`application_service` inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskOptions {
    pub application_name: String,
    pub application_version: String,
    pub application_namespace: String,
    pub application_service: String,
    pub partition_id: String,
    pub engine_type: String,
    pub priority: i32,
    pub max_retries: i32,
    #[serde(with = "duration_secs")]
    pub max_duration: Duration,
    /// Free-form options forwarded to the worker
    pub options: HashMap<String, String>,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            application_name: String::new(),
            application_version: String::new(),
            application_namespace: String::new(),
            application_service: String::new(),
            partition_id: String::new(),
            engine_type: String::new(),
            priority: 2,
            max_retries: 3,
            max_duration: Duration::from_secs(300),
            options: HashMap::new(),
        }
    }
}

impl TaskOptions {
    /// Options routing tasks to `namespace`/`service` of the given application
    pub fn new(
        application_name: impl Into<String>,
        application_version: impl Into<String>,
        application_namespace: impl Into<String>,
        application_service: impl Into<String>,
    ) -> Self {
        Self {
            application_name: application_name.into(),
            application_version: application_version.into(),
            application_namespace: application_namespace.into(),
            application_service: application_service.into(),
            ..Self::default()
        }
    }

    pub fn with_partition(mut self, partition_id: impl Into<String>) -> Self {
        self.partition_id = partition_id.into();
        self
    }

    pub fn with_engine_type(mut self, engine_type: impl Into<String>) -> Self {
        self.engine_type = engine_type.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_max_retries(mut self, max_retries: i32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = max_duration;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

impl From<&TaskOptions> for armonik_v1::TaskOptions {
    fn from(options: &TaskOptions) -> Self {
        Self {
            options: options.options.clone(),
            max_duration: Some(prost_types::Duration {
                seconds: options.max_duration.as_secs() as i64,
                nanos: options.max_duration.subsec_nanos() as i32,
            }),
            max_retries: options.max_retries,
            priority: options.priority,
            partition_id: options.partition_id.clone(),
            application_name: options.application_name.clone(),
            application_version: options.application_version.clone(),
            application_namespace: options.application_namespace.clone(),
            application_service: options.application_service.clone(),
            engine_type: options.engine_type.clone(),
        }
    }
}

impl From<armonik_v1::TaskOptions> for TaskOptions {
    fn from(raw: armonik_v1::TaskOptions) -> Self {
        let max_duration = raw
            .max_duration
            .map(|d| {
                Duration::from_secs(d.seconds.max(0) as u64)
                    + Duration::from_nanos(d.nanos.max(0) as u64)
            })
            .unwrap_or_default();
        Self {
            application_name: raw.application_name,
            application_version: raw.application_version,
            application_namespace: raw.application_namespace,
            application_service: raw.application_service,
            partition_id: raw.partition_id,
            engine_type: raw.engine_type,
            priority: raw.priority,
            max_retries: raw.max_retries,
            max_duration,
            options: raw.options,
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
