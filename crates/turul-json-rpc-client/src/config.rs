//! Client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use turul_json_rpc_core::{DataConvention, MethodConventions};

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Timeout configuration
    pub timeouts: TimeoutConfig,

    /// Payload naming convention, per method
    pub conventions: MethodConventions,
}

/// Timeout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Upper bound on one transport round trip
    #[serde(with = "duration_serde")]
    pub request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request = timeout;
        self
    }

    pub fn with_data_convention(mut self, convention: DataConvention) -> Self {
        self.conventions.default = convention;
        self
    }

    pub fn with_method_convention(
        mut self,
        method: impl Into<String>,
        convention: DataConvention,
    ) -> Self {
        self.conventions.set(method, convention);
        self
    }

    /// Convention used for `method`'s params and result
    pub fn convention_for(&self, method: &str) -> DataConvention {
        self.conventions.for_method(method)
    }
}

// Serde helper for Duration
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
