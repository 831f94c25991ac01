//! Run configuration

use crate::core::{BufferError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration of one producer/consumer run
///
/// Deserializes from JSON with every field optional; missing fields take the
/// values of [`RunConfig::sample()`].
///
/// ```rust
/// use rust_bounded_buffer::RunConfig;
/// use std::time::Duration;
///
/// let config = RunConfig::new(8, 3, 2, 100)
///     .with_timeout(Duration::from_secs(5))
///     .with_thread_name_prefix("demo");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Queue capacity
    pub capacity: usize,
    /// Number of producer threads
    pub num_producers: usize,
    /// Number of consumer threads
    pub num_consumers: usize,
    /// Items produced, and consumed, across the whole run
    pub total_items: usize,
    /// Upper bound on how long the coordinator waits for workers.
    /// Default: 30s
    pub timeout: Duration,
    /// Simulated work after each insert
    pub producer_delay: Option<Duration>,
    /// Simulated work after each removal
    pub consumer_delay: Option<Duration>,
    /// Prefix for worker thread names
    pub thread_name_prefix: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::sample()
    }
}

impl RunConfig {
    /// Create a configuration with the given sizes and default tunables
    #[must_use]
    pub fn new(
        capacity: usize,
        num_producers: usize,
        num_consumers: usize,
        total_items: usize,
    ) -> Self {
        Self {
            capacity,
            num_producers,
            num_consumers,
            total_items,
            timeout: Duration::from_secs(30),
            producer_delay: None,
            consumer_delay: None,
            thread_name_prefix: "buffer".to_string(),
        }
    }

    /// The predefined task: capacity 5, 2 producers, 2 consumers, 10 items
    #[must_use]
    pub fn sample() -> Self {
        Self::new(5, 2, 2, 10)
    }

    /// Parse a configuration from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BufferError::invalid_config("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the completion timeout
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pause producers for `delay` after each insert
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_producer_delay(mut self, delay: Duration) -> Self {
        self.producer_delay = Some(delay);
        self
    }

    /// Pause consumers for `delay` after each removal
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_consumer_delay(mut self, delay: Duration) -> Self {
        self.consumer_delay = Some(delay);
        self
    }

    /// Set thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let counts = [
            ("capacity", self.capacity),
            ("num_producers", self.num_producers),
            ("num_consumers", self.num_consumers),
            ("total_items", self.total_items),
        ];
        for (parameter, value) in counts {
            if value == 0 {
                return Err(BufferError::invalid_config(parameter, "must be greater than 0"));
            }
        }

        if self.timeout.is_zero() {
            return Err(BufferError::invalid_config("timeout", "must be non-zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_matches_predefined_task() {
        let config = RunConfig::sample();
        assert_eq!(config.capacity, 5);
        assert_eq!(config.num_producers, 2);
        assert_eq!(config.num_consumers, 2);
        assert_eq!(config.total_items, 10);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_counts_rejected_by_name() {
        let cases = [
            (RunConfig::new(0, 1, 1, 1), "capacity"),
            (RunConfig::new(1, 0, 1, 1), "num_producers"),
            (RunConfig::new(1, 1, 0, 1), "num_consumers"),
            (RunConfig::new(1, 1, 1, 0), "total_items"),
        ];
        for (config, expected) in cases {
            match config.validate() {
                Err(BufferError::InvalidConfig { parameter, .. }) => assert_eq!(parameter, expected),
                other => panic!("expected InvalidConfig for {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = RunConfig::sample().with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = RunConfig::new(3, 1, 1, 6)
            .with_producer_delay(Duration::from_millis(50))
            .with_consumer_delay(Duration::from_millis(75))
            .with_thread_name_prefix("pc");
        assert_eq!(config.producer_delay, Some(Duration::from_millis(50)));
        assert_eq!(config.consumer_delay, Some(Duration::from_millis(75)));
        assert_eq!(config.thread_name_prefix, "pc");
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = RunConfig::from_json(r#"{"capacity": 8, "total_items": 40}"#).unwrap();
        assert_eq!(config.capacity, 8);
        assert_eq!(config.total_items, 40);
        assert_eq!(config.num_producers, 2);
        assert_eq!(config.thread_name_prefix, "buffer");
    }

    #[test]
    fn test_from_json_rejects_invalid_values() {
        assert!(matches!(
            RunConfig::from_json(r#"{"num_consumers": 0}"#),
            Err(BufferError::InvalidConfig { .. })
        ));
        assert!(matches!(
            RunConfig::from_json("not json"),
            Err(BufferError::InvalidConfig { .. })
        ));
    }
}
