//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AppConfig`] values without
//! repeating boilerplate across crate boundaries.

use smsport_config::{AppConfig, Timezone};

/// Fluent builder for [`AppConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .output_dir("/tmp/out")
///     .readable_date_format("%Y-%m-%d")
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn output_dir(mut self, dir: &str) -> Self {
        self.config.output.dir = dir.to_string();
        self
    }

    pub fn android_file_prefix(mut self, prefix: &str) -> Self {
        self.config.output.android_file_prefix = prefix.to_string();
        self
    }

    pub fn wp_file_prefix(mut self, prefix: &str) -> Self {
        self.config.output.wp_file_prefix = prefix.to_string();
        self
    }

    pub fn readable_date_format(mut self, format: &str) -> Self {
        self.config.output.readable_date_format = format.to_string();
        self
    }

    pub fn timezone(mut self, timezone: Timezone) -> Self {
        self.config.output.timezone = timezone;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
