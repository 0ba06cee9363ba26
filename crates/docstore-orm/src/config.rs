//! Store configuration.
//!
//! The configuration is a plain value threaded into every session. Nothing
//! here is process-global: two sessions built from different configurations
//! behave independently.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable enabling the single round-trip page-with-count query.
pub const USE_CTE_BASED_LIST_WITH_COUNT_ENV: &str = "DOCSTORE_USE_CTE_BASED_LIST_WITH_COUNT";

/// Environment variable overriding the default schema.
pub const DEFAULT_SCHEMA_ENV: &str = "DOCSTORE_DEFAULT_SCHEMA";

/// Settings shared by every query a session builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfiguration {
    /// Schema used for documents whose map does not name one.
    pub default_schema: String,
    /// Fetch a page and its total row count in one CTE-based statement.
    pub use_cte_based_list_with_count: bool,
    /// Command timeout in seconds handed to the executor.
    pub command_timeout: Option<u64>,
    /// Name of the text JSON payload column.
    pub json_column_name: String,
    /// Name of the compressed JSON payload column.
    pub compressed_json_column_name: String,
}

impl Default for StoreConfiguration {
    fn default() -> Self {
        Self {
            default_schema: String::from("dbo"),
            use_cte_based_list_with_count: false,
            command_timeout: None,
            json_column_name: String::from("JSON"),
            compressed_json_column_name: String::from("JSONBlob"),
        }
    }
}

impl StoreConfiguration {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads overrides from the environment once.
    ///
    /// `DOCSTORE_USE_CTE_BASED_LIST_WITH_COUNT` accepts `1`/`true`/`yes`
    /// (any case); `DOCSTORE_DEFAULT_SCHEMA` replaces the default schema when
    /// non-empty.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut configuration = Self::default();
        if let Some(flag) = lookup(USE_CTE_BASED_LIST_WITH_COUNT_ENV) {
            configuration.use_cte_based_list_with_count = parse_flag(&flag);
        }
        if let Some(schema) = lookup(DEFAULT_SCHEMA_ENV) {
            let schema = schema.trim();
            if !schema.is_empty() {
                configuration.default_schema = schema.to_string();
            }
        }
        configuration
    }

    /// Sets the default schema.
    #[must_use]
    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    /// Enables or disables the CTE-based page-with-count query.
    #[must_use]
    pub const fn with_cte_based_list_with_count(mut self, enabled: bool) -> Self {
        self.use_cte_based_list_with_count = enabled;
        self
    }

    /// Sets the command timeout.
    #[must_use]
    pub const fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout.as_secs());
        self
    }

    /// Sets the JSON payload column name.
    #[must_use]
    pub fn with_json_column_name(mut self, name: impl Into<String>) -> Self {
        self.json_column_name = name.into();
        self
    }

    /// The command timeout as a [`Duration`].
    #[must_use]
    pub fn command_timeout_duration(&self) -> Option<Duration> {
        self.command_timeout.map(Duration::from_secs)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
