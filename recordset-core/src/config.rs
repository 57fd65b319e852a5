//! Configuration of the predicate resolution step.
//!
//! A [`MatchConfig`] decides how a predicate without an operator is resolved:
//! whether a text comparison value is first tried as a regular expression, and
//! how large such a pattern may grow once compiled. The defaults reproduce the
//! engine's documented behaviour, so most callers never build one.

use serde::{Deserialize, Serialize};

use crate::error::RecordResult;

/// Default compiled-size cap for fallback patterns (1 MiB).
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Options controlling how bare-keyword predicates are resolved.
///
/// # Example
///
/// ```ignore
/// use recordset::config::MatchConfig;
///
/// let config = MatchConfig::builder()
///     .regex_fallback(false)
///     .build();
///
/// let loaded = MatchConfig::from_json_str(r#"{ "regex_size_limit": 4096 }"#)?;
/// assert!(loaded.regex_fallback);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Try a text comparison value as a pattern before falling back to equality.
    pub regex_fallback: bool,
    /// Maximum compiled size of a fallback pattern. Larger patterns are
    /// treated as plain text and compared for equality.
    pub regex_size_limit: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            regex_fallback: true,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }
}

impl MatchConfig {
    /// Creates a builder starting from the default configuration.
    pub fn builder() -> MatchConfigBuilder {
        MatchConfigBuilder::new()
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Serialization`](crate::error::RecordError::Serialization)
    /// if the text is not a valid configuration object.
    pub fn from_json_str(text: &str) -> RecordResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Builder for [`MatchConfig`].
#[derive(Debug, Clone, Default)]
pub struct MatchConfigBuilder {
    config: MatchConfig,
}

impl MatchConfigBuilder {
    /// Creates a builder holding the default configuration.
    pub fn new() -> Self {
        Self { config: MatchConfig::default() }
    }

    /// Enables or disables the pattern fallback for bare keywords.
    pub fn regex_fallback(mut self, enabled: bool) -> Self {
        self.config.regex_fallback = enabled;
        self
    }

    /// Sets the compiled-size cap for fallback patterns.
    pub fn regex_size_limit(mut self, limit: usize) -> Self {
        self.config.regex_size_limit = limit;
        self
    }

    /// Returns the configured [`MatchConfig`].
    pub fn build(self) -> MatchConfig {
        self.config
    }
}
