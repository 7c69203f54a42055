// crates/formwork-config/src/config.rs
// ============================================================================
// Module: Formwork Configuration
// Description: Configuration loading and validation for Formwork.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: formwork-core, rule-expr, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section has defaults, so an empty file is a valid configuration.
//! Missing or invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use formwork_core::EditAuditSink;
use formwork_core::FileAuditSink;
use formwork_core::Interval;
use formwork_core::NoopAuditSink;
use formwork_core::RuleErrorPolicy;
use formwork_core::StderrAuditSink;
use formwork_core::TimeRangeDefaults;
use formwork_core::ValidationOptions;
use formwork_core::parse_interval;
use rule_expr::DEFAULT_MAX_INPUT_BYTES;
use rule_expr::DEFAULT_MAX_NESTING;
use rule_expr::ParseLimits;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "formwork.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "FORMWORK_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum configurable rule expression size in bytes.
pub const MAX_EXPRESSION_BYTES: usize = 64 * 1024;
/// Maximum configurable rule expression nesting depth.
pub const MAX_EXPRESSION_DEPTH: usize = 128;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Formwork configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FormworkConfig {
    /// Rule evaluation configuration.
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Default bounds for the time-range editor.
    #[serde(default)]
    pub time_range: TimeRangeConfig,
    /// Edit audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Named descriptor catalog files.
    #[serde(default)]
    pub catalogs: CatalogsConfig,
}

impl FormworkConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validation.validate()?;
        self.time_range.validate()?;
        self.audit.validate()?;
        self.catalogs.validate()?;
        Ok(())
    }
}

/// Rule evaluation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Treatment of rules that fail to parse or evaluate.
    #[serde(default)]
    pub rule_error_policy: RuleErrorPolicy,
    /// Maximum rule expression size in bytes.
    #[serde(default = "default_max_expression_bytes")]
    pub max_expression_bytes: usize,
    /// Maximum rule expression nesting depth.
    #[serde(default = "default_max_expression_depth")]
    pub max_expression_depth: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            rule_error_policy: RuleErrorPolicy::default(),
            max_expression_bytes: default_max_expression_bytes(),
            max_expression_depth: default_max_expression_depth(),
        }
    }
}

impl ValidationConfig {
    /// Validates rule evaluation limits.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_limit(
            "validation.max_expression_bytes",
            self.max_expression_bytes,
            MAX_EXPRESSION_BYTES,
        )?;
        validate_limit(
            "validation.max_expression_depth",
            self.max_expression_depth,
            MAX_EXPRESSION_DEPTH,
        )
    }

    /// Returns the validation options described by this section.
    #[must_use]
    pub const fn options(&self) -> ValidationOptions {
        ValidationOptions {
            rule_error_policy: self.rule_error_policy,
            limits: ParseLimits {
                max_input_bytes: self.max_expression_bytes,
                max_nesting: self.max_expression_depth,
            },
        }
    }
}

/// Default bounds for the time-range editor, in interval short form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimeRangeConfig {
    /// Relative start installed when the start switches to relative mode.
    #[serde(default = "default_start_relative")]
    pub default_start_relative: String,
    /// Relative end installed when the end switches to relative mode.
    #[serde(default = "default_end_relative")]
    pub default_end_relative: String,
}

impl Default for TimeRangeConfig {
    fn default() -> Self {
        Self {
            default_start_relative: default_start_relative(),
            default_end_relative: default_end_relative(),
        }
    }
}

impl TimeRangeConfig {
    /// Validates both default intervals.
    fn validate(&self) -> Result<(), ConfigError> {
        self.defaults().map(|_| ())
    }

    /// Parses the configured intervals.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an interval is malformed or zero.
    pub fn defaults(&self) -> Result<TimeRangeDefaults, ConfigError> {
        Ok(TimeRangeDefaults {
            start_relative: parse_positive_interval(
                "time_range.default_start_relative",
                &self.default_start_relative,
            )?,
            end_relative: parse_positive_interval(
                "time_range.default_end_relative",
                &self.default_end_relative,
            )?,
        })
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
    /// Events are discarded.
    #[default]
    None,
}

/// Edit audit logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Sink receiving audit events.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path (JSON lines), required for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, None) => Err(ConfigError::Invalid(
                "audit.sink=file requires audit.path".to_string(),
            )),
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (_, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only allowed with audit.sink=file".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the audit file cannot be opened or the
    /// section is invalid.
    pub fn build_sink(&self) -> Result<Box<dyn EditAuditSink>, ConfigError> {
        self.validate()?;
        match (self.sink, &self.path) {
            (AuditSinkKind::Stderr, _) => Ok(Box::new(StderrAuditSink)),
            (AuditSinkKind::File, Some(path)) => {
                let sink = FileAuditSink::new(Path::new(path.trim()))
                    .map_err(|err| ConfigError::Io(format!("audit.path: {err}")))?;
                Ok(Box::new(sink))
            }
            (AuditSinkKind::File | AuditSinkKind::None, _) => Ok(Box::new(NoopAuditSink)),
        }
    }
}

/// Named descriptor catalog files (JSON).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogsConfig {
    /// Aggregator catalog used for metric pipelines.
    #[serde(default)]
    pub aggregators: Option<String>,
    /// Group-by catalog used for metric grouping.
    #[serde(default)]
    pub group_by: Option<String>,
    /// General processor catalog.
    #[serde(default)]
    pub processors: Option<String>,
}

impl CatalogsConfig {
    /// Validates catalog paths.
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("catalogs.aggregators", &self.aggregators),
            ("catalogs.group_by", &self.group_by),
            ("catalogs.processors", &self.processors),
        ] {
            if let Some(path) = value {
                validate_path_string(field, path)?;
            }
        }
        Ok(())
    }

    /// Returns the aggregator catalog path, if configured.
    #[must_use]
    pub fn aggregators_path(&self) -> Option<PathBuf> {
        self.aggregators.as_deref().map(|path| PathBuf::from(path.trim()))
    }

    /// Returns the group-by catalog path, if configured.
    #[must_use]
    pub fn group_by_path(&self) -> Option<PathBuf> {
        self.group_by.as_deref().map(|path| PathBuf::from(path.trim()))
    }

    /// Returns the processor catalog path, if configured.
    #[must_use]
    pub fn processors_path(&self) -> Option<PathBuf> {
        self.processors.as_deref().map(|path| PathBuf::from(path.trim()))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a limit lies in `1..=max`.
fn validate_limit(field: &str, value: usize, max: usize) -> Result<(), ConfigError> {
    if value == 0 || value > max {
        return Err(ConfigError::Invalid(format!("{field} must be between 1 and {max}")));
    }
    Ok(())
}

/// Parses a non-zero interval in short form.
fn parse_positive_interval(field: &str, value: &str) -> Result<Interval, ConfigError> {
    let interval =
        parse_interval(value).map_err(|err| ConfigError::Invalid(format!("{field}: {err}")))?;
    if interval.value == 0 {
        return Err(ConfigError::Invalid(format!("{field} must be greater than zero")));
    }
    Ok(interval)
}

/// Default rule expression size limit.
const fn default_max_expression_bytes() -> usize {
    DEFAULT_MAX_INPUT_BYTES
}

/// Default rule expression nesting limit.
const fn default_max_expression_depth() -> usize {
    DEFAULT_MAX_NESTING
}

/// Default relative start bound.
fn default_start_relative() -> String {
    "1h".to_string()
}

/// Default relative end bound.
fn default_end_relative() -> String {
    "1m".to_string()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
