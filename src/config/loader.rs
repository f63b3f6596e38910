//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DumpConfig, Environment, SourceKind};
use super::secret::secret_string;
use crate::domain::errors::DumpError;
use crate::domain::result::Result;
use crate::domain::VersionPolicy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "docudump.toml";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`DumpConfig`]
/// 4. Applies environment variable overrides (`DOCUDUMP_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`DumpError::Configuration`] if the file cannot be read or parsed, a
/// referenced variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use docudump::config::loader::load_config;
///
/// let config = load_config("docudump.toml").expect("Failed to load config");
/// println!("{}", config.docushare.base_url);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DumpConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DumpError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        DumpError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    let contents = substitute_env_vars(&contents, |name| std::env::var(name).ok())?;

    let mut config: DumpConfig = toml::from_str(&contents)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    validate(&config)?;

    tracing::debug!(path = %path.display(), "Loaded configuration file");
    Ok(config)
}

/// Resolves the configuration for a run
///
/// An explicit path must exist. Without one, `docudump.toml` in the working
/// directory is used when present; otherwise the built-in defaults plus
/// environment overrides.
///
/// # Errors
///
/// Returns [`DumpError::Configuration`] on any load or validation failure.
pub fn resolve_config(path: Option<&str>) -> Result<DumpConfig> {
    match path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => load_config(DEFAULT_CONFIG_FILE),
        None => {
            let mut config = DumpConfig::default();
            apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
            validate(&config)?;
            Ok(config)
        }
    }
}

fn validate(config: &DumpConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| DumpError::Configuration(format!("Configuration validation failed: {e}")))
}

/// Substitutes `${VAR_NAME}` placeholders using `lookup`
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that `lookup` cannot resolve
pub fn substitute_env_vars<F>(input: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| DumpError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            match lookup(name) {
                Some(value) => value,
                None => {
                    if !missing_vars.iter().any(|m| m == name) {
                        missing_vars.push(name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(DumpError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_value<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| DumpError::Configuration(format!("Invalid value for {key}: {e}"))),
        None => Ok(None),
    }
}

fn parse_enum<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: serde::de::DeserializeOwned,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => {
            let value = serde_json::Value::String(raw.trim().to_lowercase());
            serde_json::from_value(value)
                .map(Some)
                .map_err(|e| DumpError::Configuration(format!("Invalid value for {key}: {e}")))
        }
        None => Ok(None),
    }
}

/// Applies `DOCUDUMP_<SECTION>_<KEY>` overrides read through `lookup`
///
/// For example `DOCUDUMP_DOCUSHARE_BASE_URL` or `DOCUDUMP_EXPORT_PARALLEL_DOWNLOADS`.
///
/// # Errors
///
/// Returns an error naming the variable if a value does not parse
pub fn apply_env_overrides<F>(config: &mut DumpConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    // Application and environment
    if let Some(val) = lookup("DOCUDUMP_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(env) = parse_enum::<Environment, _>(&lookup, "DOCUDUMP_ENVIRONMENT")? {
        config.environment = env;
    }

    // DocuShare
    let docushare = &mut config.docushare;
    if let Some(source) = parse_enum::<SourceKind, _>(&lookup, "DOCUDUMP_DOCUSHARE_SOURCE")? {
        docushare.source = source;
    }
    if let Some(val) = lookup("DOCUDUMP_DOCUSHARE_BASE_URL") {
        docushare.base_url = val;
    }
    if let Some(val) = lookup("DOCUDUMP_DOCUSHARE_ARCHIVE_PATH") {
        docushare.archive_path = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("DOCUDUMP_DOCUSHARE_AUTH_TYPE") {
        docushare.auth_type = val;
    }
    if let Some(val) = lookup("DOCUDUMP_DOCUSHARE_USERNAME") {
        docushare.username = Some(val);
    }
    if let Some(val) = lookup("DOCUDUMP_DOCUSHARE_PASSWORD") {
        docushare.password = Some(secret_string(val));
    }
    if let Some(val) = parse_value(&lookup, "DOCUDUMP_DOCUSHARE_TLS_VERIFY")? {
        docushare.tls_verify = val;
    }
    if let Some(val) = lookup("DOCUDUMP_DOCUSHARE_TLS_CA_CERT") {
        docushare.tls_ca_cert = Some(PathBuf::from(val));
    }
    if let Some(val) = parse_value(&lookup, "DOCUDUMP_DOCUSHARE_TIMEOUT_SECONDS")? {
        docushare.timeout_seconds = val;
    }
    if let Some(val) = parse_value(&lookup, "DOCUDUMP_DOCUSHARE_RETRY_MAX_RETRIES")? {
        docushare.retry.max_retries = val;
    }

    // Export
    let export = &mut config.export;
    if let Some(val) = parse_value(&lookup, "DOCUDUMP_EXPORT_PARALLEL_DOWNLOADS")? {
        export.parallel_downloads = val;
    }
    if let Some(val) = parse_value(&lookup, "DOCUDUMP_EXPORT_MAX_DEPTH")? {
        export.max_depth = Some(val);
    }
    if let Some(val) = parse_value::<VersionPolicy, _>(&lookup, "DOCUDUMP_EXPORT_VERSION_POLICY")? {
        export.version_policy = val;
    }
    if let Some(val) = parse_value(&lookup, "DOCUDUMP_EXPORT_INFER_EXTENSIONS")? {
        export.infer_extensions = val;
    }
    if let Some(val) = parse_value(&lookup, "DOCUDUMP_EXPORT_EXPORT_LINKS")? {
        export.export_links = val;
    }
    if let Some(val) = parse_value(&lookup, "DOCUDUMP_EXPORT_PRESERVE_TIMESTAMPS")? {
        export.preserve_timestamps = val;
    }
    if let Some(val) = parse_value(&lookup, "DOCUDUMP_EXPORT_RESTRICT_PRIVATE")? {
        export.restrict_private = val;
    }
    if let Some(val) = lookup("DOCUDUMP_EXPORT_MAPPING_FILE") {
        export.mapping_file = Some(PathBuf::from(val));
    }
    if let Some(val) = parse_value(&lookup, "DOCUDUMP_EXPORT_DRY_RUN")? {
        export.dry_run = val;
    }

    // Logging
    if let Some(val) = parse_value(&lookup, "DOCUDUMP_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = lookup("DOCUDUMP_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = lookup("DOCUDUMP_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
