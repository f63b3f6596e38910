//! Configuration schema types
//!
//! This module defines the configuration structure for docudump.

use crate::config::SecretString;
use crate::domain::VersionPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where collection listings and content are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A live DocuShare server
    #[default]
    Http,
    /// An on-disk DocuShare export directory
    Archive,
}

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main docudump configuration
///
/// This is the root configuration structure that maps to the TOML file. Every
/// section has defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DumpConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// DocuShare source configuration
    #[serde(default)]
    pub docushare: DocuShareConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DumpConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending key if any value is invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.docushare.validate(&self.environment)?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid application.log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries > 10 {
            return Err(format!(
                "docushare.retry.max_retries must be <= 10, got {}",
                self.max_retries
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "docushare.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(format!(
                "docushare.retry.initial_delay_ms ({}) must not exceed max_delay_ms ({})",
                self.initial_delay_ms, self.max_delay_ms
            ));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// DocuShare source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocuShareConfig {
    /// Source implementation (http or archive)
    #[serde(default)]
    pub source: SourceKind,

    /// Base URL of the DocuShare server, e.g. `https://docushare.example.com/docushare`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Export directory read by the archive source
    #[serde(default)]
    pub archive_path: Option<PathBuf>,

    /// Authentication type (basic or none); anonymous by default
    #[serde(default = "default_auth_type")]
    pub auth_type: String,

    /// Username for authentication (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Password for authentication (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// TLS certificate verification enabled
    ///
    /// **SECURITY WARNING**: Disabling TLS verification exposes the export to
    /// man-in-the-middle attacks. It is rejected in production; use `tls_ca_cert`
    /// for self-signed certificates instead.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Optional PEM CA certificate path for custom/self-signed certificates
    #[serde(default)]
    pub tls_ca_cert: Option<PathBuf>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl DocuShareConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        use secrecy::ExposeSecret;

        match self.source {
            SourceKind::Archive => {
                // Only required once an export or tree actually runs against the
                // archive; the CLI can supply it per invocation.
                if let Some(ref path) = self.archive_path {
                    if path.as_os_str().is_empty() {
                        return Err("docushare.archive_path cannot be empty".to_string());
                    }
                }
            }
            SourceKind::Http => {
                if self.base_url.is_empty() {
                    return Err("docushare.base_url cannot be empty".to_string());
                }

                if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://")
                {
                    return Err(
                        "docushare.base_url must start with http:// or https://".to_string()
                    );
                }

                url::Url::parse(&self.base_url)
                    .map_err(|e| format!("docushare.base_url is not a valid URL: {e}"))?;
            }
        }

        let valid_auth_types = ["basic", "none"];
        if !valid_auth_types.contains(&self.auth_type.as_str()) {
            return Err(format!(
                "Invalid docushare.auth_type '{}'. Must be one of: {}",
                self.auth_type,
                valid_auth_types.join(", ")
            ));
        }

        if self.source == SourceKind::Http && self.auth_type == "basic" {
            if self.username.as_ref().map(|s| s.is_empty()).unwrap_or(true) {
                return Err(
                    "docushare.username cannot be empty when auth_type is 'basic'".to_string()
                );
            }

            if self
                .password
                .as_ref()
                .map(|s| s.expose_secret().is_empty())
                .unwrap_or(true)
            {
                return Err(
                    "docushare.password cannot be empty when auth_type is 'basic'".to_string()
                );
            }
        }

        if self.timeout_seconds == 0 {
            return Err("docushare.timeout_seconds must be > 0".to_string());
        }

        // TLS verification is mandatory in production
        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments. \
                Either set 'docushare.tls_verify = true' or provide a custom CA certificate using \
                'docushare.tls_ca_cert'. For development/testing, set 'environment = \"development\"'."
                    .to_string(),
            );
        }

        self.retry.validate()?;
        Ok(())
    }

    /// True when requests carry Basic credentials
    pub fn uses_basic_auth(&self) -> bool {
        self.auth_type == "basic" && self.username.is_some() && self.password.is_some()
    }
}

impl Default for DocuShareConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            base_url: default_base_url(),
            archive_path: None,
            auth_type: default_auth_type(),
            username: None,
            password: None,
            tls_verify: true,
            tls_ca_cert: None,
            timeout_seconds: default_timeout_seconds(),
            retry: RetryConfig::default(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Maximum number of concurrent content downloads
    #[serde(default = "default_parallel_downloads")]
    pub parallel_downloads: usize,

    /// Deepest folder level descended into (root is depth 0); unlimited when unset or 0
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Which version of each document is exported
    #[serde(default)]
    pub version_policy: VersionPolicy,

    /// Append the uploaded file's extension to titles without one
    #[serde(default = "default_true")]
    pub infer_extensions: bool,

    /// Write DocuShare URL objects as `<title>.txt`
    #[serde(default = "default_true")]
    pub export_links: bool,

    /// Set file modification times from the version creation time
    #[serde(default = "default_true")]
    pub preserve_timestamps: bool,

    /// Make private objects readable by the owner only (0600 files, 0700
    /// directories); everything else gets 0644 and 0755. Unix only.
    #[serde(default = "default_true")]
    pub restrict_private: bool,

    /// CSV file mapping each exported handle to its relative path
    #[serde(default)]
    pub mapping_file: Option<PathBuf>,

    /// Plan and report without downloading or writing
    #[serde(default)]
    pub dry_run: bool,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if !(1..=64).contains(&self.parallel_downloads) {
            return Err(format!(
                "export.parallel_downloads must be between 1 and 64, got {}",
                self.parallel_downloads
            ));
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            parallel_downloads: default_parallel_downloads(),
            max_depth: None,
            version_policy: VersionPolicy::default(),
            infer_extensions: true,
            export_links: true,
            preserve_timestamps: true,
            restrict_private: true,
            mapping_file: None,
            dry_run: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to rolling files
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080/docushare".to_string()
}

fn default_auth_type() -> String {
    "none".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_parallel_downloads() -> usize {
    4
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn http_config() -> DocuShareConfig {
        DocuShareConfig {
            auth_type: "basic".to_string(),
            username: Some("exporter".to_string()),
            password: Some(secret_string("secret".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = DumpConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.export.parallel_downloads, 4);
        assert!(config.export.infer_extensions);
        assert!(config.export.restrict_private);
        assert_eq!(config.docushare.source, SourceKind::Http);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: DumpConfig = toml::from_str("").unwrap();
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.docushare.base_url, "http://localhost:8080/docushare");
        let config: DumpConfig = toml::from_str("[docushare]\n").unwrap();
        assert_eq!(config.docushare.auth_type, "none");
    }

    #[test]
    fn test_basic_auth_requires_credentials() {
        let config = DocuShareConfig {
            auth_type: "basic".to_string(),
            ..Default::default()
        };
        let err = config.validate(&Environment::Development).unwrap_err();
        assert!(err.contains("docushare.username"));

        assert!(http_config().validate(&Environment::Development).is_ok());
        assert!(http_config().uses_basic_auth());
    }

    #[test]
    fn test_archive_source_skips_credentials() {
        let config = DocuShareConfig {
            source: SourceKind::Archive,
            auth_type: "basic".to_string(),
            archive_path: Some(PathBuf::from("/srv/dsexport")),
            ..Default::default()
        };
        assert!(config.validate(&Environment::Development).is_ok());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = DocuShareConfig {
            base_url: "ftp://docushare".to_string(),
            ..Default::default()
        };
        let err = config.validate(&Environment::Development).unwrap_err();
        assert!(err.contains("docushare.base_url"));
    }

    #[test]
    fn test_tls_verify_enforced_in_production() {
        let config = DocuShareConfig {
            tls_verify: false,
            ..http_config()
        };
        assert!(config.validate(&Environment::Development).is_ok());
        let err = config.validate(&Environment::Production).unwrap_err();
        assert!(err.contains("TLS certificate verification"));
    }

    #[test]
    fn test_parallel_downloads_range() {
        let mut export = ExportConfig {
            parallel_downloads: 0,
            ..Default::default()
        };
        assert!(export.validate().is_err());
        export.parallel_downloads = 65;
        assert!(export.validate().is_err());
        export.parallel_downloads = 64;
        assert!(export.validate().is_ok());
    }

    #[test]
    fn test_invalid_rotation_and_log_level() {
        let logging = LoggingConfig {
            local_rotation: "size".to_string(),
            ..Default::default()
        };
        assert!(logging.validate().unwrap_err().contains("local_rotation"));

        let app = ApplicationConfig {
            log_level: "verbose".to_string(),
        };
        assert!(app.validate().unwrap_err().contains("application.log_level"));
    }

    #[test]
    fn test_retry_validation() {
        let retry = RetryConfig {
            backoff_multiplier: 0.5,
            ..Default::default()
        };
        assert!(retry.validate().is_err());

        let retry = RetryConfig {
            initial_delay_ms: 60_000,
            ..Default::default()
        };
        assert!(retry.validate().is_err());
    }

    #[test]
    fn test_version_policy_from_toml() {
        let config: DumpConfig = toml::from_str(
            r#"
[export]
version_policy = "preferred"
max_depth = 3
"#,
        )
        .unwrap();
        assert_eq!(config.export.version_policy, VersionPolicy::Preferred);
        assert_eq!(config.export.max_depth, Some(3));
    }
}
