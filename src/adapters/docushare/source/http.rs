//! DocuShare HTTP source
//!
//! Lists a collection through the server's export endpoint
//! (`GET {base_url}/dsweb/Export/{handle}`, which returns the same XML that
//! `dsexport` writes) and downloads content with `GET {base_url}/dsweb/Get/{version}`.

use super::DocumentSource;
use crate::adapters::docushare::xml::parse_export;
use crate::config::{basic_auth_header, secret_string, DocuShareConfig, RetryConfig, SecretString};
use crate::domain::collection::CollectionTree;
use crate::domain::document::Version;
use crate::domain::ids::{CollectionId, ObjectHandle};
use crate::domain::{DumpError, Result, SourceError};
use crate::log_retry_attempt;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::{Certificate, Client, ClientBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;

/// What a request was for, so a 404 maps to the right error
#[derive(Debug, Clone, Copy)]
enum Target {
    Collection,
    Content,
}

/// DocuShare server source
///
/// # Example
///
/// ```no_run
/// use docudump::adapters::docushare::source::{DocumentSource, HttpSource};
/// use docudump::config::DocuShareConfig;
///
/// # async fn example() -> docudump::domain::Result<()> {
/// let config = DocuShareConfig {
///     base_url: "https://docushare.example.com/docushare".to_string(),
///     ..Default::default()
/// };
/// let mut source = HttpSource::new(config)?;
/// source.authenticate().await?;
/// # Ok(())
/// # }
/// ```
pub struct HttpSource {
    /// Base URL without a trailing slash
    base_url: String,

    /// HTTP client for making requests
    client: Client,

    /// `Authorization` header value, once authenticated with Basic credentials
    auth_header: Option<SecretString>,

    /// DocuShare configuration
    config: DocuShareConfig,
}

impl HttpSource {
    /// Create a new HTTP source
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::Configuration`] if the CA certificate cannot be read
    /// or the HTTP client cannot be built.
    pub fn new(config: DocuShareConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification is disabled");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        if let Some(ref ca_path) = config.tls_ca_cert {
            let pem = std::fs::read(ca_path).map_err(|e| {
                DumpError::Configuration(format!(
                    "Failed to read CA certificate {}: {e}",
                    ca_path.display()
                ))
            })?;
            let certificate = Certificate::from_pem(&pem).map_err(|e| {
                DumpError::Configuration(format!(
                    "Invalid CA certificate {}: {e}",
                    ca_path.display()
                ))
            })?;
            client_builder = client_builder.add_root_certificate(certificate);
        }

        let client = client_builder
            .build()
            .map_err(|e| DumpError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            client,
            auth_header: None,
            config,
        })
    }

    fn export_url(&self, handle: &ObjectHandle) -> String {
        format!("{}/dsweb/Export/{}", self.base_url, handle)
    }

    fn content_url(&self, version: &ObjectHandle) -> String {
        format!("{}/dsweb/Get/{}", self.base_url, version)
    }

    async fn get(&self, url: &str, target: Target, subject: &str) -> Result<Response> {
        let mut request = self.client.get(url);
        if let Some(ref auth) = self.auth_header {
            let value: &str = auth.expose_secret().as_ref();
            request = request.header(AUTHORIZATION, value);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(status_error(response, target, subject).await)
    }

    /// Retry a request with exponential backoff
    ///
    /// Only transient failures are retried; everything else returns at once.
    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_attempts = self.config.retry.max_retries.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    let retryable = matches!(&e, DumpError::Source(s) if s.is_retryable());
                    if !retryable || attempt >= max_attempts {
                        return Err(e);
                    }

                    let delay = backoff_delay(&self.config.retry, attempt);
                    log_retry_attempt!(attempt, max_attempts, delay.as_millis() as u64, e);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Delay before retry number `attempt` (1-based)
pub fn backoff_delay(retry: &RetryConfig, attempt: usize) -> Duration {
    let exponent = attempt.saturating_sub(1).min(32) as i32;
    let delay = retry.initial_delay_ms as f64 * retry.backoff_multiplier.powi(exponent);
    let capped = delay.min(retry.max_delay_ms as f64).max(0.0);
    Duration::from_millis(capped as u64)
}

fn map_transport_error(err: reqwest::Error) -> DumpError {
    let source = if err.is_timeout() {
        SourceError::Timeout(err.to_string())
    } else {
        SourceError::ConnectionFailed(err.to_string())
    };
    DumpError::Source(source)
}

async fn status_error(response: Response, target: Target, subject: &str) -> DumpError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        subject.to_string()
    } else {
        format!("{subject}: {}", body.trim())
    };

    match status {
        StatusCode::NOT_FOUND => match target {
            Target::Collection => DumpError::NotFound(format!("collection {subject}")),
            Target::Content => DumpError::Source(SourceError::ContentNotFound(subject.to_string())),
        },
        StatusCode::UNAUTHORIZED => DumpError::Source(SourceError::AuthenticationFailed(
            format!("{status} for {subject}"),
        )),
        StatusCode::FORBIDDEN => match target {
            // An unreadable collection is indistinguishable from a missing one
            Target::Collection => {
                DumpError::NotFound(format!("collection {subject} is not accessible"))
            }
            Target::Content => DumpError::Source(SourceError::ClientError {
                status: status.as_u16(),
                message,
            }),
        },
        StatusCode::TOO_MANY_REQUESTS => DumpError::Source(SourceError::RateLimitExceeded(
            retry_after.unwrap_or_else(|| "unspecified".to_string()),
        )),
        s if s.is_server_error() => DumpError::Source(SourceError::ServerError {
            status: s.as_u16(),
            message,
        }),
        s if s.is_client_error() => DumpError::Source(SourceError::ClientError {
            status: s.as_u16(),
            message,
        }),
        s => DumpError::Source(SourceError::InvalidResponse(format!(
            "unexpected status {s} for {subject}"
        ))),
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn authenticate(&mut self) -> Result<()> {
        if self.config.uses_basic_auth() {
            if let (Some(username), Some(password)) =
                (&self.config.username, &self.config.password)
            {
                self.auth_header = Some(secret_string(basic_auth_header(username, password)));
                tracing::info!(username = %username, "Using Basic Authentication for DocuShare");
            }
            return Ok(());
        }

        if self.config.auth_type == "basic" {
            return Err(DumpError::Source(SourceError::AuthenticationFailed(
                "auth_type is 'basic' but no username/password is configured".to_string(),
            )));
        }

        tracing::info!("No authentication configured, using anonymous access");
        Ok(())
    }

    async fn fetch_collection(&self, collection: &CollectionId) -> Result<CollectionTree> {
        let url = self.export_url(collection.handle());
        tracing::info!(url = %url, collection_id = %collection, "Fetching collection listing");

        let body = self
            .retry_request(|| async {
                let response = self
                    .get(&url, Target::Collection, collection.as_str())
                    .await?;
                response.text().await.map_err(|e| {
                    DumpError::Source(SourceError::InvalidResponse(format!(
                        "Failed to read listing for {collection}: {e}"
                    )))
                })
            })
            .await?;

        let objects = parse_export(&body)?;
        let tree = CollectionTree::from_objects(collection, objects)?;

        tracing::info!(
            collection_id = %collection,
            folders = tree.folder_count(),
            documents = tree.document_count(),
            "Fetched collection listing"
        );
        Ok(tree)
    }

    async fn fetch_content(&self, document: &ObjectHandle, version: &Version) -> Result<Vec<u8>> {
        let url = self.content_url(&version.handle);
        let subject = format!("{document} ({})", version.handle);
        tracing::debug!(url = %url, handle = %document, version = %version.handle, "Fetching content");

        self.retry_request(|| async {
            let response = self.get(&url, Target::Content, &subject).await?;
            let bytes = response.bytes().await.map_err(map_transport_error)?;
            Ok(bytes.to_vec())
        })
        .await
    }

    fn is_authenticated(&self) -> bool {
        self.auth_header.is_some()
    }

    fn location(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_source_creation() {
        let source = HttpSource::new(DocuShareConfig::default()).unwrap();
        assert!(!source.is_authenticated());
        assert_eq!(source.location(), "http://localhost:8080/docushare");
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let config = DocuShareConfig {
            base_url: "https://ds.example.com/docushare/".to_string(),
            ..Default::default()
        };
        let source = HttpSource::new(config).unwrap();
        let handle = ObjectHandle::new("Collection-42").unwrap();
        assert_eq!(
            source.export_url(&handle),
            "https://ds.example.com/docushare/dsweb/Export/Collection-42"
        );
        let version = ObjectHandle::new("Version-9").unwrap();
        assert_eq!(
            source.content_url(&version),
            "https://ds.example.com/docushare/dsweb/Get/Version-9"
        );
    }

    #[test]
    fn test_missing_ca_certificate_is_configuration_error() {
        let config = DocuShareConfig {
            tls_ca_cert: Some("/nonexistent/ca.pem".into()),
            ..Default::default()
        };
        assert!(matches!(
            HttpSource::new(config),
            Err(DumpError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_with_basic_credentials() {
        let config = DocuShareConfig {
            auth_type: "basic".to_string(),
            username: Some("exporter".to_string()),
            password: Some(secret_string("secret".to_string())),
            ..Default::default()
        };
        let mut source = HttpSource::new(config).unwrap();
        source.authenticate().await.unwrap();
        assert!(source.is_authenticated());
    }

    #[tokio::test]
    async fn test_authenticate_basic_without_credentials_fails() {
        let config = DocuShareConfig {
            auth_type: "basic".to_string(),
            ..Default::default()
        };
        let mut source = HttpSource::new(config).unwrap();
        let err = source.authenticate().await.unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_backoff_delay_grows_and_caps() {
        let retry = RetryConfig {
            max_retries: 5,
            initial_delay_ms: 100,
            max_delay_ms: 350,
            backoff_multiplier: 2.0,
        };
        assert_eq!(backoff_delay(&retry, 1), Duration::from_millis(100));
        assert_eq!(backoff_delay(&retry, 2), Duration::from_millis(200));
        assert_eq!(backoff_delay(&retry, 3), Duration::from_millis(350));
        assert_eq!(backoff_delay(&retry, 30), Duration::from_millis(350));
    }
}
