//! External system integrations for docudump.
//!
//! - [`docushare`] - DocuShare server and export archive access
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind the
//! [`DocumentSource`](docushare::DocumentSource) trait so the exporter can be
//! tested against in-memory sources.
//!
//! ```rust,no_run
//! use docudump::adapters::docushare::DocuShareClient;
//! use docudump::config::{secret_string, DocuShareConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DocuShareConfig {
//!     base_url: "https://docushare.example.com/docushare".to_string(),
//!     auth_type: "basic".to_string(),
//!     username: Some("exporter".to_string()),
//!     password: Some(secret_string("pass".to_string())),
//!     ..Default::default()
//! };
//!
//! let client = DocuShareClient::new(config).await?;
//! # Ok(())
//! # }
//! ```

pub mod docushare;
