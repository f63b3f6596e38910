//! Document domain model
//!
//! A DocuShare document is a titled object with one or more versions. Each
//! version carries a single content rendition, which is what gets exported.

use super::ids::ObjectHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Stored content of a version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Rendition {
    /// File name the content is stored under in an export archive
    pub stored_name: Option<String>,

    /// File name the content was uploaded with
    pub original_name: Option<String>,

    /// Size in bytes as declared by the server
    pub size: Option<u64>,

    /// Rendition creation time
    pub created: Option<DateTime<Utc>>,
}

/// One version of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Version handle (`Version-<n>`)
    pub handle: ObjectHandle,

    /// Version number as assigned by DocuShare (0 when not reported)
    pub number: u32,

    /// Creation time of the version
    pub created: Option<DateTime<Utc>>,

    /// Content rendition, if the version has one
    pub rendition: Option<Rendition>,
}

impl Version {
    /// Create a version without a rendition
    pub fn new(handle: ObjectHandle, number: u32) -> Self {
        Self {
            handle,
            number,
            created: None,
            rendition: None,
        }
    }

    /// Set the creation time
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// Set the content rendition
    pub fn with_rendition(mut self, rendition: Rendition) -> Self {
        self.rendition = Some(rendition);
        self
    }

    /// Total order used to pick the latest version.
    ///
    /// Compares version number, then creation time, then the numeric handle,
    /// then the handle text. Missing values sort lowest.
    pub fn recency_cmp(&self, other: &Version) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.created.cmp(&other.created))
            .then_with(|| self.handle.number().cmp(&other.handle.number()))
            .then_with(|| self.handle.as_str().cmp(other.handle.as_str()))
    }

    /// Best known modification time for the exported file
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.created
            .or_else(|| self.rendition.as_ref().and_then(|r| r.created))
    }
}

/// Which version of a document to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VersionPolicy {
    /// Highest version by [`Version::recency_cmp`]
    #[default]
    Latest,
    /// The document's preferred version, falling back to the latest
    Preferred,
}

impl fmt::Display for VersionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionPolicy::Latest => write!(f, "latest"),
            VersionPolicy::Preferred => write!(f, "preferred"),
        }
    }
}

impl FromStr for VersionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "latest" => Ok(VersionPolicy::Latest),
            "preferred" => Ok(VersionPolicy::Preferred),
            other => Err(format!(
                "Invalid version policy '{other}'. Must be one of: latest, preferred"
            )),
        }
    }
}

/// A DocuShare document
///
/// # Examples
///
/// ```
/// use docudump::domain::document::{Document, Version};
/// use docudump::domain::ids::ObjectHandle;
///
/// let document = Document::builder()
///     .handle(ObjectHandle::new("Document-7").unwrap())
///     .title("Q1 Report")
///     .version(Version::new(ObjectHandle::new("Version-1").unwrap(), 1))
///     .version(Version::new(ObjectHandle::new("Version-2").unwrap(), 2))
///     .build()
///     .unwrap();
///
/// assert_eq!(document.latest_version().unwrap().number, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document handle (`Document-<n>`)
    pub handle: ObjectHandle,

    /// Document title, used as the output file name
    pub title: String,

    /// File name the document was first uploaded with
    pub original_file_name: Option<String>,

    /// Containing collection, when the export lists it
    pub parent: Option<ObjectHandle>,

    /// All known versions, in the order the source listed them
    pub versions: Vec<Version>,

    /// Version the document links as preferred
    pub preferred_version: Option<ObjectHandle>,

    /// Not readable by any of the site-wide groups
    #[serde(default)]
    pub private: bool,
}

impl Document {
    /// Creates a new builder for constructing a Document
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::default()
    }

    /// The most recent version, independent of listing order
    pub fn latest_version(&self) -> Option<&Version> {
        self.versions.iter().max_by(|a, b| a.recency_cmp(b))
    }

    /// The preferred version if it is one of this document's versions
    pub fn preferred(&self) -> Option<&Version> {
        let preferred = self.preferred_version.as_ref()?;
        self.versions.iter().find(|v| &v.handle == preferred)
    }

    /// Picks the version to export under the given policy
    pub fn select_version(&self, policy: VersionPolicy) -> Option<&Version> {
        match policy {
            VersionPolicy::Latest => self.latest_version(),
            VersionPolicy::Preferred => self.preferred().or_else(|| {
                if self.preferred_version.is_some() {
                    tracing::warn!(
                        handle = %self.handle,
                        "Preferred version is not among the document versions, using latest"
                    );
                }
                self.latest_version()
            }),
        }
    }
}

/// Builder for constructing Document instances
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    handle: Option<ObjectHandle>,
    title: Option<String>,
    original_file_name: Option<String>,
    parent: Option<ObjectHandle>,
    versions: Vec<Version>,
    preferred_version: Option<ObjectHandle>,
    private: bool,
}

impl DocumentBuilder {
    /// Creates a new DocumentBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document handle
    pub fn handle(mut self, handle: ObjectHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Sets the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the original upload file name
    pub fn original_file_name(mut self, name: impl Into<String>) -> Self {
        self.original_file_name = Some(name.into());
        self
    }

    /// Sets the containing collection
    pub fn parent(mut self, parent: ObjectHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Adds a version
    pub fn version(mut self, version: Version) -> Self {
        self.versions.push(version);
        self
    }

    /// Sets the preferred version handle
    pub fn preferred_version(mut self, handle: ObjectHandle) -> Self {
        self.preferred_version = Some(handle);
        self
    }

    /// Marks the document as private
    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Builds the Document
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is missing. A missing title falls back
    /// to the handle, as DocuShare does for untitled objects.
    pub fn build(self) -> Result<Document, String> {
        let handle = self.handle.ok_or("handle is required")?;
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| handle.to_string());

        Ok(Document {
            handle,
            title,
            original_file_name: self.original_file_name,
            parent: self.parent,
            versions: self.versions,
            preferred_version: self.preferred_version,
            private: self.private,
        })
    }
}
