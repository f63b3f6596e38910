//! Domain identifier types with validation
//!
//! DocuShare addresses every object by a handle of the form `<Class>-<number>`,
//! for example `Collection-42`, `Document-7` or `Version-9`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DocuShare object handle newtype wrapper
///
/// # Examples
///
/// ```
/// use docudump::domain::ids::ObjectHandle;
/// use std::str::FromStr;
///
/// let handle = ObjectHandle::from_str("Document-7").unwrap();
/// assert_eq!(handle.class_name(), "Document");
/// assert_eq!(handle.number(), Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHandle(String);

impl ObjectHandle {
    /// Creates a new handle, rejecting empty strings and strings without a class prefix
    pub fn new(handle: impl Into<String>) -> Result<Self, String> {
        let handle = handle.into().trim().to_string();
        if handle.is_empty() {
            return Err("Object handle cannot be empty".to_string());
        }

        match handle.split_once('-') {
            Some((class, rest)) if !class.is_empty() && !rest.is_empty() => Ok(Self(handle)),
            _ => Err(format!(
                "Invalid object handle format. Expected format: {{Class}}-{{number}}, got: {handle}"
            )),
        }
    }

    /// Returns the handle as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Object class, the part before the first `-`
    pub fn class_name(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    /// Numeric part of the handle, if it is numeric
    pub fn number(&self) -> Option<u64> {
        self.0
            .split_once('-')
            .and_then(|(_, number)| number.parse().ok())
    }

    /// True for `Collection-*` handles
    pub fn is_collection(&self) -> bool {
        self.class_name() == "Collection"
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectHandle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ObjectHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of the collection to export
///
/// Accepts either the bare number the DocuShare UI shows (`42`) or the full
/// handle (`Collection-42`) and always stores the full handle.
///
/// # Examples
///
/// ```
/// use docudump::domain::ids::CollectionId;
///
/// let id = CollectionId::parse("42").unwrap();
/// assert_eq!(id.as_str(), "Collection-42");
/// assert_eq!(CollectionId::parse("Collection-42").unwrap(), id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionId(ObjectHandle);

impl CollectionId {
    /// Parses user input into a collection handle
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err("Collection ID cannot be empty".to_string());
        }

        if input.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Self(ObjectHandle::new(format!("Collection-{input}"))?));
        }

        let handle = ObjectHandle::new(input)?;
        if !handle.is_collection() {
            return Err(format!(
                "Collection ID must be a number or a Collection handle, got: {input}"
            ));
        }
        Ok(Self(handle))
    }

    /// Returns the collection handle
    pub fn handle(&self) -> &ObjectHandle {
        &self.0
    }

    /// Returns the collection handle as a string slice
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CollectionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_handle_valid() {
        let handle = ObjectHandle::new("Version-123").unwrap();
        assert_eq!(handle.as_str(), "Version-123");
        assert_eq!(handle.class_name(), "Version");
        assert_eq!(handle.number(), Some(123));
        assert!(!handle.is_collection());
    }

    #[test]
    fn test_object_handle_trims_whitespace() {
        let handle = ObjectHandle::new("  Collection-5\n").unwrap();
        assert_eq!(handle.as_str(), "Collection-5");
        assert!(handle.is_collection());
    }

    #[test]
    fn test_object_handle_invalid() {
        assert!(ObjectHandle::new("").is_err());
        assert!(ObjectHandle::new("Document").is_err());
        assert!(ObjectHandle::new("-7").is_err());
        assert!(ObjectHandle::new("Document-").is_err());
    }

    #[test]
    fn test_object_handle_non_numeric_suffix() {
        let handle = ObjectHandle::new("User-abc").unwrap();
        assert_eq!(handle.number(), None);
    }

    #[test]
    fn test_collection_id_from_number() {
        let id = CollectionId::parse("42").unwrap();
        assert_eq!(id.as_str(), "Collection-42");
        assert_eq!(id.handle().number(), Some(42));
    }

    #[test]
    fn test_collection_id_from_handle() {
        let id = CollectionId::from_str("Collection-42").unwrap();
        assert_eq!(id.to_string(), "Collection-42");
    }

    #[test]
    fn test_collection_id_rejects_other_classes() {
        assert!(CollectionId::parse("Document-42").is_err());
        assert!(CollectionId::parse("").is_err());
        assert!(CollectionId::parse("forty-two").is_err());
    }

    #[test]
    fn test_object_handle_serialization() {
        let handle = ObjectHandle::new("Document-7").unwrap();
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, "\"Document-7\"");
        let back: ObjectHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, handle);
    }
}
