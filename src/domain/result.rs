//! Result type alias for docudump

use super::errors::DumpError;

/// Result type alias for docudump operations
///
/// # Examples
///
/// ```
/// use docudump::domain::result::Result;
/// use docudump::domain::errors::DumpError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(DumpError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, DumpError>;
