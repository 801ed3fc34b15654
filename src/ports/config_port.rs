//! Configuration access port trait.

use crate::domain::error::AccrueError;

/// Read-only access to sectioned `key = value` configuration.
///
/// Numeric getters return `Ok(None)` for an absent key and
/// [`AccrueError::ConfigInvalid`] for a present value that does not parse,
/// so a typo never silently becomes a default.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_number(&self, section: &str, key: &str) -> Result<Option<f64>, AccrueError>;
    fn get_integer(&self, section: &str, key: &str) -> Result<Option<i64>, AccrueError>;
}
