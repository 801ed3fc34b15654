//! INI file configuration adapter.
//!
//! Section and key names are case-insensitive; values are returned as
//! written. A numeric value that fails to parse is an error rather than
//! a fallback to some default.

use crate::domain::error::AccrueError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_number(&self, section: &str, key: &str) -> Result<Option<f64>, AccrueError> {
        match self.config.getfloat(section, key) {
            Ok(Some(value)) if !value.is_finite() => Err(not_a(section, key, "finite number")),
            Ok(value) => Ok(value),
            Err(_) => Err(not_a(section, key, "number")),
        }
    }

    fn get_integer(&self, section: &str, key: &str) -> Result<Option<i64>, AccrueError> {
        self.config
            .getint(section, key)
            .map_err(|_| not_a(section, key, "integer"))
    }
}

fn not_a(section: &str, key: &str, kind: &str) -> AccrueError {
    AccrueError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("{key} is not a {kind}"),
    }
}
