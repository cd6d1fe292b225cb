use crate::config::storage::{read_optional, write_atomic};
use crate::domain::model::RosterEntry;
use crate::utils::error::{GsError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything cached locally for one configured course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CourseRecord {
    pub gradescope_id: String,
    #[serde(default)]
    pub roster: Vec<RosterEntry>,
}

impl CourseRecord {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GsError::ConfigError {
            message: format!("course TOML parsing error: {}", e),
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// `<course-path>/<identifier>.toml` files.
#[derive(Debug, Clone)]
pub struct CourseStore {
    dir: PathBuf,
}

impl CourseStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, identifier: &str) -> PathBuf {
        self.dir.join(format!("{}.toml", identifier))
    }

    pub fn load(&self, identifier: &str) -> Result<CourseRecord> {
        let path = self.path_for(identifier);
        tracing::debug!("Loading course file {}", path.display());
        match read_optional(&path)? {
            Some(content) => CourseRecord::from_toml_str(&content),
            None => Err(GsError::CourseNotFoundError {
                identifier: identifier.to_string(),
            }),
        }
    }

    pub fn save(&self, identifier: &str, record: &CourseRecord) -> Result<()> {
        let content = record.to_toml_string()?;
        write_atomic(&self.path_for(identifier), content.as_bytes())
    }
}
