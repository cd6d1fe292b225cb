use crate::config::storage::{read_optional, write_atomic};
use crate::utils::error::{GsError, Result};
use crate::utils::validation::{validate_path, validate_positive_number, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "settings.toml";
pub const DEFAULT_COURSE_DIR: &str = "courses";
pub const DEFAULT_EXTENSION_DAYS: u32 = 5;

/// Per-course metadata kept in the settings file. The roster lives in the course's
/// own file, see [`crate::config::course::CourseStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CourseMeta {
    pub gradescope_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Directory holding one `<identifier>.toml` per course. Relative paths are
    /// resolved against the settings file's directory.
    #[serde(default = "default_course_path")]
    pub course_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_course: Option<String>,

    /// Whether a newly configured course becomes the default.
    #[serde(default = "default_to_newest")]
    pub default_to_newest: bool,

    #[serde(default = "default_extension_days")]
    pub default_extension_days: u32,

    #[serde(default)]
    pub courses: BTreeMap<String, CourseMeta>,

    /// Keys this version does not know about, kept so hand edits survive a save.
    #[serde(flatten)]
    pub extra: toml::Table,
}

fn default_course_path() -> String {
    DEFAULT_COURSE_DIR.to_string()
}

fn default_to_newest() -> bool {
    true
}

fn default_extension_days() -> u32 {
    DEFAULT_EXTENSION_DAYS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            course_path: default_course_path(),
            default_course: None,
            default_to_newest: default_to_newest(),
            default_extension_days: default_extension_days(),
            courses: BTreeMap::new(),
            extra: toml::Table::new(),
        }
    }
}

impl Settings {
    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content).map_err(|e| GsError::ConfigError {
            message: format!("settings TOML parsing error: {}", e),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        // 先轉成 toml::Value，讓表格排在一般鍵值之後
        let document = toml::Value::try_from(self)?;
        Ok(toml::to_string_pretty(&document)?)
    }

    /// Adds or replaces a course and moves the default to it when no default is set
    /// or `default-to-newest` is on. Returns true when an existing entry was replaced.
    pub fn register_course(&mut self, identifier: &str, meta: CourseMeta) -> bool {
        let replaced = self.courses.insert(identifier.to_string(), meta).is_some();

        if self.default_course.is_none() {
            tracing::info!("No default course set, setting to {}", identifier);
            self.default_course = Some(identifier.to_string());
        } else if self.default_to_newest {
            tracing::info!("Setting {} as the default course", identifier);
            self.default_course = Some(identifier.to_string());
        }

        replaced
    }

    /// The course named on the command line, or the configured default.
    pub fn course_or_default<'a>(&'a self, requested: Option<&'a str>) -> Result<&'a str> {
        let identifier = requested
            .or(self.default_course.as_deref())
            .ok_or_else(|| GsError::MissingConfigError {
                field: "default-course".to_string(),
            })?;

        if !self.courses.contains_key(identifier) {
            return Err(GsError::CourseNotFoundError {
                identifier: identifier.to_string(),
            });
        }
        Ok(identifier)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_positive_number("default-extension-days", self.default_extension_days, 1)?;
        validate_path("course-path", &self.course_path)?;

        if let Some(default) = &self.default_course {
            if !self.courses.contains_key(default) {
                tracing::warn!(
                    "default-course '{}' is not listed under [courses]",
                    default
                );
            }
        }
        Ok(())
    }
}

/// The settings document on disk. Single process, single writer; concurrent
/// invocations race with last-writer-wins.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `settings.toml` next to the running executable.
    pub fn beside_executable() -> Result<Self> {
        let exe = std::env::current_exe()?;
        let dir = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::new(dir.join(SETTINGS_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the settings, falling back to defaults when the file is absent.
    pub fn load(&self) -> Result<Settings> {
        match read_optional(&self.path)? {
            Some(content) => {
                tracing::debug!("Loading settings from {}", self.path.display());
                Settings::from_toml_str(&content)
            }
            None => {
                tracing::info!(
                    "Settings file {} not found, using defaults",
                    self.path.display()
                );
                Ok(Settings::default())
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings.validate()?;
        let content = settings.to_toml_string()?;
        write_atomic(&self.path, content.as_bytes())
    }

    /// Absolute location of the course directory for `settings`.
    pub fn course_dir(&self, settings: &Settings) -> PathBuf {
        let course_path = Path::new(&settings.course_path);
        if course_path.is_absolute() {
            return course_path.to_path_buf();
        }
        match self.path.parent() {
            Some(parent) => parent.join(course_path),
            None => course_path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn meta(id: &str) -> CourseMeta {
        CourseMeta {
            gradescope_id: id.to_string(),
            name: None,
            term: None,
        }
    }

    #[test]
    fn test_parse_settings() {
        let toml_content = r#"
course-path = "/srv/gs/courses"
default-course = "cs101"
default-extension-days = 3

[courses.cs101]
gradescope-id = "123456"
name = "CS 101"
term = "Fall 2024"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();

        assert_eq!(settings.course_path, "/srv/gs/courses");
        assert_eq!(settings.default_course.as_deref(), Some("cs101"));
        assert_eq!(settings.default_extension_days, 3);
        assert!(settings.default_to_newest);
        assert_eq!(settings.courses["cs101"].gradescope_id, "123456");
        assert!(settings.extra.is_empty());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_zero_extension_days_is_rejected() {
        let err = Settings::from_toml_str("default-extension-days = 0").unwrap_err();
        assert!(matches!(err, GsError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = Settings::from_toml_str("default-extension-days = [").unwrap_err();
        assert!(matches!(err, GsError::ConfigError { .. }));
    }

    #[test]
    fn test_unknown_keys_are_preserved() {
        let toml_content = r#"
default-extension-days = 2
editor = "vim"

[notes]
owner = "head TA"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert_eq!(settings.extra["editor"].as_str(), Some("vim"));

        let reparsed = Settings::from_toml_str(&settings.to_toml_string().unwrap()).unwrap();
        assert_eq!(reparsed, settings);
        assert_eq!(
            reparsed.extra["notes"]
                .as_table()
                .and_then(|t| t["owner"].as_str()),
            Some("head TA")
        );
    }

    #[test]
    fn test_register_course_sets_default() {
        let mut settings = Settings::default();

        assert!(!settings.register_course("cs101", meta("1")));
        assert_eq!(settings.default_course.as_deref(), Some("cs101"));

        settings.default_to_newest = false;
        assert!(!settings.register_course("cs202", meta("2")));
        assert_eq!(settings.default_course.as_deref(), Some("cs101"));

        settings.default_to_newest = true;
        assert!(settings.register_course("cs202", meta("3")));
        assert_eq!(settings.default_course.as_deref(), Some("cs202"));
        assert_eq!(settings.courses["cs202"].gradescope_id, "3");
    }

    #[test]
    fn test_course_or_default() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.course_or_default(None),
            Err(GsError::MissingConfigError { .. })
        ));

        settings.register_course("cs101", meta("1"));
        assert_eq!(settings.course_or_default(None).unwrap(), "cs101");
        assert!(matches!(
            settings.course_or_default(Some("cs999")),
            Err(GsError::CourseNotFoundError { .. })
        ));
    }

    #[test]
    fn test_store_falls_back_to_defaults_when_absent() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join(SETTINGS_FILE_NAME));

        assert!(!store.path().exists());
        assert_eq!(store.load().unwrap(), Settings::default());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_course_dir_is_relative_to_settings() {
        let store = SettingsStore::new("/opt/gs-tools/settings.toml");
        let settings = Settings::default();
        assert_eq!(
            store.course_dir(&settings),
            PathBuf::from("/opt/gs-tools/courses")
        );
    }
}
