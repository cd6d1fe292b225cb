use anyhow::Result;
use gs_tools::config::{CourseMeta, SettingsStore};
use tempfile::TempDir;

const HAND_WRITTEN: &str = r#"
course-path = "terms/fall"
default-course = "cs101"
default-to-newest = false
default-extension-days = 3
editor = "vim"

[courses.cs101]
gradescope-id = "482910"
name = "CS 101"

[courses.cs201]
gradescope-id = "482911"

[notifications]
slack = false
"#;

#[test]
fn test_save_of_load_is_idempotent() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, HAND_WRITTEN)?;
    let store = SettingsStore::new(&path);

    let first = store.load()?;
    store.save(&first)?;
    let written_once = std::fs::read_to_string(&path)?;

    let second = store.load()?;
    store.save(&second)?;
    let written_twice = std::fs::read_to_string(&path)?;

    assert_eq!(first, second);
    assert_eq!(written_once, written_twice);
    assert!(written_once.contains("editor = \"vim\""));
    assert!(written_once.contains("[notifications]"));
    assert_eq!(store.course_dir(&second), dir.path().join("terms/fall"));
    Ok(())
}

#[test]
fn test_registering_keeps_default_when_not_newest() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, HAND_WRITTEN)?;
    let store = SettingsStore::new(&path);

    let mut settings = store.load()?;
    let replaced = settings.register_course(
        "cs301",
        CourseMeta {
            gradescope_id: "9".to_string(),
            name: None,
            term: None,
        },
    );
    store.save(&settings)?;

    let reloaded = store.load()?;
    assert!(!replaced);
    assert_eq!(reloaded.default_course.as_deref(), Some("cs101"));
    assert_eq!(reloaded.courses.len(), 3);
    assert_eq!(reloaded.default_extension_days, 3);
    Ok(())
}
