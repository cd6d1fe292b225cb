use async_trait::async_trait;
use gs_tools::app::ExtendRun;
use gs_tools::config::{CourseMeta, CourseRecord, CourseStore, ExtendArgs, Settings};
use gs_tools::domain::model::{Assignment, Credentials, ExtensionLength, RosterEntry};
use gs_tools::domain::ports::{AuthClient, ExtensionTarget, Prompter};
use gs_tools::{GsError, Result};
use std::collections::VecDeque;
use std::sync::Mutex;
use tempfile::TempDir;

/// 記錄所有呼叫的假 Gradescope
#[derive(Default)]
struct FakeGrading {
    logins: usize,
    calls: Mutex<Vec<(String, String, ExtensionLength)>>,
}

#[async_trait]
impl AuthClient for FakeGrading {
    fn service(&self) -> &str {
        "Gradescope"
    }

    async fn authenticate(&mut self, _credentials: &Credentials) -> Result<()> {
        self.logins += 1;
        Ok(())
    }
}

#[async_trait]
impl ExtensionTarget for FakeGrading {
    async fn list_assignments(&self, course_id: &str) -> Result<Vec<Assignment>> {
        assert_eq!(course_id, "1");
        Ok(vec![
            Assignment::new("11", "hw1"),
            Assignment::new("12", "hw1-makeup"),
            Assignment::new("13", "hw2"),
        ])
    }

    async fn apply_extension(
        &self,
        _course_id: &str,
        assignment: &Assignment,
        student_email: &str,
        length: ExtensionLength,
    ) -> Result<()> {
        self.calls.lock().unwrap().push((
            student_email.to_string(),
            assignment.title.clone(),
            length,
        ));
        Ok(())
    }
}

struct ScriptedPrompter {
    answers: VecDeque<String>,
}

impl Prompter for ScriptedPrompter {
    fn say(&mut self, _message: &str) {}

    fn read_line(&mut self, _prompt: &str) -> Result<String> {
        self.answers.pop_front().ok_or_else(|| GsError::PromptError {
            message: "script exhausted".to_string(),
        })
    }
}

struct Fixture {
    _dir: TempDir,
    settings: Settings,
    courses: CourseStore,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let courses = CourseStore::new(dir.path().join("courses"));
    courses
        .save(
            "cs101",
            &CourseRecord {
                gradescope_id: "1".to_string(),
                roster: vec![
                    RosterEntry::new("Jane Doe", "jane@school.edu"),
                    RosterEntry::new("John Smith", "john@school.edu"),
                    RosterEntry::new("Ann Lee", "ann@school.edu"),
                ],
            },
        )
        .unwrap();

    let mut settings = Settings::default();
    settings.register_course(
        "cs101",
        CourseMeta {
            gradescope_id: "1".to_string(),
            name: Some("CS 101".to_string()),
            term: None,
        },
    );

    Fixture {
        _dir: dir,
        settings,
        courses,
    }
}

fn args(names: &[&str], assignments: &[&str], days: Option<u32>) -> ExtendArgs {
    ExtendArgs {
        names: names.iter().map(|s| s.to_string()).collect(),
        assignments: assignments.iter().map(|s| s.to_string()).collect(),
        days,
        until: None,
        course: None,
        interactive: false,
        dry_run: false,
    }
}

fn credentials() -> Credentials {
    Credentials {
        email: "ta@school.edu".to_string(),
        password: "secret".to_string(),
    }
}

#[tokio::test]
async fn test_single_student_single_assignment() {
    let fx = fixture();
    let args = args(&["Jane Doe"], &["hw1"], Some(2));
    let mut grading = FakeGrading::default();

    let report = ExtendRun::new(&fx.settings, &fx.courses, &args)
        .execute(&mut grading, &credentials(), None)
        .await
        .unwrap();

    let calls = grading.calls.lock().unwrap();
    assert_eq!(
        *calls,
        vec![(
            "jane@school.edu".to_string(),
            "hw1".to_string(),
            ExtensionLength::Days(2)
        )]
    );
    assert_eq!(report.applied_count(), 1);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_unresolved_student_does_not_block_others() {
    let fx = fixture();
    let args = args(
        &["Jane Doe", "john@school.edu", "Nobody Here"],
        &["hw1", "hw2"],
        None,
    );
    let mut grading = FakeGrading::default();

    let report = ExtendRun::new(&fx.settings, &fx.courses, &args)
        .execute(&mut grading, &credentials(), None)
        .await
        .unwrap();

    assert_eq!(report.applied_count(), 4);
    assert_eq!(report.unresolved_count(), 1);
    // 未指定天數時使用預設值
    assert!(grading
        .calls
        .lock()
        .unwrap()
        .iter()
        .all(|(_, _, length)| *length == ExtensionLength::Days(5)));
}

#[tokio::test]
async fn test_dry_run_applies_nothing() {
    let fx = fixture();
    let mut args = args(&["Jane Doe", "Ann Lee"], &["hw"], Some(1));
    args.dry_run = true;
    let mut grading = FakeGrading::default();

    let report = ExtendRun::new(&fx.settings, &fx.courses, &args)
        .execute(&mut grading, &credentials(), None)
        .await
        .unwrap();

    assert!(grading.calls.lock().unwrap().is_empty());
    assert_eq!(report.planned_count(), 6);
    assert!(report.render().contains("dry run"));
}

#[tokio::test]
async fn test_no_resolved_students_skips_login() {
    let fx = fixture();
    let args = args(&["Nobody Here"], &["hw1"], Some(1));
    let mut grading = FakeGrading::default();

    let report = ExtendRun::new(&fx.settings, &fx.courses, &args)
        .execute(&mut grading, &credentials(), None)
        .await
        .unwrap();

    assert_eq!(grading.logins, 0);
    assert_eq!(report.unresolved_count(), 1);
    assert_eq!(report.applied_count(), 0);
}

#[tokio::test]
async fn test_ambiguous_name_skipped_without_interactive() {
    let fx = fixture();
    let args = args(&["j"], &["hw2"], Some(1));
    let mut grading = FakeGrading::default();

    let report = ExtendRun::new(&fx.settings, &fx.courses, &args)
        .execute(&mut grading, &credentials(), None)
        .await
        .unwrap();

    assert_eq!(report.ambiguous_count(), 1);
    assert!(grading.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_interactive_choice_resolves_ambiguity() {
    let fx = fixture();
    let mut args = args(&["j"], &["hw2"], Some(1));
    args.interactive = true;
    let mut grading = FakeGrading::default();
    let mut prompter = ScriptedPrompter {
        answers: VecDeque::from(vec!["2".to_string()]),
    };

    let report = ExtendRun::new(&fx.settings, &fx.courses, &args)
        .execute(&mut grading, &credentials(), Some(&mut prompter))
        .await
        .unwrap();

    assert_eq!(report.ambiguous_count(), 0);
    let calls = grading.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "john@school.edu");
}

#[tokio::test]
async fn test_unknown_course_is_an_error() {
    let fx = fixture();
    let mut args = args(&["Jane Doe"], &["hw1"], Some(1));
    args.course = Some("cs999".to_string());
    let mut grading = FakeGrading::default();

    let err = ExtendRun::new(&fx.settings, &fx.courses, &args)
        .execute(&mut grading, &credentials(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, GsError::CourseNotFoundError { .. }));
    assert_eq!(grading.logins, 0);
}

#[tokio::test]
async fn test_joined_roster_addresses_send_the_matched_one() {
    let fx = fixture();
    fx.courses
        .save(
            "cs101",
            &CourseRecord {
                gradescope_id: "1".to_string(),
                roster: vec![RosterEntry::new(
                    "Jane Doe",
                    "jane@gmail.com, jane@school.edu",
                )],
            },
        )
        .unwrap();
    let args = args(&["jane@school.edu"], &["hw1"], Some(2));
    let mut grading = FakeGrading::default();

    let report = ExtendRun::new(&fx.settings, &fx.courses, &args)
        .execute(&mut grading, &credentials(), None)
        .await
        .unwrap();

    let emails: Vec<String> = grading
        .calls
        .lock()
        .unwrap()
        .iter()
        .map(|(email, _, _)| email.clone())
        .collect();
    assert_eq!(emails, vec!["jane@school.edu".to_string()]);
    assert_eq!(report.applied_count(), 1);
}
