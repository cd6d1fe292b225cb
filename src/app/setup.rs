use crate::config::{CourseMeta, CourseRecord, CourseStore, Settings, SettingsStore};
use crate::core::roster_import::read_roster_file;
use crate::domain::model::{Course, Credentials, RosterEntry};
use crate::domain::ports::{AuthClient, CourseCatalog, Prompter, RosterSource};
use crate::utils::error::{GsError, Result};
use crate::utils::validation::{validate_course_identifier, Validate};
use std::collections::HashSet;
use std::path::PathBuf;

const ROSTER_CSV_HELP: &str = "Do you have a csv of the roster?
You can obtain one from gradescope or piazza
For gradescope:
    Roster -> More -> Download Roster
For piazza:
    Manage Class -> Enroll Students -> Download Roster as CSV
Otherwise this will connect to piazza (or gradescope) and build a roster that way.";

/// Setup runs these steps in order, never going back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    Start,
    AuthenticateGrading,
    AuthenticateDiscussion,
    ListCourses,
    ChooseCourse,
    PullRoster,
    PersistSettings,
    Done,
}

/// Where the roster for the new course comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterChoice {
    Csv(PathBuf),
    Discussion,
    Grading,
}

/// What setup wrote.
#[derive(Debug, Clone)]
pub struct SetupSummary {
    pub identifier: String,
    pub course: Course,
    pub students: usize,
    pub settings: Settings,
}

/// First-run wizard. Nothing is written before `PersistSettings`, so a failure in
/// any earlier step leaves the settings and course files untouched.
pub struct SetupFlow<'a, G, D>
where
    G: AuthClient + CourseCatalog + RosterSource,
    D: AuthClient + CourseCatalog + RosterSource,
{
    store: &'a SettingsStore,
    settings: Settings,
    grading: &'a mut G,
    grading_credentials: Credentials,
    discussion: Option<(&'a mut D, Credentials)>,
    prompter: &'a mut dyn Prompter,
    roster_csv: Option<PathBuf>,

    step: SetupStep,
    roster_choice: Option<RosterChoice>,
    courses: Vec<Course>,
    chosen: Option<(Course, String)>,
    roster: Vec<RosterEntry>,
}

impl<'a, G, D> SetupFlow<'a, G, D>
where
    G: AuthClient + CourseCatalog + RosterSource,
    D: AuthClient + CourseCatalog + RosterSource,
{
    pub fn new(
        store: &'a SettingsStore,
        settings: Settings,
        grading: &'a mut G,
        grading_credentials: Credentials,
        prompter: &'a mut dyn Prompter,
    ) -> Self {
        Self {
            store,
            settings,
            grading,
            grading_credentials,
            discussion: None,
            prompter,
            roster_csv: None,
            step: SetupStep::Start,
            roster_choice: None,
            courses: Vec::new(),
            chosen: None,
            roster: Vec::new(),
        }
    }

    /// Enables pulling the roster from the discussion board.
    pub fn with_discussion(mut self, client: &'a mut D, credentials: Credentials) -> Self {
        self.discussion = Some((client, credentials));
        self
    }

    /// Uses a roster CSV instead of asking for one.
    pub fn with_roster_csv(mut self, path: Option<PathBuf>) -> Self {
        self.roster_csv = path;
        self
    }

    pub fn step(&self) -> SetupStep {
        self.step
    }

    /// Runs the remaining steps. On error the flow stays at the failing step.
    pub async fn run(&mut self) -> Result<SetupSummary> {
        while self.step != SetupStep::Done {
            tracing::debug!("Setup step {:?}", self.step);
            self.step = self.advance().await?;
        }

        let (course, identifier) = self
            .chosen
            .clone()
            .ok_or_else(|| GsError::config("setup finished without a course"))?;
        Ok(SetupSummary {
            identifier,
            course,
            students: self.roster.len(),
            settings: self.settings.clone(),
        })
    }

    async fn advance(&mut self) -> Result<SetupStep> {
        match self.step {
            SetupStep::Start => {
                self.roster_choice = Some(self.choose_roster_source()?);
                Ok(SetupStep::AuthenticateGrading)
            }
            SetupStep::AuthenticateGrading => {
                self.prompter
                    .say(&format!("Connecting to {}...", self.grading.service()));
                self.grading.authenticate(&self.grading_credentials).await?;
                Ok(SetupStep::AuthenticateDiscussion)
            }
            SetupStep::AuthenticateDiscussion => {
                if self.roster_choice == Some(RosterChoice::Discussion) {
                    if let Some((client, credentials)) = self.discussion.as_mut() {
                        self.prompter
                            .say(&format!("Connecting to {}...", client.service()));
                        client.authenticate(credentials).await?;
                    }
                }
                Ok(SetupStep::ListCourses)
            }
            SetupStep::ListCourses => {
                self.courses = self.grading.list_courses().await?;
                if self.courses.is_empty() {
                    return Err(GsError::config(format!(
                        "no courses visible on {}",
                        self.grading.service()
                    )));
                }
                Ok(SetupStep::ChooseCourse)
            }
            SetupStep::ChooseCourse => {
                let ix = self.prompter.select(
                    "Enter the number (i) of the course to use for configuring:",
                    &course_labels(&self.courses),
                )?;
                let course = self.courses[ix].clone();
                let identifier = self.ask_identifier()?;
                self.chosen = Some((course, identifier));
                Ok(SetupStep::PullRoster)
            }
            SetupStep::PullRoster => {
                self.roster = self.pull_roster().await?;
                if self.roster.is_empty() {
                    tracing::warn!("The roster is empty; extend will not match any student");
                }
                Ok(SetupStep::PersistSettings)
            }
            SetupStep::PersistSettings => {
                self.persist()?;
                Ok(SetupStep::Done)
            }
            SetupStep::Done => Ok(SetupStep::Done),
        }
    }

    fn choose_roster_source(&mut self) -> Result<RosterChoice> {
        if let Some(path) = self.roster_csv.take() {
            return Ok(RosterChoice::Csv(path));
        }

        if self.prompter.confirm(ROSTER_CSV_HELP)? {
            let mut path = PathBuf::from(self.prompter.read_line("Enter path to roster csv: ")?.trim());
            while !path.exists() {
                path = PathBuf::from(self.prompter.read_line("Path not found, try again: ")?.trim());
            }
            return Ok(RosterChoice::Csv(path));
        }

        if self.discussion.is_some() {
            Ok(RosterChoice::Discussion)
        } else {
            self.prompter.say(
                "PZ_EMAIL/PZ_PASSWORD are not set, building the roster from Gradescope instead",
            );
            Ok(RosterChoice::Grading)
        }
    }

    fn ask_identifier(&mut self) -> Result<String> {
        loop {
            let identifier = self
                .prompter
                .read_line("\nEnter an identifier to use for this course, no spaces:\n")?
                .trim()
                .to_string();

            if let Err(e) = validate_course_identifier("identifier", &identifier) {
                self.prompter.say(&e.to_string());
                continue;
            }

            if self.settings.courses.contains_key(&identifier) {
                let question = format!(
                    "Course with identifier \"{}\" already exists, do you want to overwrite it?",
                    identifier
                );
                if !self.prompter.confirm(&question)? {
                    continue;
                }
            }
            return Ok(identifier);
        }
    }

    async fn pull_roster(&mut self) -> Result<Vec<RosterEntry>> {
        let course_id = match &self.chosen {
            Some((course, _)) => course.id.clone(),
            None => return Err(GsError::config("no course chosen")),
        };

        match self.roster_choice.clone() {
            Some(RosterChoice::Csv(path)) => {
                tracing::info!("📄 Reading roster from {}", path.display());
                read_roster_file(&path)
            }
            Some(RosterChoice::Grading) => self.grading.list_roster(&course_id).await,
            Some(RosterChoice::Discussion) => self.pull_discussion_roster(&course_id).await,
            None => Err(GsError::config("no roster source chosen")),
        }
    }

    /// Pulls students from the discussion board and keeps, for each, the first
    /// address that Gradescope knows. Students without one are reported.
    async fn pull_discussion_roster(&mut self, grading_course_id: &str) -> Result<Vec<RosterEntry>> {
        let valid_emails: HashSet<String> = self
            .grading
            .list_roster(grading_course_id)
            .await?
            .iter()
            .flat_map(|e| e.emails().map(str::to_lowercase).collect::<Vec<_>>())
            .collect();

        let Some((client, _)) = self.discussion.as_mut() else {
            return Err(GsError::config("discussion board client is not configured"));
        };

        let courses = client.list_courses().await?;
        if courses.is_empty() {
            return Err(GsError::config(format!(
                "no {} courses where you are on staff",
                client.service()
            )));
        }
        let ix = self.prompter.select(
            &format!("Enter the number (i) of the {} course to use:", client.service()),
            &course_labels(&courses),
        )?;
        let members = client.list_roster(&courses[ix].id).await?;

        let mut roster = Vec::new();
        let mut without_email = Vec::new();
        for member in members {
            let valid = member
                .emails()
                .find(|email| valid_emails.contains(&email.to_lowercase()))
                .map(str::to_string);
            match valid {
                Some(email) => roster.push(RosterEntry::new(member.name.clone(), email)),
                None => without_email.push(member.name.clone()),
            }
        }

        if !without_email.is_empty() {
            self.prompter.say(&format!(
                "Warning: could not find an email for the following students. Check to make sure they aren't enrolled on gradescope\n  {}",
                without_email.join("\n  ")
            ));
        }
        Ok(roster)
    }

    fn persist(&mut self) -> Result<()> {
        let (course, identifier) = self
            .chosen
            .clone()
            .ok_or_else(|| GsError::config("no course chosen"))?;

        let mut settings = self.settings.clone();
        let replaced = settings.register_course(
            &identifier,
            CourseMeta {
                gradescope_id: course.id.clone(),
                name: Some(course.name.clone()).filter(|n| !n.is_empty()),
                term: Some(course.term.clone()).filter(|t| !t.is_empty()),
            },
        );
        if replaced {
            tracing::warn!("Course with identifier \"{}\" already exists, overwriting", identifier);
        }
        settings.validate()?;

        let course_store = CourseStore::new(self.store.course_dir(&settings));
        let record = CourseRecord {
            gradescope_id: course.id,
            roster: std::mem::take(&mut self.roster),
        };
        let students = record.roster.len();

        course_store.save(&identifier, &record)?;
        self.store.save(&settings)?;
        self.roster = record.roster;
        self.settings = settings;

        self.prompter.say(&format!(
            "Saved course {} with {} students to {}",
            identifier,
            students,
            course_store.path_for(&identifier).display()
        ));
        Ok(())
    }
}

fn course_labels(courses: &[Course]) -> Vec<String> {
    let width = courses.iter().map(|c| c.name.len()).max().unwrap_or(0);
    courses.iter().map(|c| c.label(width)).collect()
}
