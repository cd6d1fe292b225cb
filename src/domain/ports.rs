use crate::domain::model::{Assignment, Course, Credentials, ExtensionLength, RosterEntry};
use crate::utils::error::Result;
use async_trait::async_trait;

/// A platform session that has to be opened before anything else is called.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Human-readable platform name used in logs and errors.
    fn service(&self) -> &str;

    async fn authenticate(&mut self, credentials: &Credentials) -> Result<()>;
}

/// Lists the courses visible to the authenticated user. The discussion board only
/// reports courses where the user is on staff.
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<Course>>;
}

/// Anything that can produce the student list of a course.
///
/// Entries pulled from the discussion board may carry several comma-separated
/// addresses in `email`; see [`RosterEntry::emails`].
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn list_roster(&self, course_id: &str) -> Result<Vec<RosterEntry>>;
}

/// The grading platform's assignment and extension endpoints.
#[async_trait]
pub trait ExtensionTarget: Send + Sync {
    async fn list_assignments(&self, course_id: &str) -> Result<Vec<Assignment>>;

    async fn apply_extension(
        &self,
        course_id: &str,
        assignment: &Assignment,
        student_email: &str,
        length: ExtensionLength,
    ) -> Result<()>;
}

/// Line-oriented operator interaction. Only `say` and `read_line` are required;
/// the menus are built on top of them.
pub trait Prompter {
    fn say(&mut self, message: &str);

    fn read_line(&mut self, prompt: &str) -> Result<String>;

    /// `(y/N)` question; an empty answer means no.
    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.say(question);
        loop {
            let answer = self.read_line("(y/N): ")?.trim().to_lowercase();
            if answer.is_empty() || answer.starts_with('n') {
                return Ok(false);
            }
            if answer.starts_with('y') {
                return Ok(true);
            }
        }
    }

    /// Numbered menu; returns the zero-based index of the chosen option.
    fn select(&mut self, message: &str, options: &[String]) -> Result<usize> {
        self.say(message);
        for (ix, option) in options.iter().enumerate() {
            self.say(&format!("  ({}) {}", ix + 1, option));
        }
        loop {
            let answer = self.read_line("Selection: ")?;
            match answer.trim().parse::<usize>() {
                Ok(n) if n >= 1 && n <= options.len() => return Ok(n - 1),
                Ok(n) => self.say(&format!("{} not within range. {}", n, message)),
                Err(_) => {}
            }
        }
    }
}
