use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A student as listed on a course roster. The email is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub email: String,
}

impl RosterEntry {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl RosterEntry {
    /// Every address listed for the student. Discussion-board exports join several
    /// addresses with commas.
    pub fn emails(&self) -> impl Iterator<Item = &str> {
        self.email
            .split(',')
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }

    /// The entry reduced to a single address: the one equal to `query` when listed,
    /// otherwise the first. Platforms take exactly one address per call.
    pub fn addressed_as(&self, query: &str) -> RosterEntry {
        let query = query.trim();
        let email = self
            .emails()
            .find(|email| email.eq_ignore_ascii_case(query))
            .or_else(|| self.emails().next())
            .unwrap_or(self.email.as_str());
        RosterEntry::new(self.name.clone(), email)
    }
}

impl fmt::Display for RosterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.email)
    }
}

/// A course as listed by either platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub term: String,
}

impl Course {
    /// One-line label used in selection menus.
    pub fn label(&self, name_width: usize) -> String {
        format!(
            "{:<width$}\t{}\t{}",
            self.name,
            self.term,
            self.id,
            width = name_width
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub title: String,
}

impl Assignment {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// How far a deadline is pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionLength {
    /// Days added to the assignment's own due date.
    Days(u32),
    /// An explicit new deadline.
    Until(DateTime<FixedOffset>),
}

impl fmt::Display for ExtensionLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionLength::Days(1) => write!(f, "1 day"),
            ExtensionLength::Days(days) => write!(f, "{} days", days),
            ExtensionLength::Until(deadline) => write!(f, "until {}", deadline.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRequest {
    pub student: RosterEntry,
    pub assignment: Assignment,
    pub length: ExtensionLength,
}

/// Login details for one platform.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials {
            email: "ta@school.edu".to_string(),
            password: "hunter2".to_string(),
        };
        let printed = format!("{:?}", creds);
        assert!(printed.contains("ta@school.edu"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_emails_splits_joined_addresses() {
        let entry = RosterEntry::new("jane doe", "jane@gmail.com, jdoe@school.edu");
        let emails: Vec<&str> = entry.emails().collect();
        assert_eq!(emails, vec!["jane@gmail.com", "jdoe@school.edu"]);
    }

    #[test]
    fn test_addressed_as_picks_one_address() {
        let entry = RosterEntry::new("Jane Doe", "jane@gmail.com, jane@school.edu");
        assert_eq!(entry.addressed_as("Jane@School.edu").email, "jane@school.edu");
        assert_eq!(entry.addressed_as("jane").email, "jane@gmail.com");

        let single = RosterEntry::new("John Smith", "john@school.edu");
        assert_eq!(single.addressed_as("john"), single);
    }

    #[test]
    fn test_extension_length_display() {
        assert_eq!(ExtensionLength::Days(1).to_string(), "1 day");
        assert_eq!(ExtensionLength::Days(3).to_string(), "3 days");
        let deadline = DateTime::parse_from_rfc3339("2024-10-01T23:59:00-04:00").unwrap();
        assert_eq!(
            ExtensionLength::Until(deadline).to_string(),
            "until 2024-10-01T23:59:00-04:00"
        );
    }
}
