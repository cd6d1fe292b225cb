use crate::domain::model::ExtensionLength;
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "gs-tools")]
#[command(about = "Apply Gradescope deadline extensions from the command line")]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to settings.toml next to the executable)
    #[arg(long, global = true, env = "GS_TOOLS_SETTINGS", value_name = "PATH")]
    pub settings: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Without a command the interactive setup runs
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Interactively add or reconfigure a course
    Configure(ConfigureArgs),
    /// Extend deadlines of matching assignments for the given students
    Extend(ExtendArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ConfigureArgs {
    /// Roster CSV exported from Gradescope or Piazza
    #[arg(long, value_name = "CSV")]
    pub roster: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct ExtendArgs {
    /// Student names or emails
    pub names: Vec<String>,

    /// Text the assignment title must contain (e.g. -s hw4); may be repeated
    #[arg(short = 's', long = "string", value_name = "SUBSTRING", required = true)]
    pub assignments: Vec<String>,

    /// Days after the deadline to extend to (1-3650). Does not stack with other extensions
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=3650))]
    pub days: Option<u32>,

    /// Explicit new deadline (RFC 3339, or "YYYY-MM-DD HH:MM" local time)
    #[arg(long, value_parser = parse_deadline, conflicts_with = "days")]
    pub until: Option<DateTime<FixedOffset>>,

    /// Course identifier (defaults to default-course)
    #[arg(short = 'i', long = "id", value_name = "COURSE")]
    pub course: Option<String>,

    /// Ask which student was meant when a name is ambiguous
    #[arg(long)]
    pub interactive: bool,

    /// Show what would be extended without contacting the extension endpoint
    #[arg(long)]
    pub dry_run: bool,
}

impl ExtendArgs {
    pub fn length(&self, default_days: u32) -> ExtensionLength {
        match (self.until, self.days) {
            (Some(deadline), _) => ExtensionLength::Until(deadline),
            (None, Some(days)) => ExtensionLength::Days(days),
            (None, None) => ExtensionLength::Days(default_days),
        }
    }
}

pub fn parse_deadline(value: &str) -> Result<DateTime<FixedOffset>, String> {
    let value = value.trim();
    if let Ok(deadline) = DateTime::parse_from_rfc3339(value) {
        return Ok(deadline);
    }

    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.fixed_offset())
                .ok_or_else(|| format!("{} does not exist in the local time zone", value));
        }
    }

    Err(format!(
        "invalid deadline '{}': expected RFC 3339 or YYYY-MM-DD HH:MM",
        value
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_no_arguments_means_setup() {
        let cli = parse(&["gs-tools"]);
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_extend_arguments() {
        let cli = parse(&["gs-tools", "extend", "Jane Doe", "jsmith@school.edu", "-s", "hw1", "-d", "2"]);
        let Some(Command::Extend(args)) = cli.command else {
            panic!("expected extend");
        };
        assert_eq!(args.names, vec!["Jane Doe", "jsmith@school.edu"]);
        assert_eq!(args.assignments, vec!["hw1"]);
        assert_eq!(args.length(5), ExtensionLength::Days(2));
        assert!(!args.dry_run);
    }

    #[test]
    fn test_extend_uses_default_length() {
        let cli = parse(&["gs-tools", "extend", "jane", "-s", "hw1", "-s", "hw2", "-i", "cs101"]);
        let Some(Command::Extend(args)) = cli.command else {
            panic!("expected extend");
        };
        assert_eq!(args.length(5), ExtensionLength::Days(5));
        assert_eq!(args.course.as_deref(), Some("cs101"));
        assert_eq!(args.assignments.len(), 2);
    }

    #[test]
    fn test_extend_requires_assignment_string() {
        assert!(Cli::try_parse_from(["gs-tools", "extend", "jane"]).is_err());
    }

    #[test]
    fn test_zero_days_rejected() {
        assert!(Cli::try_parse_from(["gs-tools", "extend", "jane", "-s", "hw1", "-d", "0"]).is_err());
    }

    #[test]
    fn test_huge_day_count_rejected() {
        assert!(
            Cli::try_parse_from(["gs-tools", "extend", "jane", "-s", "hw1", "-d", "200000000"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["gs-tools", "extend", "jane", "-s", "hw1", "-d", "3650"]).is_ok());
    }

    #[test]
    fn test_until_conflicts_with_days() {
        assert!(Cli::try_parse_from([
            "gs-tools",
            "extend",
            "jane",
            "-s",
            "hw1",
            "-d",
            "2",
            "--until",
            "2024-10-01T23:59:00-04:00",
        ])
        .is_err());
    }

    #[test]
    fn test_parse_deadline_formats() {
        let rfc = parse_deadline("2024-10-01T23:59:00-04:00").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2024-10-01T23:59:00-04:00");

        let local = parse_deadline("2024-10-01 23:59").unwrap();
        assert_eq!(local.naive_local().to_string(), "2024-10-01 23:59:00");

        assert!(parse_deadline("next tuesday").is_err());
    }

    #[test]
    fn test_configure_roster_flag() {
        let cli = parse(&["gs-tools", "--settings", "/tmp/s.toml", "configure", "--roster", "roster.csv"]);
        assert_eq!(cli.settings, Some(PathBuf::from("/tmp/s.toml")));
        let Some(Command::Configure(args)) = cli.command else {
            panic!("expected configure");
        };
        assert_eq!(args.roster, Some(PathBuf::from("roster.csv")));
    }
}
