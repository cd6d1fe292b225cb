use crate::adapters::html::{extract_csrf_token, react_props, unescape_html};
use crate::core::roster_import::read_roster_csv;
use crate::domain::model::{Assignment, Course, Credentials, ExtensionLength, RosterEntry};
use crate::domain::ports::{AuthClient, CourseCatalog, ExtensionTarget, RosterSource};
use crate::utils::error::{GsError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

pub const GRADESCOPE_URL: &str = "https://www.gradescope.com";
const SERVICE: &str = "Gradescope";

static COURSE_LIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)class="courseList--term[^"]*"[^>]*>\s*([^<]+?)\s*<|<a[^>]*class="courseBox"[^>]*href="/courses/(\d+)"[^>]*>.*?class="courseBox--shortname"[^>]*>\s*([^<]*?)\s*<"#,
    )
    .expect("course list pattern")
});

static ASSIGNMENT_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a[^>]*href="/courses/\d+/assignments/(\d+)[^"]*"[^>]*>\s*([^<]+?)\s*</a>"#)
        .expect("assignment link pattern")
});

#[derive(Debug, Deserialize)]
struct AssignmentsTableProps {
    #[serde(default)]
    table_data: Vec<AssignmentRow>,
}

#[derive(Debug, Deserialize)]
struct AssignmentRow {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl AssignmentRow {
    fn into_assignment(self) -> Option<Assignment> {
        let title = self.title?;
        let id = self
            .url
            .as_deref()
            .and_then(|url| url.trim_end_matches('/').rsplit('/').next())
            .filter(|segment| segment.chars().all(|c| c.is_ascii_digit()))
            .map(str::to_string)
            .or_else(|| match self.id {
                Some(serde_json::Value::Number(n)) => Some(n.to_string()),
                Some(serde_json::Value::String(s)) => {
                    Some(s.trim_start_matches("assignment_").to_string())
                }
                _ => None,
            })?;
        Some(Assignment::new(id, unescape_html(&title)))
    }
}

#[derive(Debug, Deserialize)]
struct AddExtensionProps {
    assignment: AssignmentDates,
    #[serde(default)]
    students: Vec<ExtensionStudent>,
}

#[derive(Debug, Deserialize)]
struct AssignmentDates {
    due_date: Option<String>,
    #[serde(default)]
    hard_due_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExtensionStudent {
    id: serde_json::Value,
    email: String,
}

/// Gradescope has no public API; this client drives the staff web pages with a
/// cookie session, the way a browser would.
pub struct GradescopeClient {
    client: Client,
    base_url: Url,
    csrf_token: Option<String>,
}

impl GradescopeClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(GRADESCOPE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        validate_url("gradescope.base_url", base_url)?;
        let base_url = Url::parse(base_url).map_err(|e| GsError::config(e.to_string()))?;
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("gs-tools/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            csrf_token: None,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| GsError::config(format!("invalid Gradescope path {}: {}", path, e)))
    }

    async fn get_page(&self, path: &str) -> Result<String> {
        let url = self.url(path)?;
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GsError::remote(
                SERVICE,
                format!("GET {} returned {}", path, status),
            ));
        }
        Ok(response.text().await?)
    }

    fn require_session(&self) -> Result<&str> {
        self.csrf_token
            .as_deref()
            .ok_or_else(|| GsError::auth(SERVICE, "not logged in"))
    }

    async fn load_extension_page(&self, course_id: &str, assignment_id: &str) -> Result<AddExtensionProps> {
        let path = format!("/courses/{}/assignments/{}/extensions", course_id, assignment_id);
        let html = self.get_page(&path).await?;
        let props = react_props(&html, "AddExtension")
            .ok_or_else(|| GsError::parse("extensions page", "no AddExtension data"))?;
        Ok(serde_json::from_str(&props)?)
    }
}

/// Due (and hard due) dates after an extension. A late window between the due
/// date and the hard due date keeps its length. Dates past chrono's range are a
/// per-pair error.
pub fn extended_dates(
    due: DateTime<FixedOffset>,
    hard_due: Option<DateTime<FixedOffset>>,
    length: ExtensionLength,
) -> Result<(DateTime<FixedOffset>, Option<DateTime<FixedOffset>>)> {
    let out_of_range = || GsError::InvalidConfigValueError {
        field: "extension length".to_string(),
        value: length.to_string(),
        reason: format!("moves the deadline of {} out of range", due.to_rfc3339()),
    };

    let new_due = match length {
        ExtensionLength::Days(days) => ChronoDuration::try_days(i64::from(days))
            .and_then(|delta| due.checked_add_signed(delta))
            .ok_or_else(out_of_range)?,
        ExtensionLength::Until(deadline) => deadline,
    };
    let new_hard = match hard_due {
        Some(hard) => Some(
            new_due
                .checked_add_signed((hard - due).max(ChronoDuration::zero()))
                .ok_or_else(out_of_range)?,
        ),
        None => None,
    };
    Ok((new_due, new_hard))
}

fn parse_date(field: &str, value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| GsError::parse(format!("assignment {}", field), format!("{}: {}", value, e)))
}

/// Course list from the account page, in page order.
pub fn parse_course_list(html: &str) -> Vec<Course> {
    let mut courses = Vec::new();
    let mut term = String::new();

    for caps in COURSE_LIST_RE.captures_iter(html) {
        if let Some(heading) = caps.get(1) {
            term = unescape_html(heading.as_str());
            continue;
        }
        if let (Some(id), Some(name)) = (caps.get(2), caps.get(3)) {
            if courses.iter().any(|c: &Course| c.id == id.as_str()) {
                continue;
            }
            courses.push(Course {
                id: id.as_str().to_string(),
                name: unescape_html(name.as_str()),
                term: term.clone(),
            });
        }
    }
    courses
}

/// Assignments from the course's assignment page. Newer pages carry them as
/// React props; older ones only as links.
pub fn parse_assignment_list(html: &str) -> Result<Vec<Assignment>> {
    if let Some(props) = react_props(html, "AssignmentsTable") {
        let table: AssignmentsTableProps = serde_json::from_str(&props)?;
        return Ok(table
            .table_data
            .into_iter()
            .filter_map(AssignmentRow::into_assignment)
            .collect());
    }

    let mut assignments: Vec<Assignment> = Vec::new();
    for caps in ASSIGNMENT_LINK_RE.captures_iter(html) {
        let id = caps[1].to_string();
        if assignments.iter().any(|a| a.id == id) {
            continue;
        }
        assignments.push(Assignment::new(id, unescape_html(&caps[2])));
    }
    Ok(assignments)
}

#[async_trait]
impl AuthClient for GradescopeClient {
    fn service(&self) -> &str {
        SERVICE
    }

    async fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        let landing = self.get_page("/").await?;
        let token = extract_csrf_token(&landing)
            .ok_or_else(|| GsError::parse("Gradescope login page", "no CSRF token"))?;

        let form = [
            ("utf8", "✓"),
            ("session[email]", credentials.email.as_str()),
            ("session[password]", credentials.password.as_str()),
            ("session[remember_me]", "0"),
            ("commit", "Log In"),
            ("session[remember_me_sso]", "0"),
            ("authenticity_token", token.as_str()),
        ];

        let response = self.client.post(self.url("/login")?).form(&form).send().await?;
        let landed_on = response.url().path().to_string();
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() || landed_on.starts_with("/login") {
            return Err(GsError::auth(SERVICE, "invalid email or password"));
        }

        self.csrf_token = Some(extract_csrf_token(&body).unwrap_or(token));
        tracing::info!("🔐 Logged in to Gradescope as {}", credentials.email);
        Ok(())
    }
}

#[async_trait]
impl CourseCatalog for GradescopeClient {
    async fn list_courses(&self) -> Result<Vec<Course>> {
        self.require_session()?;
        let html = self.get_page("/account").await?;
        let courses = parse_course_list(&html);
        tracing::debug!("Found {} Gradescope courses", courses.len());
        Ok(courses)
    }
}

#[async_trait]
impl RosterSource for GradescopeClient {
    async fn list_roster(&self, course_id: &str) -> Result<Vec<RosterEntry>> {
        self.require_session()?;
        let csv_data = self
            .get_page(&format!("/courses/{}/memberships.csv", course_id))
            .await?;
        read_roster_csv(csv_data.as_bytes())
    }
}

#[async_trait]
impl ExtensionTarget for GradescopeClient {
    async fn list_assignments(&self, course_id: &str) -> Result<Vec<Assignment>> {
        self.require_session()?;
        let html = self
            .get_page(&format!("/courses/{}/assignments", course_id))
            .await?;
        parse_assignment_list(&html)
    }

    async fn apply_extension(
        &self,
        course_id: &str,
        assignment: &Assignment,
        student_email: &str,
        length: ExtensionLength,
    ) -> Result<()> {
        let csrf_token = self.require_session()?.to_string();
        let page = self.load_extension_page(course_id, &assignment.id).await?;

        let student = page
            .students
            .iter()
            .find(|s| s.email.eq_ignore_ascii_case(student_email))
            .ok_or_else(|| {
                GsError::remote(
                    SERVICE,
                    format!("{} is not enrolled in course {}", student_email, course_id),
                )
            })?;

        let due_raw = page.assignment.due_date.as_deref().ok_or_else(|| {
            GsError::remote(SERVICE, format!("'{}' has no due date", assignment.title))
        })?;
        let due = parse_date("due_date", due_raw)?;
        let hard_due = page
            .assignment
            .hard_due_date
            .as_deref()
            .map(|raw| parse_date("hard_due_date", raw))
            .transpose()?;
        let (new_due, new_hard) = extended_dates(due, hard_due, length)?;

        let mut settings = serde_json::json!({
            "visible": true,
            "due_date": { "type": "absolute", "value": new_due.to_rfc3339() },
        });
        if let Some(hard) = new_hard {
            settings["hard_due_date"] =
                serde_json::json!({ "type": "absolute", "value": hard.to_rfc3339() });
        }
        let body = serde_json::json!({
            "override": { "user_id": student.id, "settings": settings }
        });

        let path = format!("/courses/{}/assignments/{}/extensions", course_id, assignment.id);
        tracing::debug!("POST {} for {}", path, student_email);
        let response = self
            .client
            .post(self.url(&path)?)
            .header("X-CSRF-Token", csrf_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GsError::remote(
                SERVICE,
                format!("{}: {}", status, text.chars().take(200).collect::<String>()),
            ));
        }
        Ok(())
    }
}
