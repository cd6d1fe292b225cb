use crate::domain::model::{Course, Credentials, RosterEntry};
use crate::domain::ports::{AuthClient, CourseCatalog, RosterSource};
use crate::utils::error::{GsError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

pub const PIAZZA_URL: &str = "https://piazza.com";
const SERVICE: &str = "Piazza";

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(default)]
    all_classes: HashMap<String, ProfileClass>,
}

#[derive(Debug, Deserialize)]
struct ProfileClass {
    #[serde(default)]
    num: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    term: Option<String>,
    #[serde(default)]
    is_ta: bool,
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

/// Client for Piazza's internal JSON-RPC endpoint (`/logic/api`).
pub struct PiazzaClient {
    client: Client,
    endpoint: Url,
    csrf_token: Option<String>,
}

impl PiazzaClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(PIAZZA_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        validate_url("piazza.base_url", base_url)?;
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join("/logic/api"))
            .map_err(|e| GsError::config(e.to_string()))?;
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            csrf_token: None,
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let (result, _) = self.call_raw(method, params).await?;
        serde_json::from_value(result)
            .map_err(|e| GsError::parse(format!("{} response", method), e.to_string()))
    }

    /// Returns the RPC result and the session cookie, if the server set one.
    async fn call_raw(&self, method: &str, params: Value) -> Result<(Value, Option<String>)> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("method", method);

        let mut request = self
            .client
            .post(url)
            .json(&json!({ "method": method, "params": params }));
        if let Some(token) = &self.csrf_token {
            request = request.header("CSRF-Token", token);
        }

        tracing::debug!("Piazza RPC {}", method);
        let response = request.send().await?;
        let status = response.status();
        let session = response
            .cookies()
            .find(|c| c.name() == "session_id")
            .map(|c| c.value().to_string());
        if !status.is_success() {
            return Err(GsError::remote(
                SERVICE,
                format!("{} returned {}", method, status),
            ));
        }

        let body: RpcResponse = response.json().await?;
        match body.error {
            Some(Value::Null) | None => Ok((body.result, session)),
            Some(Value::String(message)) => Err(GsError::remote(SERVICE, message)),
            Some(other) => Err(GsError::remote(SERVICE, other.to_string())),
        }
    }
}

#[async_trait]
impl AuthClient for PiazzaClient {
    fn service(&self) -> &str {
        SERVICE
    }

    async fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        let params = json!({ "email": credentials.email, "pass": credentials.password });
        let (result, session) = match self.call_raw("user.login", params).await {
            Ok(ok) => ok,
            Err(GsError::RemoteError { message, .. }) => {
                return Err(GsError::auth(SERVICE, message));
            }
            Err(e) => return Err(e),
        };

        if result.as_str() != Some("OK") {
            return Err(GsError::auth(SERVICE, format!("unexpected login result {}", result)));
        }
        self.csrf_token = session;
        tracing::info!("🔐 Logged in to Piazza as {}", credentials.email);
        Ok(())
    }
}

#[async_trait]
impl CourseCatalog for PiazzaClient {
    /// Classes where the logged-in user is on staff.
    async fn list_courses(&self) -> Result<Vec<Course>> {
        let profile: Profile = self.call("user_profile.get_profile", json!({})).await?;
        let mut courses: Vec<Course> = profile
            .all_classes
            .into_iter()
            .filter(|(_, class)| class.is_ta)
            .map(|(nid, class)| Course {
                id: nid,
                name: class.num.or(class.name).unwrap_or_default(),
                term: class.term.unwrap_or_default(),
            })
            .collect();
        courses.sort_by(|a, b| a.term.cmp(&b.term).then_with(|| a.name.cmp(&b.name)));
        Ok(courses)
    }
}

#[async_trait]
impl RosterSource for PiazzaClient {
    async fn list_roster(&self, course_id: &str) -> Result<Vec<RosterEntry>> {
        let members: Vec<Member> = self
            .call("network.get_all_users", json!({ "nid": course_id }))
            .await?;

        let roster: Vec<RosterEntry> = members
            .into_iter()
            .filter(|m| m.role.as_deref() == Some("student"))
            .filter_map(|m| {
                let email = m.email.filter(|e| !e.trim().is_empty())?;
                let name = m.name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| email.clone());
                Some(RosterEntry::new(name, email))
            })
            .collect();
        tracing::debug!("Piazza class {} has {} students", course_id, roster.len());
        Ok(roster)
    }
}
