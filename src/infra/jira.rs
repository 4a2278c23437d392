use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, AUTHORIZATION},
};
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, AppResult};

const NOT_FOUND_HINT: &str = "the ticket does not exist or you lack permission to view it; \
     check the URL and that your Jira token has browse access";

pub struct JiraClient {
    http: Client,
    base_url: Option<String>,
    email: Option<String>,
    token: Option<String>,
}

impl JiraClient {
    pub fn new(base_url: Option<String>, email: Option<String>, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            email,
            token,
        }
    }

    fn credentials(&self) -> AppResult<(&str, &str)> {
        let email = self
            .email
            .as_deref()
            .ok_or_else(|| AppError::Configuration("Jira email not configured".to_string()))?;
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| AppError::Configuration("Jira API token not configured".to_string()))?;
        Ok((email, token))
    }

    fn auth_header(email: &str, token: &str) -> String {
        let credentials = format!("{email}:{token}");
        let encoded = BASE64_STANDARD.encode(credentials);
        format!("Basic {encoded}")
    }

    fn summary_endpoint(base_url: &str, key: &str) -> String {
        format!(
            "{}/rest/api/3/issue/{key}?fields=summary",
            base_url.trim_end_matches('/')
        )
    }

    /// Summary of ticket `key`; `site` is the Jira root the ticket URL pointed at.
    pub async fn issue_title(&self, site: Option<&str>, key: &str) -> AppResult<String> {
        let base_url = site
            .or(self.base_url.as_deref())
            .ok_or_else(|| AppError::Configuration("Jira base URL not configured".to_string()))?;
        let (email, token) = self.credentials()?;
        let endpoint = Self::summary_endpoint(base_url, key);
        debug!(%endpoint, "fetching Jira ticket");

        let response = self
            .http
            .get(&endpoint)
            .header(AUTHORIZATION, Self::auth_header(email, token))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::TrackerUnavailable(format!("failed to call Jira: {err}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::FORBIDDEN {
            return Err(AppError::TrackerUnavailable(format!(
                "Jira ticket {key}: {NOT_FOUND_HINT}"
            )));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::TrackerUnavailable(format!(
                "Jira responded with {status}: {body}"
            )));
        }

        let payload: JiraIssueResponse = response.json().await.map_err(|err| {
            AppError::TrackerUnavailable(format!("failed to parse Jira response: {err}"))
        })?;
        Ok(payload.fields.summary)
    }
}

#[derive(Deserialize)]
struct JiraIssueResponse {
    fields: JiraIssueFields,
}

#[derive(Deserialize)]
struct JiraIssueFields {
    #[serde(default)]
    summary: String,
}
