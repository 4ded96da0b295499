use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::auth::{AuthorizedSession, Authorizer, FileTokenStore, OAuthClient, TokenStore};
use crate::error::{AppError, AppResult};

use super::MailSource;
use super::models::{Message, Thread, ThreadPage, ThreadSummary};
use super::threads;

const GMAIL_API_BASE_URL: &str = "https://gmail.googleapis.com";

#[derive(Debug)]
pub struct GmailClient<A = OAuthClient, S = FileTokenStore> {
    http: Client,
    base_url: String,
    session: AuthorizedSession<A, S>,
}

impl<A: Authorizer, S: TokenStore> GmailClient<A, S> {
    pub fn new(session: AuthorizedSession<A, S>) -> Self {
        Self {
            http: Client::new(),
            base_url: GMAIL_API_BASE_URL.to_string(),
            session,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &mut self,
        segments: &[&str],
        query: &[(String, String)],
    ) -> AppResult<T> {
        let access_token = self.session.access_token().await?;
        let url = threads::endpoint_url(&self.base_url, segments)?;
        tracing::trace!(%url, "gmail api request");

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await?;

        parse_json_response(response).await
    }
}

impl<A: Authorizer, S: TokenStore> MailSource for GmailClient<A, S> {
    async fn list_threads_page(
        &mut self,
        user_id: &str,
        page_token: Option<&str>,
    ) -> AppResult<ThreadPage> {
        let segments = threads::list_segments(user_id);
        let query = threads::list_query(page_token);
        let resource: GmailThreadListResource = self.get_json(&segments, &query).await?;
        Ok(resource.into_page())
    }

    async fn get_thread(&mut self, user_id: &str, thread_id: &str) -> AppResult<Thread> {
        let segments = threads::thread_segments(user_id, thread_id);
        self.get_json(&segments, &threads::minimal_query()).await
    }

    async fn get_message(&mut self, user_id: &str, message_id: &str) -> AppResult<Message> {
        let segments = threads::message_segments(user_id, message_id);
        self.get_json(&segments, &threads::minimal_query()).await
    }
}

async fn parse_json_response<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    Err(map_api_error(status, &body))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailThreadListResource {
    threads: Option<Vec<ThreadSummary>>,
    next_page_token: Option<String>,
}

impl GmailThreadListResource {
    fn into_page(self) -> ThreadPage {
        ThreadPage {
            threads: self.threads.unwrap_or_default(),
            next_page_token: self.next_page_token.filter(|token| !token.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GmailApiErrorEnvelope {
    error: GmailApiError,
}

#[derive(Debug, Deserialize)]
struct GmailApiError {
    code: Option<u16>,
    status: Option<String>,
    message: Option<String>,
    errors: Option<Vec<GmailApiErrorDetail>>,
}

#[derive(Debug, Deserialize)]
struct GmailApiErrorDetail {
    reason: Option<String>,
}

fn map_api_error(status: StatusCode, body: &str) -> AppError {
    let message = parse_api_error_message(body).unwrap_or_else(|| {
        let body = body.trim();
        if body.is_empty() {
            "no error details in response body".to_string()
        } else {
            body.to_string()
        }
    });

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return AppError::Auth(format!(
            "gmail api authorization failed ({status}): {message}. delete the cached token to sign in again"
        ));
    }

    AppError::Api(format!("gmail api request failed ({status}): {message}"))
}

fn parse_api_error_message(body: &str) -> Option<String> {
    let envelope = serde_json::from_str::<GmailApiErrorEnvelope>(body).ok()?;
    let mut parts = Vec::new();

    if let Some(message) = envelope.error.message {
        parts.push(message);
    }

    if let Some(status) = envelope.error.status {
        parts.push(format!("status={status}"));
    }

    if let Some(code) = envelope.error.code {
        parts.push(format!("code={code}"));
    }

    if let Some(reason) = envelope
        .error
        .errors
        .and_then(|errors| errors.into_iter().find_map(|detail| detail.reason))
    {
        parts.push(format!("reason={reason}"));
    }

    if parts.is_empty() {
        return None;
    }

    Some(parts.join(", "))
}
