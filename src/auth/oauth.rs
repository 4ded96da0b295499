use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use reqwest::StatusCode;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use url::Url;

use crate::config::OAuthConfig;
use crate::error::{AppError, AppResult};

use super::token::Token;

pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// The OAuth provider as seen by the credential flow.
#[allow(async_fn_in_trait)]
pub trait Authorizer {
    fn authorization_request(&self) -> AppResult<AuthorizationRequest>;

    async fn exchange_code(&self, request: &AuthorizationRequest, code: &str) -> AppResult<Token>;

    async fn refresh(&self, refresh_token: &str) -> AppResult<Token>;
}

#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
    pub code_verifier: String,
}

#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    http: reqwest::Client,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    async fn post_token_form(&self, form: HashMap<&str, String>) -> AppResult<Token> {
        let response = self
            .http
            .post(&self.config.token_uri)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        decode_token_response(status, &body)
    }
}

impl Authorizer for OAuthClient {
    fn authorization_request(&self) -> AppResult<AuthorizationRequest> {
        let state = random_token(32);
        let code_verifier = random_token(96);
        let code_challenge = pkce_challenge(&code_verifier);

        let mut url = Url::parse(&self.config.auth_uri)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", GMAIL_READONLY_SCOPE)
            .append_pair("access_type", "offline")
            .append_pair("state", &state)
            .append_pair("code_challenge", &code_challenge)
            .append_pair("code_challenge_method", "S256");

        Ok(AuthorizationRequest {
            url: url.to_string(),
            state,
            code_verifier,
        })
    }

    async fn exchange_code(&self, request: &AuthorizationRequest, code: &str) -> AppResult<Token> {
        let mut form = HashMap::from([
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
            ("client_id", self.config.client_id.clone()),
            ("redirect_uri", self.config.redirect_uri.clone()),
            ("code_verifier", request.code_verifier.clone()),
        ]);

        if let Some(client_secret) = &self.config.client_secret {
            form.insert("client_secret", client_secret.clone());
        }

        self.post_token_form(form).await
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<Token> {
        let mut form = HashMap::from([
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token.to_string()),
            ("client_id", self.config.client_id.clone()),
        ]);

        if let Some(client_secret) = &self.config.client_secret {
            form.insert("client_secret", client_secret.clone());
        }

        let mut token = self.post_token_form(form).await?;
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }

        Ok(token)
    }
}

#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

fn decode_token_response(status: StatusCode, body: &str) -> AppResult<Token> {
    if status.is_success() {
        let payload: OAuthTokenResponse = serde_json::from_str(body)?;
        let mut token = Token::new(payload.access_token);
        token.refresh_token = payload.refresh_token;
        token.expires_at_unix = expires_at_unix(payload.expires_in);
        if let Some(token_type) = payload.token_type {
            token.token_type = token_type;
        }
        return Ok(token);
    }

    if let Ok(err_payload) = serde_json::from_str::<OAuthErrorResponse>(body) {
        let error = err_payload
            .error
            .unwrap_or_else(|| "unknown_oauth_error".to_string());
        let description = err_payload
            .error_description
            .unwrap_or_else(|| "no description".to_string());
        return Err(AppError::Auth(format!(
            "oauth token exchange failed ({status}): {error} ({description})"
        )));
    }

    Err(AppError::Auth(format!(
        "oauth token exchange failed ({status}): {body}"
    )))
}

fn expires_at_unix(expires_in: Option<u64>) -> Option<u64> {
    let expires_in = expires_in?;
    let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
    Some(now.saturating_add(expires_in))
}

fn random_token(len: usize) -> String {
    let mut bytes = vec![0_u8; len];
    rand::thread_rng().fill(bytes.as_mut_slice());
    URL_SAFE_NO_PAD.encode(bytes)
}

fn pkce_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}
