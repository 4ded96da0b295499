use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// OAuth client settings taken from a provider-issued `client_secret.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub auth_uri: String,
    pub token_uri: String,
    pub redirect_uri: String,
}

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecretSection>,
    web: Option<ClientSecretSection>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretSection {
    #[serde(default)]
    client_id: String,
    client_secret: Option<String>,
    auth_uri: Option<String>,
    token_uri: Option<String>,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

pub fn load(path: &Path) -> AppResult<OAuthConfig> {
    let raw = fs::read_to_string(path).map_err(|err| {
        AppError::Config(format!(
            "unable to read client secret file {}: {err}",
            path.display()
        ))
    })?;
    parse(&raw)
}

pub fn parse(raw: &str) -> AppResult<OAuthConfig> {
    let file: ClientSecretFile = serde_json::from_str(raw).map_err(|err| {
        AppError::Config(format!(
            "unable to parse client secret file to config: {err}"
        ))
    })?;

    let section = file.installed.or(file.web).ok_or_else(|| {
        AppError::Config(
            "client secret file has neither an `installed` nor a `web` section".to_string(),
        )
    })?;

    let client_id = section.client_id.trim();
    if client_id.is_empty() {
        return Err(AppError::Config(
            "client secret file is missing client_id".to_string(),
        ));
    }

    let redirect_uri = section
        .redirect_uris
        .into_iter()
        .find(|uri| !uri.trim().is_empty())
        .ok_or_else(|| {
            AppError::Config("client secret file is missing a redirect uri".to_string())
        })?;

    Ok(OAuthConfig {
        client_id: client_id.to_string(),
        client_secret: section.client_secret.filter(|secret| !secret.is_empty()),
        auth_uri: section
            .auth_uri
            .unwrap_or_else(|| GOOGLE_AUTH_ENDPOINT.to_string()),
        token_uri: section
            .token_uri
            .unwrap_or_else(|| GOOGLE_TOKEN_ENDPOINT.to_string()),
        redirect_uri,
    })
}
