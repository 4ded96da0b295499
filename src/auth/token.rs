use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at_unix: Option<u64>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Token {
    const EXPIRY_SKEW_SECS: u64 = 30;

    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at_unix: None,
            token_type: default_token_type(),
        }
    }

    /// Tokens without an expiry never expire.
    pub fn is_expired(&self, now: SystemTime) -> bool {
        let Some(expires_at) = self.expires_at_unix else {
            return false;
        };

        let Ok(duration) = now.duration_since(UNIX_EPOCH) else {
            return false;
        };

        duration.as_secs().saturating_add(Self::EXPIRY_SKEW_SECS) >= expires_at
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn token_without_expiry_never_expires() {
        let token = Token::new("tok");
        assert!(!token.is_expired(at(u64::from(u32::MAX))));
    }

    #[test]
    fn expiry_accounts_for_skew() {
        let mut token = Token::new("tok");
        token.expires_at_unix = Some(1_000);

        assert!(!token.is_expired(at(900)));
        assert!(token.is_expired(at(975)));
        assert!(token.is_expired(at(2_000)));
    }

    #[test]
    fn decodes_minimal_record() {
        let token: Token = serde_json::from_str(r#"{"access_token":"tok1"}"#).expect("decode");
        assert_eq!(token, Token::new("tok1"));
        assert!(token.refresh_token.is_none());
    }
}
