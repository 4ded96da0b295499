use std::time::SystemTime;

use crate::error::AppResult;

use super::oauth::Authorizer;
use super::token::Token;
use super::token_store::TokenStore;

/// Hands out access tokens, refreshing the current one once it expires.
#[derive(Debug)]
pub struct AuthorizedSession<A, S> {
    token: Token,
    authorizer: A,
    store: S,
}

impl<A: Authorizer, S: TokenStore> AuthorizedSession<A, S> {
    pub fn new(token: Token, authorizer: A, store: S) -> Self {
        Self {
            token,
            authorizer,
            store,
        }
    }

    pub async fn access_token(&mut self) -> AppResult<String> {
        self.access_token_at(SystemTime::now()).await
    }

    async fn access_token_at(&mut self, now: SystemTime) -> AppResult<String> {
        if !self.token.is_expired(now) {
            return Ok(self.token.access_token.clone());
        }

        let Some(refresh_token) = self.token.refresh_token.clone() else {
            tracing::debug!("access token expired and no refresh token is stored");
            return Ok(self.token.access_token.clone());
        };

        tracing::debug!("refreshing expired access token");
        let mut refreshed = self.authorizer.refresh(&refresh_token).await?;
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = Some(refresh_token);
        }

        self.store.save(&refreshed)?;
        self.token = refreshed;
        Ok(self.token.access_token.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::time::{Duration, UNIX_EPOCH};

    use super::*;
    use crate::auth::oauth::AuthorizationRequest;
    use crate::auth::token_store::FileTokenStore;
    use crate::error::AppError;

    #[derive(Default)]
    struct FakeAuthorizer {
        refreshes: Cell<usize>,
    }

    impl Authorizer for FakeAuthorizer {
        fn authorization_request(&self) -> AppResult<AuthorizationRequest> {
            Err(AppError::Auth("not used".to_string()))
        }

        async fn exchange_code(&self, _: &AuthorizationRequest, _: &str) -> AppResult<Token> {
            Err(AppError::Auth("not used".to_string()))
        }

        async fn refresh(&self, _refresh_token: &str) -> AppResult<Token> {
            self.refreshes.set(self.refreshes.get() + 1);
            Ok(Token::new("fresh"))
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: RefCell<Vec<Token>>,
    }

    impl TokenStore for MemoryStore {
        fn load(&self) -> AppResult<Token> {
            self.saved
                .borrow()
                .last()
                .cloned()
                .ok_or_else(|| AppError::InvalidInput("empty".to_string()))
        }

        fn save(&self, token: &Token) -> AppResult<()> {
            self.saved.borrow_mut().push(token.clone());
            Ok(())
        }
    }

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn expiring_token(refresh: Option<&str>) -> Token {
        let mut token = Token::new("stale");
        token.expires_at_unix = Some(1_000);
        token.refresh_token = refresh.map(ToOwned::to_owned);
        token
    }

    #[tokio::test]
    async fn valid_token_is_used_as_is() {
        let mut session = AuthorizedSession::new(
            expiring_token(Some("r1")),
            FakeAuthorizer::default(),
            MemoryStore::default(),
        );

        assert_eq!(
            session.access_token_at(at(10)).await.expect("token"),
            "stale"
        );
        assert_eq!(session.authorizer.refreshes.get(), 0);
        assert!(session.store.saved.borrow().is_empty());
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_persisted() {
        let mut session = AuthorizedSession::new(
            expiring_token(Some("r1")),
            FakeAuthorizer::default(),
            MemoryStore::default(),
        );

        assert_eq!(
            session.access_token_at(at(5_000)).await.expect("token"),
            "fresh"
        );
        assert_eq!(session.authorizer.refreshes.get(), 1);

        let saved = session.store.saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].access_token, "fresh");
        assert_eq!(saved[0].refresh_token.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn expired_token_without_refresh_is_passed_through() {
        let mut session = AuthorizedSession::new(
            expiring_token(None),
            FakeAuthorizer::default(),
            MemoryStore::default(),
        );

        assert_eq!(
            session.access_token_at(at(5_000)).await.expect("token"),
            "stale"
        );
        assert_eq!(session.authorizer.refreshes.get(), 0);
    }

    #[tokio::test]
    async fn refresh_rewrites_the_token_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = AuthorizedSession::new(
            expiring_token(Some("r1")),
            FakeAuthorizer::default(),
            FileTokenStore::new(dir.path().join("gmail.json")),
        );

        let token = session.access_token_at(at(5_000)).await.expect("token");

        assert_eq!(token, "fresh");
        let saved = session.store.load().expect("saved");
        assert_eq!(saved.access_token, "fresh");
        assert_eq!(saved.refresh_token.as_deref(), Some("r1"));
    }
}
