use crate::error::AppResult;

use super::oauth::Authorizer;
use super::prompt::AuthCodeProvider;
use super::token::Token;
use super::token_store::TokenStore;

#[derive(Debug, Default)]
pub struct CredentialManager;

impl CredentialManager {
    /// Returns the cached token, or runs the interactive flow and caches its result.
    ///
    /// A cached token is trusted as-is; expiry is the session's concern.
    pub async fn load_or_acquire<S, A, P>(
        store: &S,
        authorizer: &A,
        codes: &mut P,
    ) -> AppResult<Token>
    where
        S: TokenStore,
        A: Authorizer,
        P: AuthCodeProvider,
    {
        match store.load() {
            Ok(token) => {
                tracing::debug!("using cached oauth token");
                Ok(token)
            }
            Err(err) => {
                tracing::debug!("no usable cached token ({err}); starting authorization");
                let token = Self::acquire_interactively(authorizer, codes).await?;
                store.save(&token)?;
                if let Some(location) = store.location() {
                    codes.token_saved(location)?;
                }
                Ok(token)
            }
        }
    }

    pub async fn acquire_interactively<A, P>(authorizer: &A, codes: &mut P) -> AppResult<Token>
    where
        A: Authorizer,
        P: AuthCodeProvider,
    {
        let request = authorizer.authorization_request()?;
        let code = codes.authorization_code(&request.url)?;
        let token = authorizer.exchange_code(&request, &code).await?;
        tracing::info!("obtained oauth token from authorization code");
        Ok(token)
    }
}
