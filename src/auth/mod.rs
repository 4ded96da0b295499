pub mod credentials;
pub mod oauth;
pub mod prompt;
pub mod session;
pub mod token;
pub mod token_store;

pub use credentials::CredentialManager;
pub use oauth::{AuthorizationRequest, Authorizer, OAuthClient};
pub use prompt::{AuthCodeProvider, ConsoleCodeProvider};
pub use session::AuthorizedSession;
pub use token::Token;
pub use token_store::{FileTokenStore, TokenStore, load_token, persist_token};
