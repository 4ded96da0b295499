use std::io::Write;

use crate::api::GmailClient;
use crate::auth::{
    AuthCodeProvider, AuthorizedSession, ConsoleCodeProvider, CredentialManager, FileTokenStore,
    OAuthClient,
};
use crate::cli::Cli;
use crate::config::{self, AppConfig};
use crate::error::AppResult;
use crate::fetcher::{FetchSummary, ThreadFetcher};

pub async fn run(cli: Cli) -> AppResult<()> {
    let config = AppConfig::discover(&cli);
    let mut codes = ConsoleCodeProvider::stdio();
    let mut client = get_authenticated_client(&config, &mut codes).await?;

    let stdout = std::io::stdout();
    print_threads(&mut client, &config.user_id, stdout.lock()).await?;
    Ok(())
}

/// Loads the client secret and a cached or freshly authorized token, and
/// binds both to a Gmail client.
pub async fn get_authenticated_client<P: AuthCodeProvider>(
    config: &AppConfig,
    codes: &mut P,
) -> AppResult<GmailClient> {
    let oauth = OAuthClient::new(config::load_client_secret(config)?);
    let store = FileTokenStore::new(config::resolve_cache_path(config)?);
    tracing::debug!(path = %store.path().display(), "token cache");

    let token = CredentialManager::load_or_acquire(&store, &oauth, codes).await?;

    let session = AuthorizedSession::new(token, oauth, store);
    Ok(GmailClient::new(session))
}

pub async fn print_threads<W: Write>(
    client: &mut GmailClient,
    user_id: &str,
    out: W,
) -> AppResult<FetchSummary> {
    let summary = ThreadFetcher::new(client, user_id, out).run().await?;
    tracing::debug!(
        pages = summary.pages,
        threads = summary.threads,
        printed_threads = summary.printed_threads,
        lines = summary.lines,
        "finished listing threads"
    );
    Ok(summary)
}
