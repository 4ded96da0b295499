use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::AppResult;

use super::Token;

pub trait TokenStore {
    /// Fails when no token is stored or the stored record cannot be decoded.
    fn load(&self) -> AppResult<Token>;
    fn save(&self, token: &Token) -> AppResult<()>;

    /// Where saved tokens end up, for stores that have a user-visible location.
    fn location(&self) -> Option<&Path> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> AppResult<Token> {
        load_token(&self.path)
    }

    fn save(&self, token: &Token) -> AppResult<()> {
        persist_token(&self.path, token)
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

pub fn load_token(path: &Path) -> AppResult<Token> {
    let raw = fs::read_to_string(path)?;
    let token = serde_json::from_str(&raw)?;
    Ok(token)
}

pub fn persist_token(path: &Path, token: &Token) -> AppResult<()> {
    tracing::info!(path = %path.display(), "saving credential file");

    let payload = serde_json::to_string_pretty(token)?;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;

        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(payload.as_bytes())?;

    // mode() only applies on creation
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = file.metadata()?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}
