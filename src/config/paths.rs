use std::fs;
use std::path::{Path, PathBuf};

use url::form_urlencoded::byte_serialize;

use crate::cli::Cli;
use crate::error::{AppError, AppResult};

const CACHE_DIR: &str = ".credentials";
const CACHE_FILE: &str = "gmail.json";

/// Everything the startup routine would otherwise read from the process
/// environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub home_dir: Option<PathBuf>,
    pub secret_file: PathBuf,
    pub cache_dir_name: String,
    pub cache_file_name: String,
    pub user_id: String,
}

impl AppConfig {
    pub fn discover(cli: &Cli) -> Self {
        Self {
            home_dir: dirs::home_dir(),
            secret_file: cli.client_secret.clone(),
            cache_dir_name: CACHE_DIR.to_string(),
            cache_file_name: CACHE_FILE.to_string(),
            user_id: cli.user.trim().to_string(),
        }
    }

    /// Config rooted at `home_dir` with the default cache names.
    pub fn with_home(home_dir: impl Into<PathBuf>, secret_file: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: Some(home_dir.into()),
            secret_file: secret_file.into(),
            cache_dir_name: CACHE_DIR.to_string(),
            cache_file_name: CACHE_FILE.to_string(),
            user_id: "me".to_string(),
        }
    }

    pub fn cache_dir(&self) -> AppResult<PathBuf> {
        let home = self
            .home_dir
            .as_deref()
            .ok_or_else(|| AppError::Config("unable to resolve home directory".to_string()))?;
        Ok(home.join(&self.cache_dir_name))
    }
}

/// Resolves the token cache file, creating its directory owner-only when absent.
pub fn resolve_cache_path(config: &AppConfig) -> AppResult<PathBuf> {
    let cache_dir = config.cache_dir()?;
    create_private_dir(&cache_dir)?;

    let file_name: String = byte_serialize(config.cache_file_name.as_bytes()).collect();
    Ok(cache_dir.join(file_name))
}

fn create_private_dir(dir: &Path) -> AppResult<()> {
    if dir.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;

        builder.mode(0o700);
    }

    builder.create(dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_cache_path_under_home() {
        let home = tempfile::tempdir().expect("tempdir");
        let config = AppConfig::with_home(home.path(), "client_secret.json");

        let path = resolve_cache_path(&config).expect("cache path");
        assert_eq!(path, home.path().join(".credentials").join("gmail.json"));
        assert!(home.path().join(".credentials").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn creates_cache_dir_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let home = tempfile::tempdir().expect("tempdir");
        let config = AppConfig::with_home(home.path(), "client_secret.json");
        resolve_cache_path(&config).expect("cache path");

        let mode = fs::metadata(home.path().join(".credentials"))
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn escapes_cache_file_name() {
        let home = tempfile::tempdir().expect("tempdir");
        let mut config = AppConfig::with_home(home.path(), "client_secret.json");
        config.cache_file_name = "my gmail/token.json".to_string();

        let path = resolve_cache_path(&config).expect("cache path");
        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some("my+gmail%2Ftoken.json")
        );
    }

    #[test]
    fn fails_without_home_directory() {
        let mut config = AppConfig::with_home("/unused", "client_secret.json");
        config.home_dir = None;

        let err = resolve_cache_path(&config).expect_err("should fail");
        assert!(matches!(err, AppError::Config(_)));
    }
}
