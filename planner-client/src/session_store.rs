use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
#[cfg(unix)]
use std::{io::Write, os::unix::fs::OpenOptionsExt};

/// The bearer token issued at login, kept between CLI invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl StoredSession {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

pub(crate) fn root_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Cannot determine config directory")?
        .join("planner"))
}

fn secure_write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    #[cfg(unix)]
    {
        std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?
            .write_all(content.as_bytes())?;
    }

    #[cfg(not(unix))]
    {
        std::fs::write(path, content)?;
    }

    Ok(())
}

pub fn session_path() -> Result<PathBuf> {
    Ok(root_path()?.join("session.toml"))
}

/// Load the saved session. Missing, empty or expired sessions read as `None`.
pub fn load_session() -> Result<Option<StoredSession>> {
    load_session_from(&session_path()?, OffsetDateTime::now_utc())
}

pub fn save_session(session: &StoredSession) -> Result<()> {
    save_session_to(&session_path()?, session)
}

pub fn clear_session() -> Result<()> {
    clear_session_at(&session_path()?)
}

pub fn load_session_from(path: &Path, now: OffsetDateTime) -> Result<Option<StoredSession>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path).context("Failed to read session file")?;
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let session: StoredSession = toml::from_str(&raw)
        .with_context(|| format!("Failed to parse session at {}", path.display()))?;
    if session.is_expired(now) {
        return Ok(None);
    }
    Ok(Some(session))
}

pub fn save_session_to(path: &Path, session: &StoredSession) -> Result<()> {
    let raw = toml::to_string_pretty(session).context("Failed to serialize session")?;
    secure_write(path, &raw)
}

pub fn clear_session_at(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use time::{macros::datetime, Duration};

    use super::*;

    fn session() -> StoredSession {
        StoredSession {
            token: "token-value".into(),
            username: "alice".into(),
            expires_at: datetime!(2024-05-01 12:00 UTC),
        }
    }

    #[test]
    fn saved_session_loads_until_it_expires() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.toml");

        save_session_to(&path, &session()).unwrap();

        let before = datetime!(2024-05-01 11:00 UTC);
        assert_eq!(load_session_from(&path, before).unwrap(), Some(session()));

        let after = session().expires_at + Duration::seconds(1);
        assert_eq!(load_session_from(&path, after).unwrap(), None);
    }

    #[test]
    fn missing_or_cleared_session_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        let now = datetime!(2024-05-01 11:00 UTC);

        assert_eq!(load_session_from(&path, now).unwrap(), None);

        save_session_to(&path, &session()).unwrap();
        clear_session_at(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_session_from(&path, now).unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        save_session_to(&path, &session()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
