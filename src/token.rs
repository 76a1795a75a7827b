// Credential store: a single access token persisted in a dot-file in
// the user's home directory. The token is acquired at most once per
// session, before the review screen opens, and is never validated up
// front; a bad token surfaces as a rejection on the first remote call.

use std::path::{Path, PathBuf};

use dialoguer::Password;
use tracing::debug;

use crate::error::ReviewError;

const TOKEN_FILE: &str = ".github_image_review_token";

fn token_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(TOKEN_FILE)
}

/// Read a stored token. A missing, unreadable, or blank file counts as
/// "no token".
pub fn load(path: &Path) -> Option<String> {
    let data = std::fs::read_to_string(path).ok()?;
    let token = data.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Persist a token, replacing any previous one.
pub fn store(path: &Path, token: &str) -> Result<(), ReviewError> {
    std::fs::write(path, token)?;
    Ok(())
}

/// Return the stored token, prompting for one on first use. Empty or
/// declined input aborts the workflow with `MissingCredential`; no
/// partial review UI is shown in that case.
pub fn load_or_prompt() -> Result<String, ReviewError> {
    let path = token_path();
    if let Some(token) = load(&path) {
        debug!("using stored access token");
        return Ok(token);
    }
    prompt_and_store(&path)
}

/// Prompt for a replacement token and persist it.
pub fn replace() -> Result<String, ReviewError> {
    prompt_and_store(&token_path())
}

fn prompt_and_store(path: &Path) -> Result<String, ReviewError> {
    let input = Password::new()
        .with_prompt("GitHub personal access token (repo contents:write permission)")
        .allow_empty_password(true)
        .interact()
        .map_err(|_| ReviewError::MissingCredential)?;
    let token = input.trim().to_string();
    if token.is_empty() {
        return Err(ReviewError::MissingCredential);
    }
    store(path, &token)?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn store_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token");
        store(&path, "ghp_abc123").unwrap();
        assert_eq!(load(&path), Some("ghp_abc123".to_string()));
    }

    #[test]
    fn load_of_missing_file_is_none() {
        let dir = tempdir().unwrap();
        assert_eq!(load(&dir.path().join("absent")), None);
    }

    #[test]
    fn blank_file_counts_as_no_token() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(load(&path), None);
    }

    #[test]
    fn load_trims_trailing_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "ghp_abc123\n").unwrap();
        assert_eq!(load(&path), Some("ghp_abc123".to_string()));
    }
}
