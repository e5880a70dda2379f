//! Earthdata login credentials.

use std::path::Path;

use thiserror::Error;

/// Errors raised while loading credentials.
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("Failed to read credentials file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credentials file is malformed: expected \"username,password\"")]
    Malformed,
}

/// A username/password pair for the data server.
///
/// Loaded once and held for the lifetime of the client; never refreshed or
/// validated independently of use.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Load credentials from a two-field file.
    ///
    /// The file is split on the first comma only, so the password may itself
    /// contain commas. Surrounding line endings are trimmed.
    pub fn from_file(path: &Path) -> Result<Self, CredentialsError> {
        let content = std::fs::read_to_string(path)?;
        let content = content.trim_end_matches(['\r', '\n']);

        let (username, password) = content
            .split_once(',')
            .ok_or(CredentialsError::Malformed)?;

        Ok(Self::new(username, password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "jdoe,hunter2").unwrap();

        let creds = Credentials::from_file(file.path()).unwrap();
        assert_eq!(creds.username, "jdoe");
        assert_eq!(creds.password, "hunter2");
    }

    #[test]
    fn test_from_file_password_with_comma() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "jdoe,pass,word\n").unwrap();

        let creds = Credentials::from_file(file.path()).unwrap();
        assert_eq!(creds.username, "jdoe");
        assert_eq!(creds.password, "pass,word");
    }

    #[test]
    fn test_from_file_missing_comma() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "no separator here").unwrap();

        assert!(matches!(
            Credentials::from_file(file.path()),
            Err(CredentialsError::Malformed)
        ));
    }
}
