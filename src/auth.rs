//! Authentication capability and the credential-table adapter backing it.
//!
//! The service only consumes [`Authenticator::verify`]; where the table
//! lives is the adapter's business. The bundled adapter reads a TOML file of
//! `[[users]]` entries so deployments never embed passwords in the binary.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::model::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("unknown username")]
    UnknownUser,
    #[error("wrong password")]
    WrongPassword,
}

/// Credential verification consumed by the login route.
pub trait Authenticator: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> Result<Role, AuthError>;
}

/// One row of the credential table.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialEntry {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    users: Vec<CredentialEntry>,
}

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("failed to read credentials file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse credentials file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("duplicate username in credential table: {0}")]
    DuplicateUser(String),
}

/// Fixed in-memory table of username to (password, role).
pub struct StaticAuthenticator {
    users: HashMap<String, (String, Role)>,
}

impl StaticAuthenticator {
    pub fn from_entries(
        entries: impl IntoIterator<Item = CredentialEntry>,
    ) -> Result<Self, CredentialsError> {
        let mut users = HashMap::new();
        for CredentialEntry {
            username,
            password,
            role,
        } in entries
        {
            if users.contains_key(&username) {
                return Err(CredentialsError::DuplicateUser(username));
            }
            users.insert(username, (password, role));
        }
        Ok(Self { users })
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, CredentialsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CredentialsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let file: CredentialsFile =
            toml::from_str(&raw).map_err(|source| CredentialsError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_entries(file.users)
    }
}

impl Authenticator for StaticAuthenticator {
    fn verify(&self, username: &str, password: &str) -> Result<Role, AuthError> {
        match self.users.get(username) {
            None => Err(AuthError::UnknownUser),
            Some((stored, _)) if stored != password => Err(AuthError::WrongPassword),
            Some((_, role)) => Ok(*role),
        }
    }
}
