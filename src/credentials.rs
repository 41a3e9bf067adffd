// Token persistence. The pipeline only ever calls `load`; `save` is used by
// the `auth` command.

use crate::error::{PinataError, Result};
use crate::types::Credential;
use std::io::ErrorKind;
use std::path::PathBuf;

const TOKEN_FILE: &str = ".pinata-cli";

/// Source of the bearer token used for authenticated calls.
pub trait CredentialStore {
    fn load(&self) -> Result<Credential>;
}

/// Token stored as plain text in a single file, by default in the user's
/// home directory.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenFile { path: path.into() }
    }

    /// `~/.pinata-cli`, falling back to the current directory when no home
    /// directory can be determined.
    pub fn in_home() -> Self {
        let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        TokenFile::new(dir.join(TOKEN_FILE))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn save(&self, credential: &Credential) -> Result<()> {
        write_private(&self.path, credential.token()).map_err(|source| {
            PinataError::CredentialIo {
                path: self.path.clone(),
                source,
            }
        })
    }
}

impl CredentialStore for TokenFile {
    fn load(&self) -> Result<Credential> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(PinataError::CredentialMissing),
            Err(source) => {
                return Err(PinataError::CredentialIo {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let credential = Credential::new(data);
        if credential.is_empty() {
            return Err(PinataError::CredentialMissing);
        }
        Ok(credential)
    }
}

/// In-memory store, handy when the token comes from somewhere other than disk.
impl CredentialStore for Option<Credential> {
    fn load(&self) -> Result<Credential> {
        self.clone().ok_or(PinataError::CredentialMissing)
    }
}

#[cfg(unix)]
fn write_private(path: &PathBuf, contents: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // An existing file keeps its old mode on open.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &PathBuf, contents: &str) -> std::io::Result<()> {
    std::fs::write(path, contents)
}
