//! Remote archive store over SFTP.
//!
//! Fetches the same date-partitioned layout as [`super::LocalArchiveStore`],
//! but from a remote host. A connection is established per day fetch and
//! dropped afterwards; credentials are never held beyond the fetch.

use super::{archive_rel_path, parse_archive, ArchiveStore, SshCredentials};
use crate::error::{EngineError, Result};
use crate::models::LogEntry;
use chrono::NaiveDate;
use ssh2::{ErrorCode, Session};
use std::io::BufReader;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

// SSH_FX_NO_SUCH_FILE, per the SFTP protocol.
const SFTP_NO_SUCH_FILE: i32 = 2;

/// Reads date-partitioned JSON-lines archives from a remote host over SFTP.
///
/// Connection and read operations are bounded by the configured timeout; a
/// timeout surfaces as a [`EngineError::Transport`] for that day, never as a
/// silent empty result.
pub struct RemoteArchiveStore {
    root: PathBuf,
    credentials: SshCredentials,
    timeout: Duration,
}

impl RemoteArchiveStore {
    /// Creates a store reading from `root` on the host named by the
    /// credentials.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, credentials: SshCredentials, timeout: Duration) -> Self {
        Self {
            root: root.into(),
            credentials,
            timeout,
        }
    }

    fn connect(&self) -> Result<Session> {
        let creds = &self.credentials;
        let addr = (creds.host.as_str(), creds.port)
            .to_socket_addrs()
            .map_err(|e| EngineError::Transport(format!("resolve {}: {e}", creds.host)))?
            .next()
            .ok_or_else(|| {
                EngineError::Transport(format!("no address for host {}", creds.host))
            })?;

        let stream = TcpStream::connect_timeout(&addr, self.timeout)
            .map_err(|e| EngineError::Transport(format!("connect {addr}: {e}")))?;
        stream
            .set_read_timeout(Some(self.timeout))
            .map_err(|e| EngineError::Transport(format!("set read timeout: {e}")))?;

        let mut session =
            Session::new().map_err(|e| EngineError::Transport(format!("ssh session: {e}")))?;
        session.set_tcp_stream(stream);
        session.set_timeout(u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX));
        session
            .handshake()
            .map_err(|e| EngineError::Transport(format!("ssh handshake: {e}")))?;

        if let Some(ref password) = creds.password {
            session
                .userauth_password(&creds.username, password)
                .map_err(|e| EngineError::Transport(format!("password auth: {e}")))?;
        } else if let Some(ref key_path) = creds.key_path {
            session
                .userauth_pubkey_file(&creds.username, None, key_path, None)
                .map_err(|e| EngineError::Transport(format!("key auth: {e}")))?;
        } else {
            return Err(EngineError::Validation(
                "SSH credentials need a password or a key path".to_string(),
            ));
        }

        Ok(session)
    }

    fn fetch(&self, path: &Path) -> Result<Option<Vec<LogEntry>>> {
        let session = self.connect()?;
        let sftp = session
            .sftp()
            .map_err(|e| EngineError::Transport(format!("sftp channel: {e}")))?;

        let file = match sftp.open(path) {
            Ok(file) => file,
            Err(e) if e.code() == ErrorCode::SFTP(SFTP_NO_SUCH_FILE) => return Ok(None),
            Err(e) => {
                return Err(EngineError::Transport(format!(
                    "open {}: {e}",
                    path.display()
                )))
            }
        };

        let (entries, skipped) = parse_archive(BufReader::new(file), path);
        if skipped > 0 {
            tracing::warn!(file = %path.display(), skipped,
                "Remote archive contained malformed lines");
        }
        Ok(Some(entries))
    }
}

impl ArchiveStore for RemoteArchiveStore {
    fn load_day(&self, date: NaiveDate) -> Result<Vec<LogEntry>> {
        let path = self.root.join(archive_rel_path(date));
        match self.fetch(&path)? {
            Some(entries) => Ok(entries),
            None => {
                tracing::debug!(file = %path.display(), "No remote archive partition for day");
                Ok(Vec::new())
            }
        }
    }
}
