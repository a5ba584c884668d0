//! Validated run configuration.
//!
//! The CLI layer collects raw arguments; this module turns them into a
//! [`Config`] or rejects the combination up front, before any socket is
//! opened.  The rules mirror the tool's contract:
//!
//! - exactly one of server / client mode;
//! - `--file` is required for the client and forbidden for the server;
//! - the window size is client-chosen (positive); the server runs with the
//!   fixed window [`SERVER_WINDOW`] and rejects any other value;
//! - `--discard` is a server-side test hook and forbidden for the client.

use std::net::IpAddr;
use std::path::PathBuf;

/// Window size the server operates with; only the client may choose another.
pub const SERVER_WINDOW: u16 = 3;

/// Which half of the protocol this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Server,
    Client,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Server => write!(f, "server"),
            Role::Client => write!(f, "client"),
        }
    }
}

/// A fully validated run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub role: Role,
    /// Server: address to bind.  Client: address of the server.
    pub ip: IpAddr,
    pub port: u16,
    /// Source file to transfer; present exactly when `role == Client`.
    pub file: Option<PathBuf>,
    /// Sliding-window size (segments).
    pub window: u16,
    /// Sequence number the server drops once, for testing; `None` normally.
    pub discard: Option<u16>,
}

impl Config {
    /// Validate raw argument values into a [`Config`].
    pub fn new(
        role: Role,
        ip: IpAddr,
        port: u16,
        file: Option<PathBuf>,
        window: u16,
        discard: Option<u16>,
    ) -> Result<Self, ConfigError> {
        if window == 0 {
            return Err(ConfigError::InvalidWindow(window));
        }
        match role {
            Role::Server => {
                if file.is_some() {
                    return Err(ConfigError::FileOnServer);
                }
                if window != SERVER_WINDOW {
                    return Err(ConfigError::WindowOnServer(window));
                }
            }
            Role::Client => {
                if file.is_none() {
                    return Err(ConfigError::FileMissing);
                }
                if discard.is_some() {
                    return Err(ConfigError::DiscardOnClient);
                }
            }
        }
        Ok(Self {
            role,
            ip,
            port,
            file,
            window,
            discard,
        })
    }
}

/// Invalid role/argument combinations.  Always fatal, never retried.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `--file` given in server mode.
    FileOnServer,
    /// `--file` missing in client mode.
    FileMissing,
    /// Window size of zero, in either mode.
    InvalidWindow(u16),
    /// Server mode with a window other than [`SERVER_WINDOW`].
    WindowOnServer(u16),
    /// `--discard` given in client mode.
    DiscardOnClient,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileOnServer => {
                write!(f, "server mode does not take a --file argument")
            }
            ConfigError::FileMissing => {
                write!(f, "client mode requires a --file argument")
            }
            ConfigError::InvalidWindow(w) => {
                write!(f, "invalid window size {w}: must be a positive integer")
            }
            ConfigError::WindowOnServer(w) => {
                write!(
                    f,
                    "only the client may change the window size (got {w}, server uses {SERVER_WINDOW})"
                )
            }
            ConfigError::DiscardOnClient => {
                write!(f, "client mode does not take a --discard argument")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
