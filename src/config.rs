//! # Credential Resolution
//!
//! This module works out how to reach the sync daemon's web UI. Credentials come
//! from one of two mutually exclusive sources:
//!
//! - The daemon's own config file (`~/.sync/sync.conf` unless `--config` says
//!   otherwise), whose `webui` section carries the listen address, login and
//!   password.
//! - Command-line flags, the invoking OS user and, when `--pass` is given, an
//!   interactive password prompt.
//!
//! The config file wins whenever it exists. Only a missing file falls back to
//! the flags; a file that exists but cannot be read or parsed is fatal.

use crate::error::{CliError, Result};
use serde::Deserialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8888;

/// Everything needed to authenticate against the daemon's web UI.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

// Keep the password out of debug output and logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection-related command-line options, as handed over by the CLI layer.
#[derive(Clone, Debug)]
pub struct ConnectionOptions {
    pub config: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub prompt_password: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            config: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: None,
            prompt_password: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SyncConf {
    webui: WebUi,
}

#[derive(Debug, Deserialize)]
struct WebUi {
    listen: String,
    login: String,
    password: String,
}

impl Credentials {
    /// Resolve credentials from the config file, or from the flags if the file
    /// does not exist.
    ///
    /// `prompt` is only called when the fallback path is taken and
    /// `--pass` was given; `os_user` supplies the username when `--user` is
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingCredential`] when neither source produced a
    /// password, and config/prompt errors as they occur.
    pub fn resolve<P, U>(opts: &ConnectionOptions, prompt: P, os_user: U) -> Result<Self>
    where
        P: FnOnce() -> Result<String>,
        U: FnOnce() -> Option<String>,
    {
        let config_path = opts.config.clone().or_else(default_config_path);

        if let Some(path) = config_path.as_deref() {
            if let Some(creds) = Self::from_config_file(path)? {
                info!("Using credentials from {}", path.display());
                return Ok(creds);
            }
            debug!("Config file {} not found, falling back to flags", path.display());
        }

        let password = if opts.prompt_password {
            Some(prompt()?)
        } else {
            None
        };
        let password = password.ok_or(CliError::MissingCredential)?;

        let username = opts
            .user
            .clone()
            .or_else(os_user)
            .unwrap_or_default();

        Ok(Self {
            host: opts.host.clone(),
            port: opts.port,
            username,
            password,
        })
    }

    /// Load credentials from a daemon config file.
    ///
    /// Returns `Ok(None)` when the file does not exist. Any other read failure,
    /// a parse failure or a malformed `webui.listen` value is an error.
    pub fn from_config_file(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CliError::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::from_config_str(&content, path).map(Some)
    }

    fn from_config_str(content: &str, path: &Path) -> Result<Self> {
        let parse_err = |reason: String| CliError::ConfigParse {
            path: path.to_path_buf(),
            reason,
        };

        let conf: SyncConf = json5::from_str(content).map_err(|e| parse_err(e.to_string()))?;
        let (host, port) = split_listen(&conf.webui.listen).map_err(parse_err)?;

        Ok(Self {
            host,
            port,
            username: conf.webui.login,
            password: conf.webui.password,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Split a `host:port` listen address on its last colon.
fn split_listen(listen: &str) -> std::result::Result<(String, u16), String> {
    let (host, port) = listen
        .rsplit_once(':')
        .ok_or_else(|| format!("webui.listen '{}' is not of the form host:port", listen))?;
    let port = port
        .parse::<u16>()
        .map_err(|_| format!("webui.listen '{}' has an invalid port", listen))?;
    Ok((host.to_string(), port))
}

/// The daemon's default config location, `~/.sync/sync.conf`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".sync").join("sync.conf"))
}
