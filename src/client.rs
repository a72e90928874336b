//! # Daemon API Client
//!
//! Thin bindings over the sync daemon's web UI control API. The daemon owns the
//! wire format; this module only knows the handful of actions the CLI needs:
//!
//! - `getsyncfolders` - list the synchronized folders and their peers
//! - `generatesecret` - mint a new secret pair
//! - `addsyncfolder` - register a local directory under a secret
//!
//! Every action goes through `GET /gui/?token=<token>&action=<name>` with HTTP
//! basic auth. The token comes from `/gui/token.html`, which also hands out the
//! session cookie the daemon expects on later calls, so the underlying client
//! keeps a cookie store.
//!
//! Command flows only see the [`SyncApi`] trait, which keeps them testable
//! without a running daemon.

use crate::config::Credentials;
use crate::error::{CliError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::debug;

/// A directory the daemon is synchronizing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFolder {
    /// Filesystem path of the folder on the daemon's host.
    pub name: String,
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub peers: Vec<Peer>,
}

/// A remote participant connected for a sync folder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub name: String,
    /// Raw status code, e.g. `downarrow>Synced`.
    pub status: String,
}

/// A freshly generated secret pair.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Secret {
    /// Full read-write secret.
    pub secret: String,
    /// Read-only variant; this is what new folders are registered with.
    pub rosecret: String,
}

/// Operations the CLI performs against the daemon.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SyncApi: Send + Sync {
    async fn list_sync_folders(&self) -> Result<Vec<SyncFolder>>;

    async fn generate_secret(&self) -> Result<Secret>;

    async fn add_sync_folder(&self, path: &str, secret: &str) -> Result<()>;
}

#[derive(Deserialize)]
struct FolderList {
    #[serde(default)]
    folders: Vec<SyncFolder>,
}

#[derive(Deserialize)]
struct ActionStatus {
    #[serde(default)]
    error: i64,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for a single daemon, authenticated with one set of credentials.
pub struct DaemonClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    token: OnceCell<String>,
}

impl DaemonClient {
    pub fn new(creds: &Credentials) -> Result<Self> {
        // The web UI lives on the daemon's host or LAN; never route it through
        // a proxy picked up from the environment.
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .no_proxy()
            .build()?;

        Ok(Self {
            http,
            base_url: creds.base_url(),
            username: creds.username.clone(),
            password: creds.password.clone(),
            token: OnceCell::new(),
        })
    }

    async fn token(&self) -> Result<&str> {
        let token = self
            .token
            .get_or_try_init(|| self.fetch_token())
            .await?;
        Ok(token.as_str())
    }

    async fn fetch_token(&self) -> Result<String> {
        let url = format!("{}/gui/token.html", self.base_url);
        debug!("Requesting session token from {}", url);

        let html = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_token(&html)
            .map(str::to_owned)
            .ok_or_else(|| CliError::Api {
                action: "token",
                reason: "no token found in /gui/token.html".to_string(),
            })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        action: &'static str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let token = self.token().await?;
        debug!("Calling daemon action {}", action);

        let response = self
            .http
            .get(format!("{}/gui/", self.base_url))
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("token", token), ("action", action)])
            .query(params)
            .send()
            .await?
            .error_for_status()?;

        response.json::<T>().await.map_err(|e| CliError::Api {
            action,
            reason: format!("unexpected response: {}", e),
        })
    }
}

#[async_trait]
impl SyncApi for DaemonClient {
    async fn list_sync_folders(&self) -> Result<Vec<SyncFolder>> {
        let list: FolderList = self.call("getsyncfolders", &[]).await?;
        Ok(list.folders)
    }

    async fn generate_secret(&self) -> Result<Secret> {
        self.call("generatesecret", &[]).await
    }

    async fn add_sync_folder(&self, path: &str, secret: &str) -> Result<()> {
        let status: ActionStatus = self
            .call("addsyncfolder", &[("name", path), ("secret", secret)])
            .await?;

        if status.error != 0 {
            return Err(CliError::Api {
                action: "addsyncfolder",
                reason: status
                    .message
                    .unwrap_or_else(|| format!("error code {}", status.error)),
            });
        }
        Ok(())
    }
}

/// Extract the token from the `<div id='token'>` element of `token.html`.
fn parse_token(html: &str) -> Option<&str> {
    let start = html
        .find("id='token'")
        .or_else(|| html.find("id=\"token\""))?;
    let rest = &html[start..];
    let open = rest.find('>')? + 1;
    let len = rest[open..].find('<')?;
    let token = rest[open..open + len].trim();
    (!token.is_empty()).then_some(token)
}
