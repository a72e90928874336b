//! # btsyncli
//!
//! A command-line client for the btsync peer-to-peer file synchronization
//! daemon. It talks to the daemon's local web UI control API to show which
//! folders are synchronized and how their peers are doing, and to register new
//! folders.
//!
//! ## Core Modules
//!
//! - [`cli`] - Argument parsing and command dispatch
//! - [`config`] - Credential resolution from the daemon config file or flags
//! - [`client`] - HTTP bindings to the daemon's control API
//! - [`folders`] - Duplicate detection and the add-folder flow
//! - [`render`] - Status formatting and the folder/peer listing
//! - [`prompt`] - Masked password prompt and OS user lookup
//! - [`error`] - Error taxonomy
//!
//! ## Quick Start
//!
//! ```bash
//! # List folders using ~/.sync/sync.conf
//! btsyncli list
//!
//! # Without a config file, prompt for the password
//! btsyncli --host 192.168.1.10 --user admin --pass list
//!
//! # Start syncing a directory with a generated read-only secret
//! btsyncli --add /srv/sync/photos
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod folders;
pub mod prompt;
pub mod render;

pub use client::{DaemonClient, SyncApi};
pub use config::Credentials;
pub use error::CliError;
