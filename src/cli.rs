//! # Command Line Interface
//!
//! Argument parsing and command dispatch for btsyncli.
//!
//! ## Usage
//!
//! - `btsyncli list` - show every sync folder and the status of its peers
//! - `btsyncli --add <path> [--secret <secret>]` - start syncing a directory
//!
//! Connection flags (`--config`, `--host`, `--port`, `--user`, `--pass`) may be
//! given before or after the subcommand.

use crate::client::{DaemonClient, SyncApi};
use crate::config::{ConnectionOptions, Credentials, DEFAULT_HOST, DEFAULT_PORT};
use crate::folders::{self, DirPolicy};
use crate::prompt;
use crate::render::{self, ArrowStyle, Renderer, TerminalRenderer};
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

/// Command-line interface structure for btsyncli.
#[derive(Parser, Debug)]
#[command(name = "btsyncli")]
#[command(about = "A command line interface for btsync")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Add a sync folder, creating the directory if it does not exist
    #[arg(short = 'a', long = "add", value_name = "PATH")]
    pub add: Option<PathBuf>,

    /// Secret to add the folder with instead of generating one
    #[arg(short = 's', long, value_name = "SECRET", requires = "add")]
    pub secret: Option<String>,

    /// Daemon config file to read the web UI credentials from [default: ~/.sync/sync.conf]
    #[arg(short = 'c', long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Web UI host, used when no config file is found
    #[arg(short = 'H', long, default_value = DEFAULT_HOST, global = true)]
    pub host: String,

    /// Web UI port, used when no config file is found
    #[arg(short = 'P', long, default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,

    /// Web UI username, used when no config file is found [default: current user]
    #[arg(short = 'u', long, global = true)]
    pub user: Option<String>,

    /// Prompt for the web UI password
    #[arg(short = 'p', long = "pass", global = true)]
    pub pass: bool,

    /// Draw transfer directions with ASCII instead of Unicode arrows
    #[arg(long, global = true)]
    pub ascii: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// List sync folders and the status of their peers
    List,
}

impl Cli {
    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            config: self.config.clone(),
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            prompt_password: self.pass,
        }
    }

    pub fn arrow_style(&self) -> ArrowStyle {
        if self.ascii {
            ArrowStyle::Ascii
        } else {
            ArrowStyle::Unicode
        }
    }
}

/// Resolve credentials and run the requested commands.
///
/// With neither `list` nor `--add` the help text is printed. When both are
/// given the listing comes first.
pub async fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    if cli.command.is_none() && cli.add.is_none() {
        Cli::command().print_help()?;
        return Ok(());
    }

    let creds = Credentials::resolve(
        &cli.connection_options(),
        prompt::prompt_password,
        prompt::current_username,
    )?;
    tracing::debug!("Connecting to {}", creds.base_url());
    let client = DaemonClient::new(&creds)?;

    if cli.command == Some(Commands::List) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        list_folders(&client, &mut out, &TerminalRenderer, cli.arrow_style()).await?;
    }

    if let Some(path) = cli.add {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        add_folder(&client, &mut out, path, cli.secret, &DirPolicy::default()).await?;
    }

    Ok(())
}

/// Fetch the daemon's folders and print them as a tree.
pub async fn list_folders<W: Write>(
    api: &dyn SyncApi,
    out: &mut W,
    renderer: &dyn Renderer,
    arrows: ArrowStyle,
) -> Result<()> {
    let folders = api.list_sync_folders().await?;
    tracing::info!("Daemon reports {} sync folder(s)", folders.len());

    if folders.is_empty() {
        writeln!(out, "No folders are being synchronized.")?;
        return Ok(());
    }

    render::render_folders(out, &folders, renderer, arrows)
        .context("failed to write folder listing")?;
    Ok(())
}

/// Add `path` to the daemon and report what happened.
pub async fn add_folder<W: Write>(
    api: &dyn SyncApi,
    out: &mut W,
    path: PathBuf,
    secret: Option<String>,
    policy: &DirPolicy,
) -> Result<()> {
    let added = folders::add_folder(api, &path, secret, policy).await?;

    if added.created {
        writeln!(out, "📁 Created directory: {}", added.path.display())?;
    }
    writeln!(out, "✅ Added sync folder: {}", added.path.display())?;
    writeln!(out, "   Secret: {}", added.secret)?;

    Ok(())
}
