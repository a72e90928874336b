//! # Sync Folder Management
//!
//! Adding a directory to the daemon:
//!
//! 1. Refuse if the daemon already syncs the same absolute path.
//! 2. Generate a read-only secret unless a non-empty one was supplied.
//! 3. Create the directory if needed, with the sync permission and group policy.
//! 4. Register it with the daemon.
//!
//! Nothing is rolled back. If step 3 creates the directory and step 4 fails,
//! the directory stays on disk without being registered.

use crate::client::SyncApi;
use crate::error::{CliError, Result};
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

const S_ISVTX: u32 = 0o1000;
const S_IRWXU: u32 = 0o0700;
const S_IRGRP: u32 = 0o0040;
const S_IXGRP: u32 = 0o0010;
const S_IROTH: u32 = 0o0004;
const S_IXOTH: u32 = 0o0001;

/// Sticky bit plus `rwxr-xr-x` (0o1755).
pub const SYNC_DIR_MODE: u32 = S_ISVTX | S_IRWXU | S_IRGRP | S_IXGRP | S_IROTH | S_IXOTH;

/// Group that newly created sync directories are handed to.
pub const SYNC_GROUP_ID: u32 = 1002;

/// Permissions and ownership applied to directories the CLI creates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirPolicy {
    pub mode: u32,
    /// Group to assign; the owning user is never changed.
    pub group: Option<u32>,
}

impl Default for DirPolicy {
    fn default() -> Self {
        Self {
            mode: SYNC_DIR_MODE,
            group: Some(SYNC_GROUP_ID),
        }
    }
}

/// Outcome of a successful [`add_folder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddedFolder {
    pub path: PathBuf,
    pub secret: String,
    /// Whether the directory had to be created.
    pub created: bool,
}

/// Make `path` absolute against the current directory and lexically remove
/// `.` and `..` components. Symlinks are not resolved.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| CliError::fs("resolve current directory for", path, e))?;
        cwd.join(path)
    };
    Ok(normalize(&joined))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Whether the daemon already syncs a folder at the same absolute path.
pub async fn folder_exists(api: &dyn SyncApi, path: &Path) -> Result<bool> {
    let target = absolute_path(path)?;

    for folder in api.list_sync_folders().await? {
        if absolute_path(Path::new(&folder.name))? == target {
            debug!("{} is already synced as {}", target.display(), folder.name);
            return Ok(true);
        }
    }

    Ok(false)
}

/// Create `path` (and its parents) and apply `policy` to it.
pub fn prepare_directory(path: &Path, policy: &DirPolicy) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| CliError::fs("create directory", path, e))?;
    fs::set_permissions(path, fs::Permissions::from_mode(policy.mode))
        .map_err(|e| CliError::fs("set permissions on", path, e))?;
    if let Some(gid) = policy.group {
        std::os::unix::fs::chown(path, None, Some(gid))
            .map_err(|e| CliError::fs("change group of", path, e))?;
    }

    info!(
        "Created {} with mode {:o}, group {:?}",
        path.display(),
        policy.mode,
        policy.group
    );
    Ok(())
}

/// Register `path` with the daemon, creating the directory first if needed.
///
/// # Errors
///
/// Returns [`CliError::DuplicateFolder`] without touching the filesystem or
/// calling the add action when the daemon already syncs the path, and a
/// [`CliError::Filesystem`] before contacting the daemon when the path is not
/// valid UTF-8. API and filesystem errors stop the flow at the step that failed.
pub async fn add_folder(
    api: &dyn SyncApi,
    path: &Path,
    secret: Option<String>,
    policy: &DirPolicy,
) -> Result<AddedFolder> {
    let path = absolute_path(path)?;
    // The daemon takes the folder name as text.
    let name = match path.to_str() {
        Some(name) => name.to_owned(),
        None => {
            let reason = io::Error::new(io::ErrorKind::InvalidData, "path is not valid UTF-8");
            return Err(CliError::fs("register", path, reason));
        }
    };

    if folder_exists(api, &path).await? {
        return Err(CliError::DuplicateFolder(path));
    }

    let secret = match secret.filter(|s| !s.is_empty()) {
        Some(secret) => secret,
        None => {
            debug!("No secret supplied, asking the daemon for one");
            api.generate_secret().await?.rosecret
        }
    };

    let created = !path.exists();
    if created {
        prepare_directory(&path, policy)?;
    }

    api.add_sync_folder(&name, &secret).await?;
    info!("Registered sync folder {}", path.display());

    Ok(AddedFolder {
        path,
        secret,
        created,
    })
}
