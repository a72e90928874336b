//! # Interactive Input
//!
//! Masked password prompt and OS user lookup used by the credential fallback
//! path in [`crate::config`].

use crate::error::{CliError, Result};
use std::ffi::CStr;
use std::io::{self, BufRead, Write};
use termios::{tcsetattr, Termios, ECHO, TCSANOW};

/// Disables echo on stdin while alive and restores the previous settings on drop.
struct EchoGuard {
    fd: i32,
    original: Termios,
}

impl EchoGuard {
    /// Returns `None` when stdin is not a terminal.
    fn new() -> Option<Self> {
        let fd = libc::STDIN_FILENO;
        let original = Termios::from_fd(fd).ok()?;
        let mut silent = original;
        silent.c_lflag &= !ECHO;
        tcsetattr(fd, TCSANOW, &silent).ok()?;
        Some(Self { fd, original })
    }
}

impl Drop for EchoGuard {
    fn drop(&mut self) {
        let _ = tcsetattr(self.fd, TCSANOW, &self.original);
    }
}

/// Ask for the daemon password on stderr without echoing what is typed.
///
/// When stdin is not a terminal the line is read as-is, which lets scripts pipe
/// the password in.
pub fn prompt_password() -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "Password: ").map_err(CliError::Prompt)?;
    stderr.flush().map_err(CliError::Prompt)?;

    let guard = EchoGuard::new();
    let password = read_password(&mut io::stdin().lock());
    if guard.is_some() {
        drop(guard);
        // The user's newline was swallowed along with the echo.
        let _ = writeln!(stderr);
    }
    password
}

/// Read one line as the password. Input that ends before a line is read is an
/// error; an empty line is an empty password.
fn read_password<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(CliError::Prompt)?;
    if read == 0 {
        return Err(CliError::Prompt(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed before a password was entered",
        )));
    }
    Ok(trim_newline(line))
}

fn trim_newline(mut line: String) -> String {
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    line
}

/// Name of the user running this process: `$USER`, then `$LOGNAME`, then the
/// passwd entry for the current uid.
pub fn current_username() -> Option<String> {
    ["USER", "LOGNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|name| !name.is_empty())
        .or_else(passwd_username)
}

fn passwd_username() -> Option<String> {
    // SAFETY: getpwuid returns either null or a pointer into static storage that
    // stays valid until the next getpw* call; we copy the name out immediately.
    unsafe {
        let pw = libc::getpwuid(libc::getuid());
        if pw.is_null() || (*pw).pw_name.is_null() {
            return None;
        }
        CStr::from_ptr((*pw).pw_name)
            .to_str()
            .ok()
            .map(str::to_owned)
    }
}
