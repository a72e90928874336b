//! # Folder Listing Renderer
//!
//! Turns the daemon's folder list into the tree printed by `btsyncli list`:
//!
//! ```text
//! /srv/sync/photos
//!   |--laptop                                   ⬇Synced
//!   |--phone                                       Idle
//! ```
//!
//! Folder names are highlighted and every peer status is right-aligned to the
//! terminal width. Terminal state (width, color) is reached only through the
//! [`Renderer`] trait so listings can be rendered deterministically in tests.

use crate::client::SyncFolder;
use colored::Colorize;
use crossterm::tty::IsTty;
use std::io::{self, Write};

/// Width of the `  |--` prefix in front of every peer line.
pub const PEER_PREFIX_WIDTH: usize = 5;

const FALLBACK_WIDTH: usize = 80;

/// How direction markers in peer statuses are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ArrowStyle {
    /// `⬇` (U+2B07) and `⬆` (U+2B06).
    #[default]
    Unicode,
    /// `v` and `^`, for terminals without the glyphs.
    Ascii,
}

impl ArrowStyle {
    fn down(self) -> &'static str {
        match self {
            ArrowStyle::Unicode => "\u{2B07}",
            ArrowStyle::Ascii => "v",
        }
    }

    fn up(self) -> &'static str {
        match self {
            ArrowStyle::Unicode => "\u{2B06}",
            ArrowStyle::Ascii => "^",
        }
    }
}

/// Terminal capabilities needed to draw a listing.
pub trait Renderer {
    /// Usable width in columns.
    fn width(&self) -> usize;

    /// Decorate a folder name.
    fn highlight(&self, text: &str) -> String;
}

/// Renders to the real terminal on stdout.
#[derive(Debug, Default)]
pub struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn width(&self) -> usize {
        terminal_width()
            .or_else(|| std::env::var("COLUMNS").ok()?.parse().ok())
            .filter(|w| *w > 0)
            .unwrap_or(FALLBACK_WIDTH)
    }

    fn highlight(&self, text: &str) -> String {
        text.green().to_string()
    }
}

/// Fixed width, no color.
#[derive(Debug)]
pub struct PlainRenderer {
    pub width: usize,
}

impl Renderer for PlainRenderer {
    fn width(&self) -> usize {
        self.width
    }

    fn highlight(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Width of the terminal stdout is attached to. Piped output has none, even
/// when the process still has a controlling terminal.
fn terminal_width() -> Option<usize> {
    if !std::io::stdout().is_tty() {
        return None;
    }
    let (cols, _rows) = crossterm::terminal::size().ok()?;
    Some(cols as usize)
}

/// Make a raw peer status human readable.
///
/// The daemon separates the parts of a status with `>`; a leading
/// `downarrow`/`uparrow` token marks the transfer direction and becomes an
/// arrow. The parts are joined back together with no separator.
pub fn format_status(raw: &str, arrows: ArrowStyle) -> String {
    let mut parts: Vec<&str> = raw.split('>').collect();

    if parts[0].contains("downarrow") {
        parts[0] = arrows.down();
    }
    if parts[0].contains("uparrow") {
        parts[0] = arrows.up();
    }

    parts.concat()
}

/// Spaces needed to push `status` against the right edge, never negative.
pub fn padding(width: usize, name: &str, status: &str) -> usize {
    width.saturating_sub(PEER_PREFIX_WIDTH + status.chars().count() + name.chars().count())
}

/// One `  |--<name><padding><status>` line, without the newline.
pub fn peer_line(width: usize, name: &str, status: &str) -> String {
    format!(
        "  |--{}{}{}",
        name,
        " ".repeat(padding(width, name, status)),
        status
    )
}

/// Write the whole folder/peer tree.
pub fn render_folders<W: Write>(
    out: &mut W,
    folders: &[SyncFolder],
    renderer: &dyn Renderer,
    arrows: ArrowStyle,
) -> io::Result<()> {
    let width = renderer.width();

    for folder in folders {
        writeln!(out, "{}", renderer.highlight(&folder.name))?;
        for peer in &folder.peers {
            let status = format_status(&peer.status, arrows);
            writeln!(out, "{}", peer_line(width, &peer.name, &status))?;
        }
    }

    Ok(())
}
