//! File I/O helpers shared by the save-file store and the interactive loop.
//!
//! Paths ending in `.zst` are transparently Zstandard-compressed on write and
//! decompressed on read.

use std::io::BufRead;
use std::path::Path;

const MAX_DECOMPRESSED_BYTES: usize = 8 * 1024 * 1024;
const ZSTD_LEVEL: i32 = 3;

/// Reads one trimmed line. `None` on EOF or read error.
///
/// ```rust
/// use std::io::Cursor;
/// # use chipdeck_cli::io_utils::read_stdin_line;
///
/// let mut input = Cursor::new("buy-slot 0 max\n");
/// assert_eq!(read_stdin_line(&mut input).as_deref(), Some("buy-slot 0 max"));
/// assert_eq!(read_stdin_line(&mut input), None);
/// ```
pub fn read_stdin_line(stdin: &mut dyn BufRead) -> Option<String> {
    let mut line = String::new();
    match stdin.read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}

pub fn is_compressed(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "zst")
}

/// Read text file with automatic .zst decompression detection.
/// A leading UTF-8 BOM is stripped.
pub fn read_text_auto(path: &Path) -> std::io::Result<String> {
    let mut content = if is_compressed(path) {
        let comp = std::fs::read(path)?;
        let dec = zstd::bulk::decompress(&comp, MAX_DECOMPRESSED_BYTES)?;
        String::from_utf8(dec).map_err(std::io::Error::other)?
    } else {
        std::fs::read_to_string(path)?
    };
    strip_utf8_bom(&mut content);
    Ok(content)
}

/// Writes `text` to `path` through a sibling temporary file and a rename, so
/// a crash mid-write leaves the previous file intact.
pub fn write_text_atomic(path: &Path, text: &str) -> std::io::Result<()> {
    ensure_parent_dir(path)?;
    let bytes = if is_compressed(path) {
        zstd::bulk::compress(text.as_bytes(), ZSTD_LEVEL)?
    } else {
        text.as_bytes().to_vec()
    };
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}

/// Ensure parent directory exists for given path, creating if needed.
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn strip_utf8_bom(s: &mut String) {
    const UTF8_BOM: &str = "\u{feff}";
    if s.starts_with(UTF8_BOM) {
        s.drain(..UTF8_BOM.len());
    }
}
