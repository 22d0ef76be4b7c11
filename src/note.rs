//! Note container handler — reads and writes `.note` archives.
//!
//! A .note file is a ZIP archive with a single top-level directory
//! named after the note:
//!   - <name>/Session.plist  — the archived drawing session
//!   - (optional) other files — metadata, preview images, etc.
//!
//! Conversion starts from a template archive: its session is pulled
//! out, rebound with new curve data, and the whole archive is written
//! back with the top-level directory renamed to the new note's name.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Read the `Session.plist` bytes out of a template `.note` archive.
pub fn read_session(template: &[u8]) -> Result<Vec<u8>, String> {
    let cursor = Cursor::new(template);
    let mut archive =
        ZipArchive::new(cursor).map_err(|e| format!("Failed to open note template: {e}"))?;

    let member = find_session_member(&mut archive)?;
    let mut file = archive
        .by_name(&member)
        .map_err(|e| format!("Session member '{member}' not found in archive: {e}"))?;

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("Failed to read '{member}': {e}"))?;

    Ok(bytes)
}

/// Re-archive a template `.note` under a new note name, substituting
/// `session` for the template's `Session.plist`.
///
/// Every member under the template's top-level directory is carried
/// over with the directory renamed to `name`; the session member's
/// content is replaced, everything else is copied verbatim.
pub fn build_note(template: &[u8], name: &str, session: &[u8]) -> Result<Vec<u8>, String> {
    let cursor = Cursor::new(template);
    let mut archive =
        ZipArchive::new(cursor).map_err(|e| format!("Failed to open note template: {e}"))?;

    let session_path = find_session_member(&mut archive)?;
    let old_prefix = session_path
        .split_once('/')
        .map(|(top, _)| format!("{top}/"));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| format!("Failed to read template member {i}: {e}"))?;
        let path = file.name().to_string();

        let new_path = match &old_prefix {
            Some(prefix) if path.starts_with(prefix.as_str()) => {
                format!("{name}/{}", &path[prefix.len()..])
            }
            _ => path.clone(),
        };

        if file.is_dir() {
            writer
                .add_directory(new_path, options)
                .map_err(|e| format!("Failed to write directory entry: {e}"))?;
            continue;
        }

        let content = if path == session_path {
            session.to_vec()
        } else {
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .map_err(|e| format!("Failed to read '{path}': {e}"))?;
            buf
        };

        writer
            .start_file(new_path.clone(), options)
            .map_err(|e| format!("Failed to start member '{new_path}': {e}"))?;
        writer
            .write_all(&content)
            .map_err(|e| format!("Failed to write member '{new_path}': {e}"))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| format!("Failed to finish note archive: {e}"))?;
    Ok(cursor.into_inner())
}

/// Locate the session member (`<dir>/Session.plist`, or a bare
/// `Session.plist`) inside a note archive.
fn find_session_member(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<String, String> {
    let names: Vec<String> = (0..archive.len())
        .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
        .collect();

    for name in &names {
        if name == "Session.plist" || name.ends_with("/Session.plist") {
            return Ok(name.clone());
        }
    }

    Err(format!(
        "No Session.plist found in note archive. Files: {:?}",
        names
    ))
}
