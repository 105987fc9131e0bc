//! Atomic I/O operations

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file.
///
/// Writes to a temp file in the same directory, verifies that every byte
/// reached the disk and renames over the target. Returns the number of bytes
/// written.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<u64> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    let written = match fill_temp_file(temp_file, &temp_path, &native_path, content) {
        Ok(written) => written,
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
    };

    let expected = content.len() as u64;
    if written != expected {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::ShortWrite {
            path: native_path,
            expected,
            written,
        });
    }

    if let Err(e) = fs::rename(&temp_path, &native_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&native_path, e));
    }
    tracing::debug!(path = %path, bytes = written, "wrote file atomically");

    Ok(written)
}

/// Lock, fill and sync the temp file. Returns its size on disk.
fn fill_temp_file(
    mut temp_file: fs::File,
    temp_path: &Path,
    native_path: &Path,
    content: &[u8],
) -> Result<u64> {
    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: native_path.to_path_buf(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;

    let written = temp_file
        .metadata()
        .map_err(|e| Error::io(temp_path, e))?
        .len();
    FileExt::unlock(&temp_file).map_err(|_| Error::LockFailed {
        path: native_path.to_path_buf(),
    })?;
    Ok(written)
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<u64> {
    write_atomic(path, content.as_bytes())
}
