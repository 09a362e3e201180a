use std::ffi::OsString;
use std::fs::create_dir_all;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::error;

pub fn create_parent_dir_if_not_exist(path: &Path) -> std::io::Result<()> {
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            if let Err(e) = create_dir_all(parent_dir) {
                error!("Failed to create directory {:?}: {:?}", parent_dir, e);
                return Err(e);
            }
            debug!("created successfully: {:?}", parent_dir);
        }
    }
    Ok(())
}

/// Sibling path used to stage a write before it replaces `path`
pub(crate) fn staging_path(path: &Path) -> PathBuf {
    let mut file_name = path.file_name().map(OsString::from).unwrap_or_default();
    file_name.push(".tmp");
    path.with_file_name(file_name)
}

/// Replaces the content of `path` with `buf`.
///
/// The bytes go to a staging file next to `path` which is then renamed over
/// it, so readers see either the old content or the new one, never a mix.
pub fn write_file_atomically(
    path: &Path,
    buf: &[u8],
) -> std::io::Result<()> {
    create_parent_dir_if_not_exist(path)?;

    let staging = staging_path(path);
    let result = (|| {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&staging)?;
        file.write_all(buf)?;
        file.sync_all()?;
        std::fs::rename(&staging, path)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&staging);
    }
    result
}
