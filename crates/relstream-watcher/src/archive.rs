//! Archive moves
//!
//! Moving a consumed input file into the archive must never lose or
//! overwrite data. The move is a `rename` where the filesystem allows it,
//! falling back to copy-verify-delete across filesystem boundaries. Name
//! collisions are resolved with a deterministic `-N` counter suffix.

use crate::error::WatcherError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Upper bound on collision-suffix attempts before giving up.
const MAX_COLLISION_SUFFIX: u32 = 10_000;

/// Move `src` into `dest_dir`, preserving the filename.
///
/// Creates `dest_dir` if needed. On a name collision the destination gets a
/// `-1`, `-2`, ... suffix before the extension; existing archive entries are
/// never overwritten. Returns the final destination path.
///
/// # Errors
///
/// Returns an error when the filesystem refuses the move, the fallback
/// copy cannot be verified, or the collision counter is exhausted.
pub async fn archive_file(src: &Path, dest_dir: &Path) -> Result<PathBuf, WatcherError> {
    fs::create_dir_all(dest_dir)
        .await
        .map_err(|e| WatcherError::io(dest_dir, e))?;

    let file_name = src
        .file_name()
        .ok_or_else(|| WatcherError::io(src, std::io::Error::other("path has no filename")))?;

    let dest = unique_destination(dest_dir, Path::new(file_name)).await?;

    match fs::rename(src, &dest).await {
        Ok(()) => {
            debug!(src = %src.display(), dest = %dest.display(), "archived by rename");
            Ok(dest)
        }
        // Cross-device moves cannot rename; fall back to copy-verify-delete
        Err(_) => copy_verify_delete(src, &dest).await,
    }
}

/// First non-existing destination path for `file_name` inside `dest_dir`.
async fn unique_destination(dest_dir: &Path, file_name: &Path) -> Result<PathBuf, WatcherError> {
    let plain = dest_dir.join(file_name);
    if !fs::try_exists(&plain)
        .await
        .map_err(|e| WatcherError::io(&plain, e))?
    {
        return Ok(plain);
    }

    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = file_name.extension().map(|e| e.to_string_lossy().into_owned());

    for counter in 1..=MAX_COLLISION_SUFFIX {
        let candidate_name = match &extension {
            Some(ext) => format!("{stem}-{counter}.{ext}"),
            None => format!("{stem}-{counter}"),
        };
        let candidate = dest_dir.join(candidate_name);
        if !fs::try_exists(&candidate)
            .await
            .map_err(|e| WatcherError::io(&candidate, e))?
        {
            return Ok(candidate);
        }
    }

    Err(WatcherError::ArchiveCollision(plain))
}

/// Copy `src` to `dest`, verify the copy, then delete `src`.
///
/// The source is only removed after the destination's length matches; a
/// mismatch leaves the source in place and removes the partial copy.
async fn copy_verify_delete(src: &Path, dest: &Path) -> Result<PathBuf, WatcherError> {
    fs::copy(src, dest)
        .await
        .map_err(|e| WatcherError::io(src, e))?;

    let src_len = fs::metadata(src)
        .await
        .map_err(|e| WatcherError::io(src, e))?
        .len();
    let dest_len = fs::metadata(dest)
        .await
        .map_err(|e| WatcherError::io(dest, e))?
        .len();

    if src_len != dest_len {
        let _ = fs::remove_file(dest).await;
        return Err(WatcherError::CopyMismatch(dest.to_path_buf()));
    }

    fs::remove_file(src)
        .await
        .map_err(|e| WatcherError::io(src, e))?;
    debug!(src = %src.display(), dest = %dest.display(), "archived by copy");
    Ok(dest.to_path_buf())
}
