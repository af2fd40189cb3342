//! Various utilities for working with files and paths.

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::Builder as TempFileBuilder;

/// Normalize a path, removing things like `.` and `..`.
///
/// CAUTION: This does not resolve symlinks (unlike
/// [`std::fs::canonicalize`]). The build graph only ever hands us lexical
/// paths, so this is what the emitted manifest should contain as well.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = path.components().peekable();
    let mut ret = if let Some(c @ Component::Prefix(..)) = components.peek().cloned() {
        components.next();
        PathBuf::from(c.as_os_str())
    } else {
        PathBuf::new()
    };

    for component in components {
        match component {
            Component::Prefix(..) => unreachable!(),
            Component::RootDir => {
                ret.push(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                ret.pop();
            }
            Component::Normal(c) => {
                ret.push(c);
            }
        }
    }
    ret
}

/// Reads a file to a string.
///
/// Equivalent to [`std::fs::read_to_string`] with better error messages.
pub fn read(path: &Path) -> Result<String> {
    match String::from_utf8(read_bytes(path)?) {
        Ok(s) => Ok(s),
        Err(_) => anyhow::bail!("path at `{}` was not valid utf-8", path.display()),
    }
}

/// Reads a file into a bytes vector.
///
/// Equivalent to [`std::fs::read`] with better error messages.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read `{}`", path.display()))
}

/// Writes `contents` to `path` unless the file already holds exactly those
/// bytes. Returns whether the file was (re)written.
///
/// The new contents go to a temporary file next to `path` which is then
/// renamed over it, so readers never observe a half-written file.
pub fn write_if_changed<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<bool> {
    let path = path.as_ref();
    let contents = contents.as_ref();
    (|| -> Result<bool> {
        let permissions = match fs::read(path) {
            Ok(orig) if orig == contents => {
                tracing::trace!(path = %path.display(), "contents unchanged, skipping write");
                return Ok(false);
            }
            Ok(_) => Some(fs::metadata(path)?.permissions()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = TempFileBuilder::new()
            .prefix(".gn-rust-project")
            .tempfile_in(parent)?;
        tmp.write_all(contents)?;
        match permissions {
            Some(permissions) => fs::set_permissions(tmp.path(), permissions)?,
            None => set_default_permissions(tmp.path())?,
        }
        tmp.persist(path)?;
        Ok(true)
    })()
    .with_context(|| format!("failed to write `{}`", path.display()))
}

/// Files created through a temp file start out private; give a freshly
/// created manifest the usual world-readable mode instead.
#[cfg(unix)]
fn set_default_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Equivalent to [`std::fs::create_dir_all`] with better error messages.
pub fn create_dir_all(p: impl AsRef<Path>) -> Result<()> {
    _create_dir_all(p.as_ref())
}

fn _create_dir_all(p: &Path) -> Result<()> {
    fs::create_dir_all(p)
        .with_context(|| format!("failed to create directory `{}`", p.display()))?;
    Ok(())
}
