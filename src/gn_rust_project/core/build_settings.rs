use std::path::{Path, PathBuf};

use gn_util::paths;

use crate::core::{Label, OutputFile, SourceDir, SourcePath};
use crate::util::errors::ProjectError;

/// Where the build lives on disk: the absolute source root that `//` paths
/// are relative to, and the build (output) directory inside it.
#[derive(Clone, Debug)]
pub struct BuildSettings {
    root_path: PathBuf,
    build_dir: SourceDir,
}

impl BuildSettings {
    pub fn new(root_path: PathBuf, build_dir: SourceDir) -> BuildSettings {
        BuildSettings {
            root_path,
            build_dir,
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn build_dir(&self) -> &SourceDir {
        &self.build_dir
    }

    /// Maps a `//`-relative or system-absolute path string to an absolute
    /// filesystem path.
    pub fn full_path(&self, value: &str) -> PathBuf {
        let path = match value.strip_prefix("//") {
            Some(rest) => self.root_path.join(rest),
            None => PathBuf::from(value),
        };
        paths::normalize_path(&path)
    }

    pub fn full_path_of_file(&self, file: &SourcePath) -> PathBuf {
        self.full_path(file.value())
    }

    pub fn full_path_of_dir(&self, dir: &SourceDir) -> PathBuf {
        self.full_path(dir.value())
    }

    /// Converts a build-dir relative output into a build path.
    pub fn output_to_source(&self, output: &OutputFile) -> SourcePath {
        let value = output.value();
        if value.starts_with("//") || Path::new(value).is_absolute() {
            SourcePath::new(value)
        } else {
            SourcePath::new(format!("{}{}", self.build_dir.value(), value))
        }
    }

    /// Resolves a user-supplied file name relative to the build directory.
    ///
    /// Source-absolute and system-absolute names are taken as-is. `..`
    /// components may not climb above the source root.
    pub fn resolve_relative_file(&self, value: &str) -> Result<SourcePath, ProjectError> {
        let fail = |reason: &str| ProjectError::PathResolution {
            value: value.to_string(),
            reason: reason.to_string(),
        };
        if value.is_empty() {
            return Err(fail("the file name is empty"));
        }
        if value.ends_with('/') || value.ends_with('\\') {
            return Err(fail("expected a file but the name ends in a directory separator"));
        }
        if !value.starts_with("//") && Path::new(value).is_absolute() {
            return Ok(SourcePath::new(value));
        }

        let joined = match value.strip_prefix("//") {
            Some(rest) => rest.to_string(),
            None => match self.build_dir.value().strip_prefix("//") {
                Some(build_dir) => format!("{build_dir}{value}"),
                None => return Err(fail("the build directory is not source-absolute")),
            },
        };
        let mut components: Vec<&str> = Vec::new();
        for component in joined.split(['/', '\\']) {
            match component {
                "" | "." => {}
                ".." => {
                    if components.pop().is_none() {
                        return Err(fail("the path climbs above the source root"));
                    }
                }
                c => components.push(c),
            }
        }
        if components.is_empty() {
            return Err(fail("the path names the source root"));
        }
        Ok(SourcePath::new(format!("//{}", components.join("/"))))
    }

    /// Directory holding generated sources for `target`:
    /// `<build_dir>[<toolchain>/]gen/<target dir>/`.
    pub fn gen_dir_for(&self, target: &Label, is_default_toolchain: bool) -> SourceDir {
        let mut dir = self.build_dir.value().to_string();
        if !is_default_toolchain {
            if let Some(toolchain) = target.toolchain_label() {
                dir.push_str(toolchain.name());
                dir.push('/');
            }
        }
        dir.push_str("gen/");
        dir.push_str(target.dir().trim_start_matches('/'));
        SourceDir::new(dir)
    }

    /// Root module of a standard library crate shipped in `sysroot`.
    ///
    /// A relative sysroot is taken relative to the build directory.
    pub fn sysroot_crate_root(&self, sysroot: &str, crate_name: &str) -> SourcePath {
        let base = if Path::new(sysroot).is_absolute() && !sysroot.starts_with("//") {
            PathBuf::from(sysroot)
        } else if sysroot.starts_with("//") {
            self.full_path(sysroot)
        } else {
            self.full_path_of_dir(&self.build_dir).join(sysroot)
        };
        let path = base
            .join("lib/rustlib/src/rust/library")
            .join(crate_name)
            .join("src/lib.rs");
        SourcePath::new(paths::normalize_path(&path).to_string_lossy().into_owned())
    }
}
