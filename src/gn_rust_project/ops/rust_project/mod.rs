//! Generation of `rust-project.json`, the project description rust-analyzer
//! reads for builds that don't use Cargo.
//!
//! The pass runs in three steps:
//!
//! 1. [`crate_index`] files every Rust-compiling target of the build graph
//!    under the root module of the crate it builds.
//! 2. [`resolve`] visits every discovered crate depth first, pulling in the
//!    synthetic sysroot crates from [`sysroot`] as needed, and appends the
//!    finished crates to a [`CrateList`].
//! 3. [`serialize`] renders the list as JSON.
//!
//! [`write_rust_project`] wraps all of it and only touches the output file if
//! its contents change.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use gn_util::paths;

use crate::core::{BuildGraph, BuildSettings, SourceDir};
use crate::util::GlobalContext;
use crate::util::errors::GnResult;

pub mod args;
pub mod crate_index;
pub mod crate_list;
pub mod resolve;
pub mod serialize;
pub mod sysroot;

pub use self::crate_list::{Crate, CrateId, CrateList};

/// Command-line overrides for one generation run. `None` falls back to the
/// environment, then the config file, then the build graph snapshot.
#[derive(Clone, Debug, Default)]
pub struct RustProjectOptions {
    /// Output file name, relative to the build directory.
    pub output: Option<String>,
    /// Absolute source root.
    pub root: Option<PathBuf>,
    /// Source-absolute build directory.
    pub build_dir: Option<String>,
}

impl RustProjectOptions {
    /// Works out where the source tree and build directory live.
    pub fn build_settings(
        &self,
        gctx: &GlobalContext,
        graph: &BuildGraph,
    ) -> GnResult<BuildSettings> {
        let root = match &self.root {
            Some(root) => Some(gctx.cwd().join(root)),
            None => gctx.root()?,
        };
        let Some(root) = root.or_else(|| graph.root_path().map(Path::to_path_buf)) else {
            anyhow::bail!(
                "the build graph does not record a source root\n\
                 help: pass `--root` or set `root` in the config file"
            );
        };
        if !root.is_absolute() {
            anyhow::bail!("source root `{}` is not an absolute path", root.display());
        }

        let build_dir = match &self.build_dir {
            Some(dir) => Some(dir.clone()),
            None => gctx.build_dir()?,
        };
        let Some(build_dir) = build_dir.or_else(|| graph.build_dir().map(str::to_string)) else {
            anyhow::bail!(
                "the build graph does not record a build directory\n\
                 help: pass `--build-dir` or set `build-dir` in the config file"
            );
        };
        if !build_dir.starts_with("//") {
            anyhow::bail!("build directory `{build_dir}` must be source-absolute (start with `//`)");
        }

        Ok(BuildSettings::new(
            paths::normalize_path(&root),
            SourceDir::new(build_dir),
        ))
    }

    /// The requested output file name.
    pub fn output(&self, gctx: &GlobalContext) -> GnResult<String> {
        match &self.output {
            Some(output) => Ok(output.clone()),
            None => gctx.output(),
        }
    }
}

/// Result of [`write_rust_project`].
#[derive(Debug)]
pub struct WriteOutcome {
    /// Absolute path of the written file.
    pub path: PathBuf,
    /// Number of crates described, sysroot crates included.
    pub crates: usize,
    /// `false` if the file already had the generated contents.
    pub changed: bool,
}

/// Resolves every crate of `graph`.
pub fn build_crate_list(graph: &BuildGraph, build_settings: &BuildSettings) -> GnResult<CrateList> {
    let _span = tracing::info_span!("rust_project").entered();
    let crates = resolve::CrateGraphBuilder::new(graph, build_settings).build()?;
    tracing::debug!(crates = crates.len(), "crate graph resolved");
    Ok(crates)
}

/// Renders the `rust-project.json` contents for `graph`.
pub fn render_rust_project(graph: &BuildGraph, build_settings: &BuildSettings) -> GnResult<String> {
    let crates = build_crate_list(graph, build_settings)?;
    serialize::render(build_settings, &crates)
}

/// Generates `rust-project.json` for `graph` and writes it to the requested
/// output, relative to the build directory, unless it is already up to date.
pub fn write_rust_project(
    gctx: &GlobalContext,
    graph: &BuildGraph,
    options: &RustProjectOptions,
) -> GnResult<WriteOutcome> {
    let build_settings = options.build_settings(gctx, graph)?;
    let file_name = options.output(gctx)?;
    let output_file = build_settings.resolve_relative_file(&file_name)?;
    let path = build_settings.full_path_of_file(&output_file);
    tracing::debug!(output = %path.display(), "resolved output path");

    let crates = build_crate_list(graph, &build_settings)?;
    if crates.is_empty() {
        gctx.shell()
            .warn("the build graph has no targets that compile Rust sources")?;
    }
    let json = serialize::render(&build_settings, &crates)?;

    if let Some(parent) = path.parent() {
        paths::create_dir_all(parent)?;
    }
    let changed = paths::write_if_changed(&path, json)
        .with_context(|| format!("failed to write rust-project file `{}`", path.display()))?;

    Ok(WriteOutcome {
        path,
        crates: crates.len(),
        changed,
    })
}
