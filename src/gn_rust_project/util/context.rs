//! The [`GlobalContext`] object carries the environment of one invocation:
//! current directory, an environment snapshot, the console shell, and the
//! optional `gn-rust-project.toml` configuration file.
//!
//! Every setting resolves with the same precedence: the command line (handled
//! by the caller), then environment variables prefixed with
//! `GN_RUST_PROJECT_`, then the `[rust-project]` table of the config file,
//! then built-in defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};

use anyhow::Context as _;
use gn_util::paths;
use serde::Deserialize;

use crate::util::errors::GnResult;
use crate::util::shell::{Shell, Verbosity};

/// Name of the config file looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "gn-rust-project.toml";

/// Manifest name used when nothing else asks for one.
pub const DEFAULT_OUTPUT: &str = "rust-project.json";

const ENV_PREFIX: &str = "GN_RUST_PROJECT_";

/// On-disk layout of `gn-rust-project.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    rust_project: RustProjectConfig,
}

/// The `[rust-project]` table.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RustProjectConfig {
    pub output: Option<String>,
    pub root: Option<PathBuf>,
    pub build_dir: Option<String>,
    pub quiet: Option<bool>,
}

#[derive(Debug)]
pub struct GlobalContext {
    shell: Mutex<Shell>,
    cwd: PathBuf,
    env: HashMap<String, String>,
    /// Explicit config file from `--config`; `None` means look in `cwd`.
    config_path: Option<PathBuf>,
    config: OnceLock<(Option<PathBuf>, RustProjectConfig)>,
}

impl GlobalContext {
    /// Creates a new context rooted at `cwd` with an empty environment.
    ///
    /// Use [`GlobalContext::default`] for one that snapshots the process
    /// environment.
    pub fn new(shell: Shell, cwd: PathBuf) -> GlobalContext {
        GlobalContext {
            shell: Mutex::new(shell),
            cwd,
            env: HashMap::new(),
            config_path: None,
            config: OnceLock::new(),
        }
    }

    /// Creates a context from the current process: its working directory and
    /// the UTF-8 subset of its environment.
    pub fn default() -> GnResult<GlobalContext> {
        let shell = Shell::new();
        let cwd = std::env::current_dir()
            .context("couldn't get the current directory of the process")?;
        let mut gctx = GlobalContext::new(shell, cwd);
        gctx.env = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Ok(gctx)
    }

    /// Gets a handle to the console shell.
    pub fn shell(&self) -> MutexGuard<'_, Shell> {
        self.shell.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The directory relative paths on the command line are taken from.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Helper primarily for testing.
    pub fn set_env(&mut self, env: HashMap<String, String>) {
        self.env = env;
    }

    /// Get the value of environment variable `key` through the snapshot in
    /// [`GlobalContext`].
    pub fn get_env(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// Applies the command-line flags that affect the context itself.
    pub fn configure(
        &mut self,
        verbose: bool,
        quiet: bool,
        color: Option<&str>,
        config_path: Option<PathBuf>,
    ) -> GnResult<()> {
        if verbose && quiet {
            anyhow::bail!("cannot set both --verbose and --quiet");
        }
        self.config_path = config_path.map(|p| self.cwd.join(p));
        self.config = OnceLock::new();

        let quiet = quiet || (!verbose && self.quiet()?);
        let verbosity = if verbose {
            Verbosity::Verbose
        } else if quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        };
        let mut shell = self.shell();
        shell.set_verbosity(verbosity);
        shell.set_color_choice(color)?;
        Ok(())
    }

    /// Returns the parsed `[rust-project]` table along with the path it was
    /// read from, loading it on first use.
    fn config(&self) -> GnResult<&(Option<PathBuf>, RustProjectConfig)> {
        if let Some(config) = self.config.get() {
            return Ok(config);
        }
        let loaded = self.load_config()?;
        Ok(self.config.get_or_init(|| loaded))
    }

    fn load_config(&self) -> GnResult<(Option<PathBuf>, RustProjectConfig)> {
        let path = match &self.config_path {
            Some(path) => path.clone(),
            None => {
                let path = self.cwd.join(CONFIG_FILE_NAME);
                if !path.exists() {
                    tracing::trace!(path = %path.display(), "no config file");
                    return Ok((None, RustProjectConfig::default()));
                }
                path
            }
        };
        let contents = paths::read(&path)?;
        let file: ConfigFile = toml::from_str(&contents)
            .with_context(|| format!("could not parse config file `{}`", path.display()))?;
        tracing::debug!(path = %path.display(), config = ?file.rust_project, "loaded config");
        Ok((Some(path), file.rust_project))
    }

    fn env_config(&self, key: &str) -> Option<(String, &str)> {
        let name = format!("{ENV_PREFIX}{key}");
        let value = self.get_env(&name)?;
        Some((name, value))
    }

    /// The requested manifest file name, relative to the build directory.
    pub fn output(&self) -> GnResult<String> {
        if let Some((_, value)) = self.env_config("OUTPUT") {
            return Ok(value.to_string());
        }
        let (_, config) = self.config()?;
        Ok(config
            .output
            .clone()
            .unwrap_or_else(|| DEFAULT_OUTPUT.to_string()))
    }

    /// Overrides the absolute source root of the build graph snapshot.
    pub fn root(&self) -> GnResult<Option<PathBuf>> {
        if let Some((_, value)) = self.env_config("ROOT") {
            return Ok(Some(self.cwd.join(value)));
        }
        let (path, config) = self.config()?;
        let base = path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(&self.cwd);
        Ok(config.root.as_ref().map(|root| base.join(root)))
    }

    /// Overrides the source-absolute build directory of the snapshot.
    pub fn build_dir(&self) -> GnResult<Option<String>> {
        if let Some((_, value)) = self.env_config("BUILD_DIR") {
            return Ok(Some(value.to_string()));
        }
        let (_, config) = self.config()?;
        Ok(config.build_dir.clone())
    }

    /// Whether status output is suppressed when neither `--quiet` nor
    /// `--verbose` was passed.
    pub fn quiet(&self) -> GnResult<bool> {
        if let Some((name, value)) = self.env_config("QUIET") {
            return parse_bool(&name, value);
        }
        let (_, config) = self.config()?;
        Ok(config.quiet.unwrap_or(false))
    }
}

fn parse_bool(name: &str, value: &str) -> GnResult<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        _ => anyhow::bail!("environment variable `{name}` expected a boolean, found `{value}`"),
    }
}
