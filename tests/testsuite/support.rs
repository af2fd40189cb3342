//! Scratch projects and a command builder for the `gn-rust-project` binary.

use std::fs;
use std::path::{Path, PathBuf};

use snapbox::cmd::{Command, cargo_bin};
use snapbox::{Assert, Redactions};
use tempfile::TempDir;

/// Environment variables the binary reads; cleared so the host environment
/// can't leak into a test.
const ENV_VARS: &[&str] = &[
    "GN_RUST_PROJECT_OUTPUT",
    "GN_RUST_PROJECT_ROOT",
    "GN_RUST_PROJECT_BUILD_DIR",
    "GN_RUST_PROJECT_QUIET",
    "GN_RUST_PROJECT_LOG",
];

/// Source root recorded in graphs built with [`graph`]. It never exists on
/// disk, which keeps the paths in the generated manifests stable.
pub const FAKE_ROOT: &str = "/checkout";

pub struct ProjectBuilder {
    files: Vec<(PathBuf, String)>,
}

impl ProjectBuilder {
    /// Adds a file to the project.
    pub fn file<B: AsRef<Path>>(mut self, path: B, body: &str) -> Self {
        self.files.push((path.as_ref().to_path_buf(), body.to_string()));
        self
    }

    pub fn build(self) -> Project {
        let dir = tempfile::tempdir().unwrap();
        // The binary sees its working directory canonicalized.
        let root = if cfg!(windows) {
            dir.path().to_path_buf()
        } else {
            dir.path().canonicalize().unwrap()
        };
        for (path, body) in self.files {
            let path = root.join(path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, body).unwrap();
        }
        Project { _dir: dir, root }
    }
}

pub struct Project {
    _dir: TempDir,
    root: PathBuf,
}

impl Project {
    pub fn root(&self) -> PathBuf {
        self.root.clone()
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> String {
        let full = self.root().join(path);
        fs::read_to_string(&full)
            .unwrap_or_else(|e| panic!("could not read file {}: {}", full.display(), e))
    }

    pub fn manifest(&self, path: impl AsRef<Path>) -> serde_json::Value {
        serde_json::from_str(&self.read_file(path)).unwrap()
    }

    /// `gn-rust-project` running in the project root with a clean environment.
    pub fn gn_rust_project(&self) -> Command {
        let mut redactions = Redactions::new();
        redactions.insert("[ROOT]", self.root()).unwrap();
        let mut cmd = Command::new(cargo_bin!("gn-rust-project"))
            .current_dir(self.root())
            .with_assert(Assert::new().redact_with(redactions));
        for var in ENV_VARS {
            cmd = cmd.env_remove(var);
        }
        cmd
    }

    /// Like [`Project::gn_rust_project`], writing the manifest to `out.json` in
    /// the project root so graphs rooted at [`FAKE_ROOT`] can be used.
    pub fn generate(&self, graph: &str) -> Command {
        let output = self.root().join("out.json");
        self.gn_rust_project().arg(graph).arg("-o").arg(output)
    }
}

/// Starts an empty scratch project.
pub fn project() -> ProjectBuilder {
    ProjectBuilder { files: Vec::new() }
}

/// A build graph snapshot rooted at [`FAKE_ROOT`] with a single `host`
/// toolchain, holding `targets` (a comma-separated list of JSON objects).
pub fn graph(targets: &str) -> String {
    format!(
        r#"{{
    "root_path": "{FAKE_ROOT}",
    "build_dir": "//out/",
    "default_toolchain": "//build/toolchain:host",
    "toolchains": [{{ "label": "//build/toolchain:host" }}],
    "targets": [{targets}]
}}"#
    )
}
