//! Read-only view of a fully resolved build graph.
//!
//! The graph is loaded once from a JSON snapshot exported by the build-file
//! generator. Loading resolves every label reference to a [`TargetId`], so
//! the rust-project pass only ever follows indices and never fails on a
//! dangling reference.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use gn_util::paths;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::core::{CrateType, Label, OutputFile, SourcePath};
use crate::util::errors::{GnResult, ProjectError};

/// Index of a target in [`BuildGraph`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct TargetId(usize);

/// What kind of build step a target is.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    Group,
    Executable,
    SharedLibrary,
    LoadableModule,
    StaticLibrary,
    SourceSet,
    RustLibrary,
    RustProcMacro,
    Copy,
    Action,
    ActionForeach,
    BundleData,
    CreateBundle,
    GeneratedFile,
}

impl OutputType {
    /// Whether targets of this type compile sources, as opposed to grouping,
    /// copying, or running scripts.
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            OutputType::Executable
                | OutputType::SharedLibrary
                | OutputType::LoadableModule
                | OutputType::StaticLibrary
                | OutputType::SourceSet
                | OutputType::RustLibrary
                | OutputType::RustProcMacro
        )
    }
}

/// Flags and environment contributed by a target itself or by one config
/// applied to it.
#[derive(Clone, Default, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigValues {
    #[serde(default)]
    pub rustflags: Vec<String>,
    #[serde(default)]
    pub rustenv: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Toolchain {
    sysroot: String,
}

impl Toolchain {
    /// Sysroot handed to the Rust tools of this toolchain; empty if none.
    pub fn sysroot(&self) -> &str {
        &self.sysroot
    }
}

#[derive(Clone, Debug)]
pub struct Target {
    label: Label,
    toolchain: Label,
    output_type: OutputType,
    sources: Vec<SourcePath>,
    crate_root: Option<SourcePath>,
    crate_name: String,
    crate_type: CrateType,
    testonly: bool,
    public_deps: Vec<TargetId>,
    private_deps: Vec<TargetId>,
    config_values: ConfigValues,
    configs: Vec<usize>,
    outputs: Vec<OutputFile>,
}

impl Target {
    /// Label including the toolchain.
    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn toolchain(&self) -> &Label {
        &self.toolchain
    }

    pub fn output_type(&self) -> OutputType {
        self.output_type
    }

    pub fn is_binary(&self) -> bool {
        self.output_type.is_binary()
    }

    /// Whether any of the target's sources are Rust.
    pub fn rust_source_used(&self) -> bool {
        self.sources.iter().any(SourcePath::is_rust)
    }

    pub fn crate_root(&self) -> Option<&SourcePath> {
        self.crate_root.as_ref()
    }

    pub fn crate_name(&self) -> &str {
        &self.crate_name
    }

    pub fn crate_type(&self) -> CrateType {
        self.crate_type
    }

    pub fn testonly(&self) -> bool {
        self.testonly
    }

    /// The target's own config values, not counting applied configs.
    pub fn config_values(&self) -> &ConfigValues {
        &self.config_values
    }

    pub fn computed_outputs(&self) -> &[OutputFile] {
        &self.outputs
    }
}

/// The resolved build graph.
#[derive(Debug)]
pub struct BuildGraph {
    root_path: Option<PathBuf>,
    build_dir: Option<String>,
    default_toolchain: Label,
    toolchains: IndexMap<Label, Toolchain>,
    configs: Vec<ConfigValues>,
    targets: Vec<Target>,
}

impl BuildGraph {
    /// Loads a build graph snapshot from `path`.
    pub fn load(path: &Path) -> GnResult<BuildGraph> {
        let contents = paths::read(path)?;
        BuildGraph::from_json(&contents)
            .with_context(|| format!("failed to load build graph `{}`", path.display()))
    }

    /// Parses a build graph snapshot.
    pub fn from_json(json: &str) -> GnResult<BuildGraph> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Ok(snapshot.into_graph()?)
    }

    /// Absolute source root recorded in the snapshot, if any.
    pub fn root_path(&self) -> Option<&Path> {
        self.root_path.as_deref()
    }

    /// Source-absolute build directory recorded in the snapshot, if any.
    pub fn build_dir(&self) -> Option<&str> {
        self.build_dir.as_deref()
    }

    /// All resolved targets, in snapshot order.
    pub fn resolved_targets(&self) -> impl Iterator<Item = TargetId> + '_ {
        (0..self.targets.len()).map(TargetId)
    }

    pub fn target(&self, id: TargetId) -> &Target {
        &self.targets[id.0]
    }

    pub fn toolchain_of(&self, id: TargetId) -> Option<&Toolchain> {
        self.toolchains.get(self.target(id).toolchain())
    }

    /// Whether the target is built in the default toolchain.
    pub fn is_default_toolchain(&self, id: TargetId) -> bool {
        *self.target(id).toolchain() == self.default_toolchain
    }

    /// Sysroot the target's Rust tool designates; empty if none.
    pub fn sysroot(&self, id: TargetId) -> &str {
        self.toolchain_of(id).map(Toolchain::sysroot).unwrap_or("")
    }

    /// Linked dependencies: public deps followed by private deps. Data deps
    /// are never linked.
    pub fn linked_deps(&self, id: TargetId) -> impl Iterator<Item = TargetId> + '_ {
        let target = self.target(id);
        target
            .public_deps
            .iter()
            .chain(target.private_deps.iter())
            .copied()
    }

    /// The target's own config values followed by those of every config
    /// applied to it, in application order.
    pub fn config_values(&self, id: TargetId) -> impl Iterator<Item = &ConfigValues> + '_ {
        let target = self.target(id);
        std::iter::once(&target.config_values)
            .chain(target.configs.iter().map(|&config| &self.configs[config]))
    }

    /// Effective Rust compiler flags of the target.
    pub fn rustflags(&self, id: TargetId) -> Vec<String> {
        self.config_values(id)
            .flat_map(|values| values.rustflags.iter().cloned())
            .collect()
    }
}

// =============================================================================
// Snapshot format

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Snapshot {
    #[serde(default)]
    root_path: Option<PathBuf>,
    #[serde(default)]
    build_dir: Option<String>,
    default_toolchain: String,
    #[serde(default)]
    toolchains: Vec<SnapshotToolchain>,
    #[serde(default)]
    configs: Vec<SnapshotConfig>,
    #[serde(default)]
    targets: Vec<SnapshotTarget>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotToolchain {
    label: String,
    #[serde(default)]
    sysroot: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotConfig {
    label: String,
    #[serde(flatten)]
    values: ConfigValues,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotTarget {
    label: String,
    #[serde(default)]
    toolchain: Option<String>,
    output_type: OutputType,
    #[serde(default)]
    sources: Vec<String>,
    #[serde(default)]
    crate_root: Option<String>,
    #[serde(default)]
    crate_name: Option<String>,
    #[serde(default)]
    crate_type: Option<CrateType>,
    #[serde(default)]
    testonly: bool,
    #[serde(default)]
    public_deps: Vec<String>,
    #[serde(default)]
    deps: Vec<String>,
    #[serde(default)]
    data_deps: Vec<String>,
    #[serde(default)]
    configs: Vec<String>,
    #[serde(default)]
    rustflags: Vec<String>,
    #[serde(default)]
    rustenv: Vec<String>,
    #[serde(default)]
    outputs: Vec<String>,
}

fn invalid(label: impl ToString, reason: impl Into<String>) -> ProjectError {
    ProjectError::InvalidGraph {
        label: label.to_string(),
        reason: reason.into(),
    }
}

impl Snapshot {
    fn into_graph(self) -> Result<BuildGraph, ProjectError> {
        let default_toolchain = parse_plain_label(&self.default_toolchain)?;

        let mut toolchains = IndexMap::new();
        for toolchain in self.toolchains {
            let label = parse_plain_label(&toolchain.label)?;
            let previous = toolchains.insert(
                label.clone(),
                Toolchain {
                    sysroot: toolchain.sysroot,
                },
            );
            if previous.is_some() {
                return Err(invalid(label, "toolchain declared twice"));
            }
        }

        let mut config_ids = HashMap::new();
        let mut configs = Vec::new();
        for config in self.configs {
            let label = parse_plain_label(&config.label)?;
            if config_ids.insert(label.clone(), configs.len()).is_some() {
                return Err(invalid(label, "config declared twice"));
            }
            configs.push(config.values);
        }

        // First pass: assign every target its id.
        let mut labels = Vec::with_capacity(self.targets.len());
        let mut ids = HashMap::new();
        for raw in &self.targets {
            let label = match &raw.toolchain {
                Some(toolchain) => {
                    let toolchain = parse_plain_label(toolchain)?;
                    Label::parse(&raw.label, Some(&toolchain))
                }
                None => Label::parse(&raw.label, Some(&default_toolchain)),
            }
            .map_err(|reason| invalid(&raw.label, reason))?;
            if ids.insert(label.clone(), TargetId(labels.len())).is_some() {
                return Err(invalid(label, "target declared twice"));
            }
            labels.push(label);
        }

        // Second pass: resolve references.
        let mut targets = Vec::with_capacity(self.targets.len());
        for (raw, label) in self.targets.into_iter().zip(labels) {
            let toolchain = label
                .toolchain_label()
                .unwrap_or_else(|| default_toolchain.clone());
            if !toolchains.contains_key(&toolchain) {
                toolchains.insert(
                    toolchain.clone(),
                    Toolchain {
                        sysroot: String::new(),
                    },
                );
            }

            let resolve_deps = |deps: &[String]| -> Result<Vec<TargetId>, ProjectError> {
                deps.iter()
                    .map(|dep| {
                        let dep_label = Label::parse(dep, Some(&toolchain))
                            .map_err(|reason| invalid(&label, reason))?;
                        ids.get(&dep_label).copied().ok_or_else(|| {
                            invalid(&label, format!("unknown dependency `{dep_label}`"))
                        })
                    })
                    .collect()
            };
            let public_deps = resolve_deps(&raw.public_deps)?;
            let private_deps = resolve_deps(&raw.deps)?;
            // Data deps are validated but never followed.
            resolve_deps(&raw.data_deps)?;

            let applied = raw
                .configs
                .iter()
                .map(|config| {
                    let config_label = Label::parse(config, None)
                        .map_err(|reason| invalid(&label, reason))?
                        .without_toolchain();
                    config_ids.get(&config_label).copied().ok_or_else(|| {
                        invalid(&label, format!("unknown config `{config_label}`"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let sources = raw
                .sources
                .into_iter()
                .map(|source| source_file(&label, source))
                .collect::<Result<Vec<_>, _>>()?;
            let crate_root = match raw.crate_root {
                Some(root) => Some(source_file(&label, root)?),
                None => infer_crate_root(&sources, raw.output_type),
            };
            let uses_rust = sources.iter().any(SourcePath::is_rust);
            if uses_rust && raw.output_type.is_binary() && crate_root.is_none() {
                return Err(invalid(
                    &label,
                    "unable to determine the crate root; set `crate_root`",
                ));
            }
            let crate_name = raw
                .crate_name
                .unwrap_or_else(|| label.name().replace('-', "_"));
            let crate_type = raw
                .crate_type
                .unwrap_or_else(|| CrateType::default_for(raw.output_type));

            targets.push(Target {
                label,
                toolchain,
                output_type: raw.output_type,
                sources,
                crate_root,
                crate_name,
                crate_type,
                testonly: raw.testonly,
                public_deps,
                private_deps,
                config_values: ConfigValues {
                    rustflags: raw.rustflags,
                    rustenv: raw.rustenv,
                },
                configs: applied,
                outputs: raw.outputs.into_iter().map(OutputFile::new).collect(),
            });
        }

        Ok(BuildGraph {
            root_path: self.root_path,
            build_dir: self.build_dir,
            default_toolchain,
            toolchains,
            configs,
            targets,
        })
    }
}

/// Source files must be source-absolute (`//...`) or absolute system paths.
fn source_file(label: &Label, value: String) -> Result<SourcePath, ProjectError> {
    let path = SourcePath::new(value);
    if path.is_source_absolute() || Path::new(path.value()).is_absolute() {
        Ok(path)
    } else {
        Err(invalid(
            label,
            format!("source `{path}` is neither source-absolute nor an absolute path"),
        ))
    }
}

/// Parses a label that must not carry a toolchain (toolchains, configs).
fn parse_plain_label(input: &str) -> Result<Label, ProjectError> {
    let label = Label::parse(input, None).map_err(|reason| invalid(input, reason))?;
    if label.toolchain_label().is_some() {
        return Err(invalid(input, "unexpected toolchain suffix"));
    }
    Ok(label)
}

/// A target with one Rust source uses it as the crate root; otherwise the
/// conventional `main.rs` (executables) or `lib.rs` is looked for.
fn infer_crate_root(sources: &[SourcePath], output_type: OutputType) -> Option<SourcePath> {
    let mut rust_sources = sources.iter().filter(|s| s.is_rust());
    let first = rust_sources.next()?;
    if rust_sources.next().is_none() {
        return Some(first.clone());
    }
    let wanted = match output_type {
        OutputType::Executable => "main.rs",
        _ => "lib.rs",
    };
    sources
        .iter()
        .find(|source| source.file_name() == wanted)
        .cloned()
}
