//! Serialization of a [`CrateList`] into `rust-project.json`.
//!
//! The layout follows the format rust-analyzer reads: see
//! <https://rust-analyzer.github.io/book/non_cargo_based_projects.html>.
//! Key order within each crate is fixed by field order below.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::BuildSettings;
use crate::util::errors::GnResult;

use super::crate_list::{Crate, CrateList};

#[derive(Serialize)]
struct SerializedProject<'a> {
    crates: Vec<SerializedCrate<'a>>,
}

#[derive(Serialize)]
struct SerializedCrate<'a> {
    crate_id: usize,
    root_module: String,
    label: &'a str,
    source: SerializedSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    compiler_args: Vec<&'a str>,
    deps: Vec<SerializedDep<'a>>,
    edition: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_proc_macro: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    proc_macro_dylib_path: Option<String>,
    /// Always present, even when empty.
    cfg: &'a [String],
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    env: BTreeMap<&'a str, &'a str>,
}

#[derive(Serialize)]
struct SerializedSource {
    include_dirs: Vec<String>,
    exclude_dirs: Vec<String>,
}

#[derive(Serialize)]
struct SerializedDep<'a> {
    #[serde(rename = "crate")]
    krate: usize,
    name: &'a str,
}

fn serialize_crate<'a>(build_settings: &BuildSettings, krate: &'a Crate) -> SerializedCrate<'a> {
    let full = |path: std::path::PathBuf| path.to_string_lossy().into_owned();

    let mut include_dirs = vec![full(build_settings.full_path_of_dir(&krate.root().dir()))];
    if let Some(gen_dir) = krate.gen_dir() {
        include_dirs.push(full(build_settings.full_path_of_dir(gen_dir)));
    }

    SerializedCrate {
        crate_id: krate.id().index(),
        root_module: full(build_settings.full_path_of_file(krate.root())),
        label: krate.label(),
        source: SerializedSource {
            include_dirs,
            exclude_dirs: Vec::new(),
        },
        target: krate.compiler_target(),
        compiler_args: krate.compiler_args().iter().map(String::as_str).collect(),
        deps: krate
            .deps()
            .iter()
            .map(|(id, name)| SerializedDep {
                krate: id.index(),
                name,
            })
            .collect(),
        edition: krate.edition(),
        is_proc_macro: krate.is_proc_macro(),
        proc_macro_dylib_path: krate.proc_macro_path().map(|output| {
            full(build_settings.full_path_of_file(&build_settings.output_to_source(output)))
        }),
        cfg: krate.cfgs(),
        env: krate
            .rustenv()
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect(),
    }
}

/// Renders `crates` as pretty-printed JSON with platform line endings and a
/// trailing newline.
pub fn render(build_settings: &BuildSettings, crates: &CrateList) -> GnResult<String> {
    let project = SerializedProject {
        crates: crates
            .iter()
            .map(|krate| serialize_crate(build_settings, krate))
            .collect(),
    };
    let mut json = serde_json::to_string_pretty(&project)?;
    json.push('\n');
    if cfg!(windows) {
        json = json.replace('\n', "\r\n");
    }
    Ok(json)
}
