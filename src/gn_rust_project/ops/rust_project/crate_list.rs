use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

use crate::core::{OutputFile, SourceDir, SourcePath};

/// Handle of a crate in a [`CrateList`]: its position in the list.
///
/// A crate's id is always lower than the id of any crate depending on it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct CrateId(usize);

impl CrateId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CrateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One resolved crate of the project.
#[derive(Clone, Debug)]
pub struct Crate {
    id: CrateId,
    root: SourcePath,
    gen_dir: Option<SourceDir>,
    name: String,
    label: String,
    edition: String,
    compiler_args: Vec<String>,
    compiler_target: Option<String>,
    cfgs: Vec<String>,
    deps: Vec<(CrateId, String)>,
    proc_macro_path: Option<OutputFile>,
    rustenv: BTreeMap<String, String>,
}

impl Crate {
    pub fn id(&self) -> CrateId {
        self.id
    }

    pub fn root(&self) -> &SourcePath {
        &self.root
    }

    /// Directory of generated sources, if the crate has any.
    pub fn gen_dir(&self) -> Option<&SourceDir> {
        self.gen_dir.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn edition(&self) -> &str {
        &self.edition
    }

    pub fn compiler_args(&self) -> &[String] {
        &self.compiler_args
    }

    pub fn set_compiler_args(&mut self, args: Vec<String>) {
        self.compiler_args = args;
    }

    pub fn compiler_target(&self) -> Option<&str> {
        self.compiler_target.as_deref()
    }

    pub fn set_compiler_target(&mut self, target: impl Into<String>) {
        self.compiler_target = Some(target.into());
    }

    pub fn cfgs(&self) -> &[String] {
        &self.cfgs
    }

    /// Records a `cfg`. Repeats are kept.
    pub fn add_cfg(&mut self, cfg: impl Into<String>) {
        self.cfgs.push(cfg.into());
    }

    /// Dependency edges as `(id, crate name)`, in insertion order.
    pub fn deps(&self) -> &[(CrateId, String)] {
        &self.deps
    }

    pub fn add_dep(&mut self, id: CrateId, name: impl Into<String>) {
        debug_assert!(id < self.id, "crate {} depends on later crate {id}", self.id);
        self.deps.push((id, name.into()));
    }

    pub fn is_proc_macro(&self) -> bool {
        self.proc_macro_path.is_some()
    }

    /// Compiled dylib of a procedural macro crate.
    pub fn proc_macro_path(&self) -> Option<&OutputFile> {
        self.proc_macro_path.as_ref()
    }

    pub fn set_proc_macro_path(&mut self, output: OutputFile) {
        self.proc_macro_path = Some(output);
    }

    pub fn rustenv(&self) -> &BTreeMap<String, String> {
        &self.rustenv
    }

    /// Records an environment variable unless `name` was already recorded.
    pub fn add_rustenv(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.rustenv.entry(name.into()).or_insert_with(|| value.into());
    }
}

/// The ordered list of resolved crates. Ids are assigned on push.
#[derive(Default, Debug)]
pub struct CrateList {
    crates: Vec<Crate>,
}

impl CrateList {
    pub fn new() -> CrateList {
        CrateList::default()
    }

    /// Appends a crate with the next id and returns it for filling in.
    pub fn push(
        &mut self,
        root: SourcePath,
        gen_dir: Option<SourceDir>,
        name: impl Into<String>,
        label: impl Into<String>,
        edition: impl Into<String>,
    ) -> &mut Crate {
        let id = CrateId(self.crates.len());
        self.crates.push(Crate {
            id,
            root,
            gen_dir,
            name: name.into(),
            label: label.into(),
            edition: edition.into(),
            compiler_args: Vec::new(),
            compiler_target: None,
            cfgs: Vec::new(),
            deps: Vec::new(),
            proc_macro_path: None,
            rustenv: BTreeMap::new(),
        });
        &mut self.crates[id.0]
    }

    pub fn len(&self) -> usize {
        self.crates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Crate> {
        self.crates.iter()
    }
}

impl Index<CrateId> for CrateList {
    type Output = Crate;

    fn index(&self, id: CrateId) -> &Crate {
        &self.crates[id.0]
    }
}

impl<'a> IntoIterator for &'a CrateList {
    type Item = &'a Crate;
    type IntoIter = std::slice::Iter<'a, Crate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
