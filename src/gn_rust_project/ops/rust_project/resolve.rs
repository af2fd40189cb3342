//! Resolution of discovered crates into an ordered [`CrateList`].
//!
//! Crates are resolved depth first: before a crate is pushed, every crate it
//! depends on (including the sysroot crates of its toolchain) is pushed, so a
//! crate's id is always lower than the ids of its dependents.
//!
//! When several targets build the same crate, one of them is picked as the
//! *main target* to describe it. A target in the default toolchain is
//! preferred, then one that isn't test-only; among equals the first one in
//! discovery order wins. Dependencies and `cfg`s are still gathered from every
//! target in the main target's toolchain, so a test variant's test-only
//! dependencies show up too.

use indexmap::IndexSet;

use crate::core::{BuildGraph, BuildSettings, SourcePath, TargetId};
use crate::util::errors::{GnResult, ProjectError, internal};

use super::args;
use super::crate_index::{CrateIndex, VisitState, rust_deps};
use super::crate_list::{CrateId, CrateList};
use super::sysroot::SysrootRegistry;

/// Sysroot crates every Rust crate may use without declaring them.
const IMPLICIT_SYSROOT_DEPS: &[&str] = &["core", "alloc", "std"];

/// Score of `target` as the main target of its crate; higher is better.
fn score(graph: &BuildGraph, target: TargetId) -> u8 {
    let mut score = 0;
    if graph.is_default_toolchain(target) {
        score += 2;
    }
    if !graph.target(target).testonly() {
        score += 1;
    }
    score
}

/// Picks the main target among `candidates`: the first one with the highest
/// score.
pub fn preferred_target(graph: &BuildGraph, candidates: &[TargetId]) -> Option<TargetId> {
    let mut best: Option<(TargetId, u8)> = None;
    for &candidate in candidates {
        let score = score(graph, candidate);
        tracing::trace!(target = %graph.target(candidate).label(), score, "candidate");
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((candidate, score));
        }
    }
    best.map(|(target, _)| target)
}

/// Resolves the crates of one build graph.
pub struct CrateGraphBuilder<'a> {
    graph: &'a BuildGraph,
    build_settings: &'a BuildSettings,
    index: CrateIndex,
    sysroots: SysrootRegistry,
    crates: CrateList,
}

impl<'a> CrateGraphBuilder<'a> {
    pub fn new(graph: &'a BuildGraph, build_settings: &'a BuildSettings) -> Self {
        CrateGraphBuilder {
            graph,
            build_settings,
            index: CrateIndex::discover(graph),
            sysroots: SysrootRegistry::new(),
            crates: CrateList::new(),
        }
    }

    /// Resolves every discovered crate, in discovery order.
    pub fn build(mut self) -> GnResult<CrateList> {
        let roots: Vec<SourcePath> = self.index.roots().cloned().collect();
        for root in &roots {
            self.resolve(root)?;
        }
        Ok(self.crates)
    }

    fn resolve(&mut self, root: &SourcePath) -> GnResult<()> {
        let graph = self.graph;
        let Some(info) = self.index.get_mut(root) else {
            return Err(internal(anyhow::format_err!(
                "crate `{root}` was never discovered"
            )));
        };
        if info.state != VisitState::Unvisited {
            return Ok(());
        }
        info.state = VisitState::Visited(None);
        let candidates = info.targets.clone();

        let main = preferred_target(graph, &candidates)
            .ok_or_else(|| internal(anyhow::format_err!("crate `{root}` has no targets")))?;
        let main_target = graph.target(main);
        let toolchain = main_target.toolchain();
        let same_toolchain: Vec<TargetId> = candidates
            .iter()
            .copied()
            .filter(|&target| graph.target(target).toolchain() == toolchain)
            .collect();

        let compiler_args = graph.rustflags(main);

        let sysroot = graph.sysroot(main);
        if !sysroot.is_empty() {
            self.sysroots
                .ensure(self.build_settings, sysroot, &mut self.crates);
        }

        let mut neighbors = IndexSet::new();
        for &target in &same_toolchain {
            rust_deps(graph, target, &mut neighbors);
        }
        neighbors.shift_remove(root);
        neighbors.retain(|dep| {
            let known = self.index.get(dep).is_some();
            if !known {
                tracing::warn!(
                    krate = %root,
                    dep = %dep,
                    "skipping dependency on a crate that no target builds"
                );
            }
            known
        });
        for dep in &neighbors {
            self.resolve(dep)?;
        }

        let mut deps = Vec::new();
        if !sysroot.is_empty() {
            if let Some(sysroot_crates) = self.sysroots.get(sysroot) {
                let proc_macro = main_target
                    .crate_type()
                    .is_proc_macro()
                    .then_some("proc_macro");
                for &name in IMPLICIT_SYSROOT_DEPS.iter().chain(&proc_macro) {
                    if let Some(&id) = sysroot_crates.get(name) {
                        deps.push((id, name.to_string()));
                    }
                }
            }
        }
        for dep in &neighbors {
            let id = self.index.get(dep).and_then(|info| info.id()).ok_or_else(|| {
                internal(ProjectError::UnassignedDependency {
                    dependent: root.to_string(),
                    dependency: dep.to_string(),
                })
            })?;
            deps.push((id, self.crates[id].name().to_string()));
        }

        let gen_dir = self
            .build_settings
            .gen_dir_for(main_target.label(), graph.is_default_toolchain(main));
        let krate = self.crates.push(
            root.clone(),
            Some(gen_dir),
            main_target.crate_name(),
            main_target.label().user_visible_name(false),
            args::edition(&compiler_args),
        );
        let id = krate.id();

        if let Some(target) = args::compiler_target(&compiler_args) {
            krate.set_compiler_target(target);
        }

        krate.add_cfg("test");
        krate.add_cfg("debug_assertions");
        for cfg in args::cfgs(&compiler_args) {
            krate.add_cfg(cfg);
        }
        for &target in &same_toolchain {
            for cfg in args::cfgs(&graph.rustflags(target)) {
                krate.add_cfg(cfg);
            }
        }

        for (dep, name) in deps {
            krate.add_dep(dep, name);
        }

        if main_target.crate_type().is_proc_macro() {
            if let Some(output) = main_target.computed_outputs().first() {
                krate.set_proc_macro_path(output.clone());
            }
        }

        for var in &main_target.config_values().rustenv {
            if let Some((name, value)) = var.split_once('=') {
                krate.add_rustenv(name.trim(), value.trim());
            }
        }

        krate.set_compiler_args(compiler_args);

        tracing::debug!(
            %id,
            %root,
            main = %main_target.label(),
            tool = main_target.crate_type().tool_name(),
            score = score(graph, main),
            "resolved crate"
        );
        self.assign(root, id)
    }

    fn assign(&mut self, root: &SourcePath, id: CrateId) -> GnResult<()> {
        match self.index.get_mut(root) {
            Some(info) => {
                info.state = VisitState::Visited(Some(id));
                Ok(())
            }
            None => Err(internal(anyhow::format_err!(
                "crate `{root}` disappeared while it was resolved"
            ))),
        }
    }
}
