//! Discovery of the crates in a build graph.
//!
//! Every Rust-compiling target is filed under the root module of the crate it
//! builds, so several variants of one crate (other toolchains, test builds)
//! collapse into a single entry. Entries are later visited once each by the
//! resolver.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};

use crate::core::{BuildGraph, OutputType, SourcePath, TargetId};

use super::crate_list::CrateId;

/// Resolution progress of one crate.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum VisitState {
    #[default]
    Unvisited,
    /// Resolution has started. The id is assigned once the crate is pushed.
    Visited(Option<CrateId>),
}

/// Bookkeeping for one crate root.
#[derive(Debug)]
pub struct CrateInfo {
    /// Every target building this crate, in discovery order. Never empty.
    pub targets: Vec<TargetId>,
    pub state: VisitState,
}

impl CrateInfo {
    pub fn id(&self) -> Option<CrateId> {
        match self.state {
            VisitState::Visited(id) => id,
            VisitState::Unvisited => None,
        }
    }
}

/// All crates of a build graph keyed by root module, in discovery order.
#[derive(Debug, Default)]
pub struct CrateIndex {
    crates: IndexMap<SourcePath, CrateInfo>,
}

impl CrateIndex {
    /// Scans `graph` for targets that compile Rust.
    ///
    /// Targets are taken in label order so that discovery order, and with it
    /// crate numbering, doesn't depend on how the graph was enumerated.
    pub fn discover(graph: &BuildGraph) -> CrateIndex {
        let mut targets: Vec<TargetId> = graph.resolved_targets().collect();
        targets.sort_by_cached_key(|&id| graph.target(id).label().to_string());

        let mut index = CrateIndex::default();
        for id in targets {
            let target = graph.target(id);
            if !target.is_binary() || !target.rust_source_used() {
                continue;
            }
            // The loader rejects Rust binaries without a crate root.
            let Some(root) = target.crate_root() else {
                continue;
            };
            index
                .crates
                .entry(root.clone())
                .or_insert_with(|| CrateInfo {
                    targets: Vec::new(),
                    state: VisitState::Unvisited,
                })
                .targets
                .push(id);
        }
        tracing::debug!(crates = index.crates.len(), "discovered crates");
        index
    }

    pub fn get(&self, root: &SourcePath) -> Option<&CrateInfo> {
        self.crates.get(root)
    }

    pub fn get_mut(&mut self, root: &SourcePath) -> Option<&mut CrateInfo> {
        self.crates.get_mut(root)
    }

    /// Crate roots in discovery order.
    pub fn roots(&self) -> impl Iterator<Item = &SourcePath> {
        self.crates.keys()
    }
}

/// Collects the crates `target` links against directly.
///
/// Groups are looked through, to any depth. Rust dependencies are not: their
/// own dependencies are found when they are resolved in turn.
pub fn rust_deps(graph: &BuildGraph, target: TargetId, deps: &mut IndexSet<SourcePath>) {
    let mut groups = HashSet::new();
    collect_rust_deps(graph, target, deps, &mut groups);
}

fn collect_rust_deps(
    graph: &BuildGraph,
    target: TargetId,
    deps: &mut IndexSet<SourcePath>,
    groups: &mut HashSet<TargetId>,
) {
    for dep_id in graph.linked_deps(target) {
        let dep = graph.target(dep_id);
        if dep.rust_source_used() {
            match dep.crate_root() {
                Some(root) => {
                    deps.insert(root.clone());
                }
                None => tracing::warn!(
                    target = %graph.target(target).label(),
                    dep = %dep.label(),
                    "dependency uses Rust but has no crate root"
                ),
            }
        } else if dep.output_type() == OutputType::Group && groups.insert(dep_id) {
            collect_rust_deps(graph, dep_id, deps, groups);
        }
    }
}
