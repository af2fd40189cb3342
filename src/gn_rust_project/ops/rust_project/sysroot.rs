//! Standard library crates of a toolchain's sysroot.
//!
//! The sysroot crates are not part of the build graph, so they are added to
//! the crate list as synthetic crates the first time a crate built against
//! that sysroot is resolved.

use std::collections::HashMap;

use crate::core::BuildSettings;

use super::crate_list::{CrateId, CrateList};

/// Crates shipped in every sysroot, in the order they are added.
pub const SYSROOT_CRATES: &[&str] = &[
    "std",
    "core",
    "alloc",
    "panic_unwind",
    "proc_macro",
    "test",
    "panic_abort",
    "unwind",
];

/// Edition the sysroot crates are described with.
const SYSROOT_EDITION: &str = "2018";

/// Dependencies between sysroot crates. Crates not listed have none.
fn sysroot_deps(name: &str) -> &'static [&'static str] {
    match name {
        "alloc" => &["core"],
        "std" => &["alloc", "core", "panic_abort", "unwind"],
        _ => &[],
    }
}

/// Ids of the crates of one sysroot, by crate name.
pub type SysrootCrates = HashMap<&'static str, CrateId>;

/// Memoizes the synthetic crates of every sysroot seen so far.
#[derive(Default, Debug)]
pub struct SysrootRegistry {
    sysroots: HashMap<String, SysrootCrates>,
}

impl SysrootRegistry {
    pub fn new() -> SysrootRegistry {
        SysrootRegistry::default()
    }

    /// Returns the crates of `sysroot`, adding them to `crates` if this is the
    /// first time `sysroot` is asked for.
    pub fn ensure(
        &mut self,
        build_settings: &BuildSettings,
        sysroot: &str,
        crates: &mut CrateList,
    ) -> &SysrootCrates {
        self.sysroots
            .entry(sysroot.to_string())
            .or_insert_with(|| {
                let _span = tracing::trace_span!("sysroot", sysroot).entered();
                let mut lookup = SysrootCrates::new();
                for &name in SYSROOT_CRATES {
                    add_sysroot_crate(build_settings, name, sysroot, &mut lookup, crates);
                }
                lookup
            })
    }

    pub fn get(&self, sysroot: &str) -> Option<&SysrootCrates> {
        self.sysroots.get(sysroot)
    }
}

fn add_sysroot_crate(
    build_settings: &BuildSettings,
    name: &'static str,
    sysroot: &str,
    lookup: &mut SysrootCrates,
    crates: &mut CrateList,
) {
    if lookup.contains_key(name) {
        return;
    }
    for &dep in sysroot_deps(name) {
        add_sysroot_crate(build_settings, dep, sysroot, lookup, crates);
    }

    let root = build_settings.sysroot_crate_root(sysroot, name);
    let krate = crates.push(root, None, name, name, SYSROOT_EDITION);
    krate.add_cfg("debug_assertions");
    for &dep in sysroot_deps(name) {
        // Added by the loop above.
        if let Some(&id) = lookup.get(dep) {
            krate.add_dep(id, dep);
        }
    }
    tracing::trace!(id = %krate.id(), name, "added sysroot crate");
    lookup.insert(name, krate.id());
}
