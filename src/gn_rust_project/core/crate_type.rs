use serde::Deserialize;

use crate::core::OutputType;

/// Types of the output artifact that the compiler emits for a Rust target.
///
/// Picks which Rust tool of the toolchain compiles the target, and with it
/// whether the crate is a procedural macro.
///
/// See <https://doc.rust-lang.org/nightly/reference/linkage.html>.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Deserialize)]
pub enum CrateType {
    #[serde(rename = "bin")]
    Bin,
    #[serde(rename = "rlib")]
    Rlib,
    #[serde(rename = "dylib")]
    Dylib,
    #[serde(rename = "cdylib")]
    Cdylib,
    #[serde(rename = "staticlib")]
    Staticlib,
    #[serde(rename = "proc-macro")]
    ProcMacro,
}

impl CrateType {
    /// The crate type a target gets when it doesn't ask for one explicitly.
    pub fn default_for(output_type: OutputType) -> CrateType {
        match output_type {
            OutputType::Executable => CrateType::Bin,
            OutputType::RustProcMacro => CrateType::ProcMacro,
            OutputType::SharedLibrary => CrateType::Dylib,
            OutputType::LoadableModule => CrateType::Cdylib,
            OutputType::StaticLibrary => CrateType::Staticlib,
            _ => CrateType::Rlib,
        }
    }

    /// Name of the toolchain tool that compiles this crate type.
    pub fn tool_name(&self) -> &'static str {
        match self {
            CrateType::Bin => "rust_bin",
            CrateType::Rlib => "rust_rlib",
            CrateType::Dylib => "rust_dylib",
            CrateType::Cdylib => "rust_cdylib",
            CrateType::Staticlib => "rust_staticlib",
            CrateType::ProcMacro => "rust_macro",
        }
    }

    pub fn is_proc_macro(&self) -> bool {
        matches!(self, CrateType::ProcMacro)
    }
}
