pub use self::build_graph::{BuildGraph, ConfigValues, OutputType, Target, TargetId, Toolchain};
pub use self::build_settings::BuildSettings;
pub use self::crate_type::CrateType;
pub use self::label::Label;
pub use self::source_path::{OutputFile, SourceDir, SourcePath};

pub mod build_graph;
pub mod build_settings;
mod crate_type;
mod label;
mod source_path;
