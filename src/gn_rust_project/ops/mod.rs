pub use self::rust_project::{
    RustProjectOptions, WriteOutcome, build_crate_list, render_rust_project, write_rust_project,
};

pub mod rust_project;
