//! # gn-rust-project as a library
//!
//! Turns a resolved GN build graph into a `rust-project.json` manifest, the
//! project description rust-analyzer uses for builds that aren't driven by
//! Cargo.
//!
//! The pieces, leaf first:
//!
//! - [`core`]: the build graph model. [`core::BuildGraph`] is loaded from a
//!   JSON snapshot of the resolved graph and is read-only afterwards.
//! - [`ops::rust_project`]: crate discovery, resolution, and serialization.
//! - [`util`]: errors, configuration, and console output.
//!
//! The usual entry point is [`ops::write_rust_project`].

use std::fmt::Write as _;

use anyhow::Error;
use tracing::debug;

pub use crate::util::errors::{InternalError, internal};
use crate::util::errors::{CliError, is_internal};
use crate::util::shell::Shell;

pub mod core;
pub mod ops;
pub mod util;

/// Prints `err` to `shell` and exits the process with its exit code.
pub fn exit_with_error(err: CliError, shell: &mut Shell) -> ! {
    debug!("exit_with_error; err={:?}", err);

    if let Some(ref err) = err.error {
        if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
            let exit_code = if clap_err.use_stderr() { 1 } else { 0 };
            let _ = clap_err.print();
            std::process::exit(exit_code)
        }
    }

    let CliError { error, exit_code } = err;
    if let Some(error) = error {
        display_error(&error, shell);
    }

    std::process::exit(exit_code)
}

/// Displays an error, and all its causes, to stderr.
pub fn display_error(err: &Error, shell: &mut Shell) {
    debug!("display_error; err={:?}", err);
    _display_error(err, shell);
    if is_internal(err) {
        drop(shell.note("this is an unexpected gn-rust-project internal error"));
        drop(shell.note(
            "we would appreciate a bug report that includes the build graph snapshot",
        ));
    }
}

fn _display_error(err: &Error, shell: &mut Shell) {
    for (i, err) in err.chain().enumerate() {
        if i == 0 {
            drop(shell.error(err));
        } else {
            drop(writeln!(shell.err(), "\nCaused by:"));
            drop(write!(shell.err(), "{}", indented_lines(&err.to_string())));
        }
    }
}

fn indented_lines(text: &str) -> String {
    text.lines().fold(String::new(), |mut out, line| {
        if line.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, "  {line}");
        }
        out
    })
}
