use std::fmt;

use anyhow::Error;

pub type GnResult<T> = anyhow::Result<T>;

/// Failures the rust-project pass can report on its own, as opposed to plain
/// I/O failures which travel as [`anyhow::Error`] with context attached.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// The requested output location can't be placed under the build tree.
    #[error("cannot resolve `{value}` relative to the build directory: {reason}")]
    PathResolution { value: String, reason: String },

    /// The build graph snapshot is not self-consistent.
    #[error("invalid build graph at `{label}`: {reason}")]
    InvalidGraph { label: String, reason: String },

    /// A dependency crate was visited but never assigned a crate id when its
    /// dependent recorded the edge. Only ever raised wrapped in
    /// [`InternalError`].
    #[error("crate `{dependent}` depends on `{dependency}`, which has no crate id yet")]
    UnassignedDependency {
        dependent: String,
        dependency: String,
    },
}

/// Error wrapper related to problems in the resolution algorithm itself
/// rather than in the input graph.
///
/// When printed, these carry a note asking the user to file a bug.
#[derive(Debug)]
pub struct InternalError {
    inner: Error,
}

impl InternalError {
    pub fn new(inner: Error) -> InternalError {
        InternalError { inner }
    }
}

impl std::error::Error for InternalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

/// Creates an [`InternalError`] out of anything printable.
pub fn internal<S: Into<Error>>(error: S) -> Error {
    InternalError::new(error.into()).into()
}

/// Returns `true` if the error chain contains an [`InternalError`].
pub fn is_internal(error: &Error) -> bool {
    error.chain().any(|e| e.downcast_ref::<InternalError>().is_some())
}

// =============================================================================
// CLI errors

pub type CliResult = Result<(), CliError>;

/// The error type handed back to `main`: an optional error to print plus the
/// process exit code.
#[derive(Debug)]
pub struct CliError {
    /// The error to display. `None` means exit silently with `exit_code`.
    pub error: Option<anyhow::Error>,
    pub exit_code: i32,
}

impl CliError {
    pub fn new(error: anyhow::Error, code: i32) -> CliError {
        CliError {
            error: Some(error),
            exit_code: code,
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> CliError {
        CliError::new(err, 101)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> CliError {
        let code = if err.use_stderr() { 1 } else { 0 };
        CliError::new(err.into(), code)
    }
}
