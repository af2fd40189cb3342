pub use self::context::GlobalContext;
pub use self::errors::{CliError, CliResult, GnResult, internal};
pub use self::shell::{Shell, Verbosity};

pub mod context;
pub mod errors;
pub mod shell;
pub mod style;
