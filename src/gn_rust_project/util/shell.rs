use std::fmt;
use std::io::prelude::*;

use anstream::AutoStream;
use anstyle::Style;

use crate::util::errors::GnResult;
use crate::util::style::{ERROR, GOOD, NOTE, WARN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Verbose,
    Normal,
    Quiet,
}

/// Whether messages should use color output
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ColorChoice {
    /// Force color output
    Always,
    /// Force disable color output
    Never,
    /// Intelligently guess whether to use color output
    Auto,
}

impl ColorChoice {
    fn to_anstream(self) -> anstream::ColorChoice {
        match self {
            ColorChoice::Always => anstream::ColorChoice::Always,
            ColorChoice::Never => anstream::ColorChoice::Never,
            ColorChoice::Auto => anstream::ColorChoice::Auto,
        }
    }
}

/// A `Write`able object, either with or without color support
enum ShellOut {
    /// A plain write object without color support
    Write(AutoStream<Box<dyn Write>>),
    /// Color-enabled stdio
    Stream {
        stderr: AutoStream<std::io::Stderr>,
        color_choice: ColorChoice,
    },
}

/// An abstraction around console output that remembers preferences for output
/// verbosity and color.
pub struct Shell {
    output: ShellOut,
    verbosity: Verbosity,
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.output {
            ShellOut::Write(_) => f
                .debug_struct("Shell")
                .field("verbosity", &self.verbosity)
                .finish(),
            ShellOut::Stream { color_choice, .. } => f
                .debug_struct("Shell")
                .field("verbosity", &self.verbosity)
                .field("color_choice", color_choice)
                .finish(),
        }
    }
}

impl Shell {
    /// Creates a new shell writing to stderr, with automatic color detection
    /// and normal verbosity.
    pub fn new() -> Shell {
        let color_choice = ColorChoice::Auto;
        Shell {
            output: ShellOut::Stream {
                stderr: AutoStream::new(std::io::stderr(), color_choice.to_anstream()),
                color_choice,
            },
            verbosity: Verbosity::Normal,
        }
    }

    /// Creates a shell from a plain writable object, with no color, and max verbosity.
    pub fn from_write(out: Box<dyn Write>) -> Shell {
        Shell {
            output: ShellOut::Write(AutoStream::never(out)),
            verbosity: Verbosity::Verbose,
        }
    }

    fn print(
        &mut self,
        status: &dyn fmt::Display,
        message: Option<&dyn fmt::Display>,
        style: &Style,
        justified: bool,
    ) -> GnResult<()> {
        match self.verbosity {
            Verbosity::Quiet => Ok(()),
            _ => self.output.message_stderr(status, message, style, justified),
        }
    }

    /// Gets a reference to the underlying stderr writer.
    pub fn err(&mut self) -> &mut dyn Write {
        self.output.stderr()
    }

    /// Shortcut to right-align and color green a status message.
    pub fn status<T, U>(&mut self, status: T, message: U) -> GnResult<()>
    where
        T: fmt::Display,
        U: fmt::Display,
    {
        self.print(&status, Some(&message), &GOOD, true)
    }

    /// Runs the callback only if we are in verbose mode.
    pub fn verbose<F>(&mut self, mut callback: F) -> GnResult<()>
    where
        F: FnMut(&mut Shell) -> GnResult<()>,
    {
        match self.verbosity {
            Verbosity::Verbose => callback(self),
            _ => Ok(()),
        }
    }

    /// Prints a red 'error' message.
    pub fn error<T: fmt::Display>(&mut self, message: T) -> GnResult<()> {
        self.output
            .message_stderr(&"error", Some(&message), &ERROR, false)
    }

    /// Prints an amber 'warning' message.
    pub fn warn<T: fmt::Display>(&mut self, message: T) -> GnResult<()> {
        match self.verbosity {
            Verbosity::Quiet => Ok(()),
            _ => self.print(&"warning", Some(&message), &WARN, false),
        }
    }

    /// Prints a cyan 'note' message.
    pub fn note<T: fmt::Display>(&mut self, message: T) -> GnResult<()> {
        self.print(&"note", Some(&message), &NOTE, false)
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    /// Updates the color choice (always, never, or auto) from a string.
    pub fn set_color_choice(&mut self, color: Option<&str>) -> GnResult<()> {
        if let ShellOut::Stream {
            stderr,
            color_choice,
        } = &mut self.output
        {
            let cfg = color
                .map(|c| c.parse())
                .transpose()?
                .unwrap_or(ColorChoice::Auto);
            *color_choice = cfg;
            *stderr = AutoStream::new(std::io::stderr(), cfg.to_anstream());
        }
        Ok(())
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellOut {
    /// Prints out a message with a status. The status comes first, and is bold plus the given
    /// color. The status can be justified, in which case the max width that will right align is
    /// 12 chars.
    fn message_stderr(
        &mut self,
        status: &dyn fmt::Display,
        message: Option<&dyn fmt::Display>,
        style: &Style,
        justified: bool,
    ) -> GnResult<()> {
        let bold = anstyle::Style::new().bold();

        let mut buffer = Vec::new();
        if justified {
            write!(&mut buffer, "{style}{status:>12}{style:#}")?;
        } else {
            write!(&mut buffer, "{style}{status}{style:#}{bold}:{bold:#}")?;
        }
        match message {
            Some(message) => writeln!(buffer, " {message}")?,
            None => write!(buffer, " ")?,
        }
        self.stderr().write_all(&buffer)?;
        Ok(())
    }

    fn stderr(&mut self) -> &mut dyn Write {
        match self {
            ShellOut::Stream { stderr, .. } => stderr,
            ShellOut::Write(w) => w,
        }
    }
}

impl std::str::FromStr for ColorChoice {
    type Err = anyhow::Error;

    fn from_str(color: &str) -> Result<Self, Self::Err> {
        let cfg = match color {
            "always" => ColorChoice::Always,
            "never" => ColorChoice::Never,
            "auto" => ColorChoice::Auto,
            arg => anyhow::bail!(
                "argument for --color must be auto, always, or \
                 never, but found `{}`",
                arg
            ),
        };
        Ok(cfg)
    }
}
