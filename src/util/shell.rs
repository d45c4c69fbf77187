//! Shell output for status messages.
//!
//! Every user-facing line goes through [`Shell::status`], which right-aligns
//! a colored status word in a 12-column gutter the way cargo does:
//!
//! ```text
//!    Compiling addon (debug)
//!     Finished native/index.node
//! ```
//!
//! The library never prints on its own; operations receive a [`Log`]
//! callback, and the binary wires that callback to a `Shell`.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

use clap::ValueEnum;

/// When to emit ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Color when stderr is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn enabled(self) -> bool {
        match self {
            ColorChoice::Auto => io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

/// What a status line reports. The shell picks word, color and visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Compiling,
    Cleaning,
    Stale,
    Removed,
    Finished,
    Info,
    Warning,
    Error,
}

const GREEN: &str = "\x1b[1;32m";
const CYAN: &str = "\x1b[1;36m";
const BLUE: &str = "\x1b[1;34m";
const YELLOW: &str = "\x1b[1;33m";
const RED: &str = "\x1b[1;31m";
const RESET: &str = "\x1b[0m";

impl Status {
    /// Status word and its color.
    fn label(self) -> (&'static str, &'static str) {
        match self {
            Status::Compiling => ("Compiling", CYAN),
            Status::Cleaning => ("Cleaning", CYAN),
            Status::Stale => ("Stale", YELLOW),
            Status::Removed => ("Removed", GREEN),
            Status::Finished => ("Finished", GREEN),
            Status::Info => ("Info", BLUE),
            Status::Warning => ("warning", YELLOW),
            Status::Error => ("error", RED),
        }
    }
}

const STATUS_WIDTH: usize = 12;

/// Logging callback injected into build and clean.
pub type Log<'a> = &'a dyn Fn(Status, &str);

/// How much the shell prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Warnings and errors only
    Quiet,
    #[default]
    Normal,
    /// Also `Info` lines
    Verbose,
}

/// Status printer writing to stderr.
#[derive(Debug, Default)]
pub struct Shell {
    verbosity: Verbosity,
    color: bool,
}

impl Shell {
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        Shell {
            verbosity,
            color: color.enabled(),
        }
    }

    /// Shell for the global `--quiet` / `--verbose` flags; quiet wins.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice) -> Self {
        let verbosity = match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        };
        Shell::new(verbosity, color)
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Print `msg` under `status` if the verbosity allows it.
    pub fn status(&self, status: Status, msg: impl Display) {
        if !self.shows(status) {
            return;
        }
        // A closed stderr is not worth failing a build over.
        let _ = writeln!(io::stderr().lock(), "{} {}", self.gutter(status), msg);
    }

    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    fn shows(&self, status: Status) -> bool {
        let needed = match status {
            Status::Warning | Status::Error => Verbosity::Quiet,
            Status::Info => Verbosity::Verbose,
            _ => Verbosity::Normal,
        };
        self.verbosity >= needed
    }

    fn gutter(&self, status: Status) -> String {
        let (word, color) = status.label();
        if self.color {
            format!("{color}{word:>STATUS_WIDTH$}{RESET}")
        } else {
            format!("{word:>STATUS_WIDTH$}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gutter_is_right_aligned() {
        let shell = Shell::new(Verbosity::Normal, ColorChoice::Never);

        let gutter = shell.gutter(Status::Finished);
        assert_eq!(gutter, "    Finished");
        assert_eq!(shell.gutter(Status::Compiling).len(), STATUS_WIDTH);
    }

    #[test]
    fn test_colored_gutter() {
        let shell = Shell::new(Verbosity::Normal, ColorChoice::Always);
        let gutter = shell.gutter(Status::Stale);
        assert!(gutter.starts_with(YELLOW));
        assert!(gutter.ends_with(RESET));
        assert!(gutter.contains("Stale"));
    }

    #[test]
    fn test_quiet_shows_only_problems() {
        let shell = Shell::from_flags(true, true, ColorChoice::Never);
        assert_eq!(shell.verbosity(), Verbosity::Quiet);
        assert!(!shell.shows(Status::Finished));
        assert!(!shell.shows(Status::Stale));
        assert!(shell.shows(Status::Warning));
        assert!(shell.shows(Status::Error));
    }

    #[test]
    fn test_info_needs_verbose() {
        let normal = Shell::from_flags(false, false, ColorChoice::Never);
        assert!(normal.shows(Status::Compiling));
        assert!(!normal.shows(Status::Info));

        let verbose = Shell::from_flags(false, true, ColorChoice::Never);
        assert!(verbose.shows(Status::Info));
    }
}
