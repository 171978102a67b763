//! Command line parser
//!
//! Whitespace-separated tokens: a command name and at most [`MAX_ARGS`]
//! arguments. Extra tokens are ignored.

use core::str::FromStr;

use super::ConsoleError;

/// Maximum number of arguments kept per command
pub const MAX_ARGS: usize = 3;

/// Parsed command line borrowing from the input buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    pub command: &'a str,
    pub args: [Option<&'a str>; MAX_ARGS],
}

impl<'a> ParsedCommand<'a> {
    pub const fn empty() -> Self {
        Self {
            command: "",
            args: [None; MAX_ARGS],
        }
    }

    /// Argument by index (0-based)
    pub fn arg(&self, idx: usize) -> Option<&'a str> {
        self.args.get(idx).copied().flatten()
    }

    /// Required argument, parsed
    pub fn parse_arg<T: FromStr>(&self, idx: usize) -> Result<T, ConsoleError> {
        self.arg(idx)
            .ok_or(ConsoleError::MissingArg)?
            .parse()
            .map_err(|_| ConsoleError::InvalidValue)
    }

    pub fn arg_count(&self) -> usize {
        self.args.iter().flatten().count()
    }
}

/// Split a line into command and arguments
pub fn parse_line(line: &str) -> ParsedCommand<'_> {
    let mut tokens = line.split_whitespace();
    let mut parsed = ParsedCommand::empty();

    if let Some(command) = tokens.next() {
        parsed.command = command;
    }
    for (slot, token) in parsed.args.iter_mut().zip(tokens) {
        *slot = Some(token);
    }
    parsed
}
