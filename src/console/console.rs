//! Byte-driven console front end

use core::fmt::Write;

use super::{execute, parse_line, ConsoleContext, ConsoleError, LineBuffer};

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

const PROMPT: &str = "panel> ";

/// Console state machine
pub struct Console {
    line: LineBuffer,
    escape: EscapeState,
}

/// ANSI escape sequences (arrow keys etc.) are swallowed, not inserted.
#[derive(Clone, Copy, PartialEq, Eq)]
enum EscapeState {
    Normal,
    Escape,
    Csi,
}

impl Console {
    pub const fn new() -> Self {
        Self {
            line: LineBuffer::new(),
            escape: EscapeState::Normal,
        }
    }

    /// Process one input byte, echoing to `out`.
    ///
    /// Returns `Some(result)` when a non-empty line was executed.
    pub fn process_byte(
        &mut self,
        byte: u8,
        ctx: &mut ConsoleContext<'_>,
        out: &mut dyn Write,
    ) -> Option<Result<(), ConsoleError>> {
        match self.escape {
            EscapeState::Normal => self.process_normal(byte, ctx, out),
            EscapeState::Escape => {
                self.escape = if byte == b'[' { EscapeState::Csi } else { EscapeState::Normal };
                None
            }
            EscapeState::Csi => {
                // Parameters are 0x30..=0x3F, the final byte ends the sequence
                if !(0x30..=0x3F).contains(&byte) {
                    self.escape = EscapeState::Normal;
                }
                None
            }
        }
    }

    fn process_normal(
        &mut self,
        byte: u8,
        ctx: &mut ConsoleContext<'_>,
        out: &mut dyn Write,
    ) -> Option<Result<(), ConsoleError>> {
        match byte {
            b'\r' | b'\n' => {
                let _ = writeln!(out);
                if self.line.is_empty() {
                    self.print_prompt(out);
                    return None;
                }

                let result = execute(&parse_line(self.line.as_str()), ctx, out);
                if let Err(e) = result {
                    let _ = writeln!(out, "{}", e);
                }
                self.line.clear();
                self.print_prompt(out);
                Some(result)
            }

            // Backspace / DEL
            0x08 | 0x7F => {
                if self.line.backspace() {
                    let _ = write!(out, "\x08 \x08");
                }
                None
            }

            // Escape
            0x1B => {
                self.escape = EscapeState::Escape;
                None
            }

            // Ctrl+C
            0x03 => {
                let _ = writeln!(out, "^C");
                self.line.clear();
                self.print_prompt(out);
                None
            }

            // Ctrl+U (clear line)
            0x15 => {
                for _ in 0..self.line.len() {
                    let _ = write!(out, "\x08 \x08");
                }
                self.line.clear();
                None
            }

            _ => {
                if self.line.push(byte) {
                    let _ = write!(out, "{}", byte as char);
                }
                None
            }
        }
    }

    pub fn print_prompt(&self, out: &mut dyn Write) {
        let _ = write!(out, "{}", PROMPT);
    }

    pub fn print_banner(&self, out: &mut dyn Write) {
        let _ = writeln!(out, "\r\n{}", VERSION);
        let _ = writeln!(out, "Type 'help' for commands.");
        self.print_prompt(out);
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
