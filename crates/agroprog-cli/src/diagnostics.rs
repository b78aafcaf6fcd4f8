//! Message output for the CLI
//!
//! Warnings and errors go to stderr as `severity: message` lines so stdout
//! stays clean for the program preview (text or JSON).
//!
//! ## Exit Code Semantics
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success: no errors (warnings and an empty schedule allowed) |
//! | 1 | Failure: one or more errors emitted |
//!
//! `--quiet` hides warnings and informational lines but never errors, and
//! never changes the exit code. A run that ends without output or artifact
//! still says why through [`TerminalEmitter::notice`].

use std::io::Write;
use std::process;

use agroprog_core::ProgramWarning;

// ============================================================================
// Exit Code
// ============================================================================

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success: no errors
    Success = 0,
    /// Failure: one or more errors emitted
    Failure = 1,
}

impl ExitCode {
    pub fn from_error_count(count: usize) -> Self {
        if count > 0 {
            ExitCode::Failure
        } else {
            ExitCode::Success
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}

// ============================================================================
// Emitter
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// Writes severity-tagged lines and counts what it wrote
pub struct TerminalEmitter<W: Write> {
    writer: W,
    quiet: bool,
    error_count: usize,
    warning_count: usize,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, quiet: bool) -> Self {
        Self {
            writer,
            quiet,
            error_count: 0,
            warning_count: 0,
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from_error_count(self.error_count)
    }

    pub fn emit(&mut self, severity: Severity, message: &str) {
        match severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Info => {}
        }
        if self.quiet && severity != Severity::Error {
            return;
        }
        self.write_line(severity, message);
    }

    /// A warning shown even in quiet mode
    pub fn notice(&mut self, message: &str) {
        self.warning_count += 1;
        self.write_line(Severity::Warning, message);
    }

    fn write_line(&mut self, severity: Severity, message: &str) {
        // stderr may be closed
        let _ = writeln!(self.writer, "{}: {}", severity.as_str(), message);
    }

    pub fn error(&mut self, error: &anyhow::Error) {
        self.emit(Severity::Error, &format!("{error:#}"));
    }

    pub fn warning(&mut self, message: &str) {
        self.emit(Severity::Warning, message);
    }

    pub fn info(&mut self, message: &str) {
        self.emit(Severity::Info, message);
    }

    pub fn program_warnings(&mut self, warnings: &[ProgramWarning]) {
        for warning in warnings {
            self.warning(&warning.to_string());
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
