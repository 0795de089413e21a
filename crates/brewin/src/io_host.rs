//! Host I/O: line-oriented stdin/stdout the evaluator is given rather than
//! owning directly, mirroring the teacher's `PrintWriter` trait shape.
//!
//! The spec's host interface also has a terminating `error(kind, message)`
//! call. Idiomatic Rust has no non-returning callback for that: every
//! evaluator entry point returns `Result<_, EvalError>` instead, so the
//! "error" half of the host interface is just ordinary `?`-propagation.

use std::cell::RefCell;
use std::io::{self, BufRead, Write as _};

/// Implement this to supply stdin/stdout for a running program.
pub trait HostIo {
    /// Appends one line of output (no trailing newline — the caller adds it).
    fn output(&mut self, line: &str);

    /// Reads the next line of input, with the trailing newline stripped.
    /// Returns an empty string once input is exhausted, matching the
    /// reference implementation's tolerance of a missing final line.
    fn get_input(&mut self) -> String;
}

/// Default host: reads from real stdin, writes to real stdout.
#[derive(Debug)]
pub struct StdIo {
    stdin: RefCell<io::BufReader<io::Stdin>>,
}

impl StdIo {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdin: RefCell::new(io::BufReader::new(io::stdin())),
        }
    }
}

impl Default for StdIo {
    fn default() -> Self {
        Self::new()
    }
}

impl HostIo for StdIo {
    fn output(&mut self, line: &str) {
        let mut stdout = io::stdout();
        let _ = writeln!(stdout, "{line}");
        let _ = stdout.flush();
    }

    fn get_input(&mut self) -> String {
        let mut line = String::new();
        let _ = self.stdin.borrow_mut().read_line(&mut line);
        line.trim_end_matches(['\n', '\r']).to_owned()
    }
}

/// Collects output in memory and serves input from a fixed list of lines.
/// Used by tests and the HTTP surface, which both need a captured output
/// buffer rather than real process stdio.
#[derive(Debug, Default)]
pub struct CollectedIo {
    output: Vec<String>,
    input: std::collections::VecDeque<String>,
}

impl CollectedIo {
    #[must_use]
    pub fn new(input_lines: impl IntoIterator<Item = String>) -> Self {
        Self {
            output: Vec::new(),
            input: input_lines.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn into_output(self) -> Vec<String> {
        self.output
    }

    #[must_use]
    pub fn output_lines(&self) -> &[String] {
        &self.output
    }
}

impl HostIo for CollectedIo {
    fn output(&mut self, line: &str) {
        self.output.push(line.to_owned());
    }

    fn get_input(&mut self) -> String {
        self.input.pop_front().unwrap_or_default()
    }
}
