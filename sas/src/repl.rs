//! The interactive feed-a-line driver (spec §6): text arrives one line at a
//! time, accumulates into a buffer, and the buffer is handed to the parser
//! after every line. [`ParseOutcome::Complete`] executes and moves on to
//! whatever is left of the buffer; [`ParseOutcome::Incomplete`] keeps
//! buffering and waits for another line; [`ParseOutcome::Error`] reports
//! and starts over with an empty buffer.

use sas_core::Environment;
use sas_parser::{ParseOutcome, Parser};

use crate::listing::Listing;
use crate::run_statement;

/// Drives one REPL session's worth of line-by-line parsing and execution.
///
/// The parser has no notion of "feed more tokens into an existing stream",
/// so each call re-lexes the whole buffer from scratch and replays past the
/// statements already executed out of it. REPL input is small and typed by
/// a human, so the quadratic-in-statements-per-buffer cost here never
/// matters in practice.
#[derive(Default)]
pub struct Repl {
    buffer: String,
    executed: usize,
}

/// One outcome of feeding a line to the REPL, for the caller to report.
pub enum LineOutcome {
    /// Zero or more statements ran; the buffer is now empty or holds the
    /// start of a still-incomplete one.
    Ran,
    /// The buffer is syntactically broken; it has been cleared.
    SyntaxError(String),
}

impl Repl {
    /// A fresh REPL with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one more line of source text, executing every statement it
    /// completes against `env` and sending PROC output to `listing`.
    pub fn feed_line(&mut self, line: &str, env: &mut Environment, listing: &mut dyn Listing) -> LineOutcome {
        self.buffer.push_str(line);
        self.buffer.push('\n');

        let mut parser = match Parser::new_with_source(&self.buffer) {
            Ok(parser) => parser,
            Err(err) => return self.reset_on_error(err.to_string()),
        };

        for _ in 0..self.executed {
            parser.parse_next_statement();
        }

        loop {
            match parser.parse_next_statement() {
                ParseOutcome::Complete(stmt) => {
                    self.executed += 1;
                    if let Err(err) = run_statement(&stmt, env, listing) {
                        return self.reset_on_error(err.to_string());
                    }
                }
                ParseOutcome::Incomplete => return LineOutcome::Ran,
                ParseOutcome::Error(err) => return self.reset_on_error(err.to_string()),
                ParseOutcome::Eof => {
                    self.buffer.clear();
                    self.executed = 0;
                    return LineOutcome::Ran;
                }
            }
        }
    }

    fn reset_on_error(&mut self, message: String) -> LineOutcome {
        self.buffer.clear();
        self.executed = 0;
        LineOutcome::SyntaxError(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BufferListing;

    #[test]
    fn incomplete_statement_waits_for_more_lines() {
        let mut repl = Repl::new();
        let mut env = Environment::new();
        let mut listing = BufferListing::default();

        assert!(matches!(repl.feed_line("data a;", &mut env, &mut listing), LineOutcome::Ran));
        assert!(matches!(repl.feed_line("x = 1;", &mut env, &mut listing), LineOutcome::Ran));
        assert!(matches!(repl.feed_line("run;", &mut env, &mut listing), LineOutcome::Ran));

        let dataset = env.lookup_dataset(None, "a").unwrap();
        assert_eq!(dataset.row_count(), 1);
    }

    #[test]
    fn syntax_error_clears_the_buffer() {
        let mut repl = Repl::new();
        let mut env = Environment::new();
        let mut listing = BufferListing::default();

        let outcome = repl.feed_line("data a; x = ; run;", &mut env, &mut listing);
        assert!(matches!(outcome, LineOutcome::SyntaxError(_)));
        assert_eq!(repl.buffer, "");
    }

    #[test]
    fn two_statements_on_one_line_both_run() {
        let mut repl = Repl::new();
        let mut env = Environment::new();
        let mut listing = BufferListing::default();

        repl.feed_line("data a; x = 1; run; data b; y = 2; run;", &mut env, &mut listing);
        assert_eq!(env.lookup_dataset(None, "a").unwrap().row_count(), 1);
        assert_eq!(env.lookup_dataset(None, "b").unwrap().row_count(), 1);
    }
}
