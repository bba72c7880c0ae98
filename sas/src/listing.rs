//! The listing destination (spec §6 "Listing"): where `PROC PRINT` and the
//! other reporting PROCs send their rendered output. The REPL and CLI wire
//! up [`StdoutListing`]; tests use a buffering implementation to assert on
//! rendered text without touching stdout.

/// A sink for one line of rendered report output.
pub trait Listing {
    /// Writes one line, without a trailing newline.
    fn write_line(&mut self, line: &str);
}

/// Writes every line straight to stdout — the CLI/REPL's listing.
#[derive(Default)]
pub struct StdoutListing;

impl Listing for StdoutListing {
    fn write_line(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Collects lines in memory, for tests and for embedding callers that want
/// the rendered report as a string.
#[derive(Default)]
pub struct BufferListing {
    /// The lines written so far, in order.
    pub lines: Vec<String>,
}

impl Listing for BufferListing {
    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}
