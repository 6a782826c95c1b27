//! Text rendering of the harness's observable fields.

use std::io::{self, Write};

use wearprobe_core::IntegrationHarness;
use wearprobe_core::harness::HarnessSnapshot;

/// Tracks which log entries have already been printed.
#[derive(Debug, Default)]
pub struct LogTail {
    generation: u64,
    printed: usize,
}

impl LogTail {
    /// Print every entry appended since the last call. A cleared log
    /// restarts the tail from the top.
    pub fn print_new(&mut self, harness: &IntegrationHarness, out: &mut impl Write) -> io::Result<()> {
        let log = harness.event_log();
        if log.generation() != self.generation {
            self.generation = log.generation();
            self.printed = 0;
        }
        for entry in log.entries().iter().skip(self.printed) {
            writeln!(out, "{entry}")?;
        }
        self.printed = log.len();
        out.flush()
    }
}

/// Write the header block: config values, configure status, registration.
pub fn write_summary(snapshot: &HarnessSnapshot, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "SDK: {}", snapshot.sdk)?;
    if let Some(config) = &snapshot.config {
        for (key, value) in config.iter() {
            writeln!(out, "  {key}: \"{value}\"")?;
        }
    }
    match &snapshot.configure_error {
        Some(err) => writeln!(out, "Configure error: {err}")?,
        None => writeln!(out, "Configure: OK")?,
    }
    writeln!(out, "Registration: {}", snapshot.registration_label())?;
    Ok(())
}
