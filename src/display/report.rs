//! Backup report output
//!
//! Lines go through [`emit`], which ends them with `\r\n` while the terminal
//! is in raw mode so monitoring output stays aligned.

use std::io::{self, Write};

use crossterm::terminal::is_raw_mode_enabled;

use crate::backup::{BackupReport, ReportSink};

/// Separator printed after every backup run
pub const SEPARATOR: &str = "--------------------------------------------------";

/// Summary line, purge lines and separator for one run
pub fn format_report(report: &BackupReport) -> Vec<String> {
    let mut lines = vec![report.summary_line()];
    lines.extend(report.detail_lines().iter().map(|l| format!("      {}", l)));
    lines.push(SEPARATOR.to_string());
    lines
}

/// Write one line to stdout
pub fn emit(line: &str) {
    let ending = if is_raw_mode_enabled().unwrap_or(false) {
        "\r\n"
    } else {
        "\n"
    };
    let mut stdout = io::stdout().lock();
    // Nothing useful to do if stdout is gone
    let _ = write!(stdout, "{}{}", line, ending);
    let _ = stdout.flush();
}

/// Prints every report to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn deliver(&self, report: BackupReport) {
        for line in format_report(&report) {
            emit(&line);
        }
    }
}
