//! Terminal rendering for donor tables and counters.

use std::io::{self, Write};

use crate::stats::{Counter, CounterDisplay};
use crate::table::{TableView, HEADERS};

use super::OutputFormat;

/// Write `view` to `out` in the requested format.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_table<W: Write>(out: &mut W, view: &TableView, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, view)?;
            writeln!(out)
        }
        OutputFormat::Plain => match view {
            TableView::Rows(rows) => {
                for row in rows {
                    writeln!(out, "{}", row.cells().join("\t"))?;
                }
                Ok(())
            }
            TableView::Placeholder(message) | TableView::Error(message) => {
                writeln!(out, "{message}")
            }
        },
        OutputFormat::Table => write_aligned(out, view),
    }
}

fn write_aligned<W: Write>(out: &mut W, view: &TableView) -> io::Result<()> {
    let cells: Vec<[String; 6]> = view.rows().iter().map(|row| row.cells()).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{h:<w$}"))
        .collect();
    writeln!(out, "{}", header.join("  ").trim_end())?;

    let total = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    writeln!(out, "{}", "-".repeat(total))?;

    match view {
        TableView::Rows(_) => {
            for row in &cells {
                let line: Vec<String> = row
                    .iter()
                    .zip(widths)
                    .map(|(c, w)| format!("{c:<w$}"))
                    .collect();
                writeln!(out, "{}", line.join("  ").trim_end())?;
            }
            Ok(())
        }
        TableView::Placeholder(message) | TableView::Error(message) => {
            writeln!(out, "{message}")
        }
    }
}

/// Output streams for one command.
///
/// Tables go to `out`. Notices and counter lines go to `out` as well, except
/// in JSON mode, where they are sent to `status` so that `out` carries a
/// single JSON document.
#[derive(Debug)]
pub struct Console<O: Write, E: Write> {
    out: O,
    status: E,
    format: OutputFormat,
}

impl<O: Write, E: Write> Console<O, E> {
    /// Write tables in `format` to `out`, side output to `status`.
    pub fn new(out: O, status: E, format: OutputFormat) -> Self {
        Self {
            out,
            status,
            format,
        }
    }

    /// Where notices and counters are written.
    pub fn status(&mut self) -> &mut dyn Write {
        match self.format {
            OutputFormat::Json => &mut self.status,
            OutputFormat::Plain | OutputFormat::Table => &mut self.out,
        }
    }

    /// Print a one-line notice.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn notice(&mut self, message: &str) -> io::Result<()> {
        let status = self.status();
        writeln!(status, "{message}")?;
        status.flush()
    }

    /// Print `view` in the console's format.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn table(&mut self, view: &TableView) -> io::Result<()> {
        write_table(&mut self.out, view, self.format)?;
        self.out.flush()
    }

    /// Consume the console, returning both streams.
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.status)
    }
}

/// Draws both counters on a single, repeatedly rewritten line.
#[derive(Debug)]
pub struct TerminalCounters<W: Write> {
    out: W,
    registered_donors: u64,
    lives_saved: u64,
    drawn: bool,
}

impl<W: Write> TerminalCounters<W> {
    /// Draw counters on `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            registered_donors: 0,
            lives_saved: 0,
            drawn: false,
        }
    }

    /// End the counter line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output fails.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.drawn {
            writeln!(self.out)?;
            self.drawn = false;
        }
        self.out.flush()
    }

    /// Consume the display, returning the output.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CounterDisplay for TerminalCounters<W> {
    fn show(&mut self, counter: Counter, value: u64) {
        match counter {
            Counter::RegisteredDonors => self.registered_donors = value,
            Counter::LivesSaved => self.lives_saved = value,
        }
        // A failed redraw is dropped; the next frame tries again.
        let _ = write!(
            self.out,
            "\r{}: {}   {}: {}",
            Counter::RegisteredDonors,
            self.registered_donors,
            Counter::LivesSaved,
            self.lives_saved
        )
        .and_then(|()| self.out.flush());
        self.drawn = true;
    }
}
