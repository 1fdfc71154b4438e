//! Byte-progress reporting for transfers.
//!
//! A [`ProgressObserver`] is handed every chunk written to the staging file.
//! Observers only watch: they cannot fail a transfer or change its flow.

use std::io::{self, IsTerminal, Write};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::constants::{PLAIN_REDRAW_INTERVAL, PROGRESS_LINE_WIDTH};

const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];
const UNIT_BASE: f64 = 1000.0;

/// Receives per-chunk byte counts while a transfer streams to disk.
pub trait ProgressObserver {
    /// Called once per chunk written, with the chunk's length.
    fn on_bytes(&mut self, n: u64);

    /// Called once after the transfer ends, successfully or not.
    fn finish(&mut self) {}
}

/// Running byte total owned by a single transfer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCounter {
    total: u64,
}

impl ProgressCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `n` bytes and returns the new total.
    pub fn add(&mut self, n: u64) -> u64 {
        self.total = self.total.saturating_add(n);
        self.total
    }

    /// Bytes counted so far.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Formats a byte count with SI units and one fractional digit below ten.
///
/// `indicatif::HumanBytes` uses binary units with two decimals, so it is not used here.
///
/// ```
/// use grabber_core::fetch::humanize_bytes;
///
/// assert_eq!(humanize_bytes(0), "0 B");
/// assert_eq!(humanize_bytes(3_200_000), "3.2 MB");
/// assert_eq!(humanize_bytes(83_000_000), "83 MB");
/// ```
#[must_use]
pub fn humanize_bytes(bytes: u64) -> String {
    if bytes < 10 {
        return format!("{bytes} B");
    }
    #[allow(clippy::cast_precision_loss)]
    let mut scaled = bytes as f64;
    let mut exponent = 0;
    while scaled >= UNIT_BASE && exponent < UNITS.len() - 1 {
        scaled /= UNIT_BASE;
        exponent += 1;
    }
    let rounded = (scaled * 10.0 + 0.5).floor() / 10.0;
    let unit = UNITS[exponent];
    if rounded < 10.0 {
        format!("{rounded:.1} {unit}")
    } else {
        format!("{rounded:.0} {unit}")
    }
}

fn status_line(total: u64) -> String {
    format!("Downloading... {} complete", humanize_bytes(total))
}

/// Console progress line: `Downloading... <size> complete`, rewritten in place.
///
/// On a terminal the line is drawn through an `indicatif` bar; otherwise it is
/// written as carriage-return overwritten text, throttled to a few redraws
/// per second. Console write failures are ignored.
pub struct ConsoleProgress {
    counter: ProgressCounter,
    render: ProgressRender,
}

enum ProgressRender {
    Fancy(ProgressBar),
    Plain(PlainProgress),
    Hidden,
}

impl ConsoleProgress {
    /// Creates a console observer, auto-detecting terminal capability.
    #[must_use]
    pub fn new() -> Self {
        let render = if io::stdout().is_terminal() {
            ProgressRender::Fancy(fancy_bar())
        } else {
            ProgressRender::Plain(PlainProgress::new(Box::new(io::stdout())))
        };
        Self {
            counter: ProgressCounter::new(),
            render,
        }
    }

    /// Creates an observer that writes the plain `\r` status line to `out`.
    #[must_use]
    pub fn plain(out: Box<dyn Write + Send>) -> Self {
        Self {
            counter: ProgressCounter::new(),
            render: ProgressRender::Plain(PlainProgress::new(out)),
        }
    }

    /// Creates an observer that counts bytes but draws nothing.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            counter: ProgressCounter::new(),
            render: ProgressRender::Hidden,
        }
    }

    /// Bytes seen so far.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counter.total()
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ConsoleProgress {
    fn on_bytes(&mut self, n: u64) {
        let total = self.counter.add(n);
        match &mut self.render {
            ProgressRender::Fancy(bar) => bar.set_message(status_line(total)),
            ProgressRender::Plain(plain) => plain.update(total, false),
            ProgressRender::Hidden => {}
        }
    }

    fn finish(&mut self) {
        let total = self.counter.total();
        match &mut self.render {
            ProgressRender::Fancy(bar) => bar.finish_with_message(status_line(total)),
            ProgressRender::Plain(plain) => plain.finish(total),
            ProgressRender::Hidden => {}
        }
    }
}

fn fancy_bar() -> ProgressBar {
    let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
    bar.set_style(
        ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(status_line(0));
    bar
}

struct PlainProgress {
    out: Box<dyn Write + Send>,
    last_emit: Option<Instant>,
}

impl PlainProgress {
    fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            last_emit: None,
        }
    }

    fn update(&mut self, total: u64, force: bool) {
        let now = Instant::now();
        let due = self
            .last_emit
            .is_none_or(|last| now.duration_since(last) >= PLAIN_REDRAW_INTERVAL);
        if !force && !due {
            return;
        }
        self.last_emit = Some(now);

        // Progress output is best effort.
        let _ = write!(
            self.out,
            "\r{}\r{}",
            " ".repeat(PROGRESS_LINE_WIDTH),
            status_line(total)
        );
        let _ = self.out.flush();
    }

    fn finish(&mut self, total: u64) {
        self.update(total, true);
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}
