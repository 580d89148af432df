//! Progress reporting: one bar per in-flight download.
//!
//! `ProgressBoard` owns the shared `MultiProgress` for a batch; workers get a
//! `ProgressEntry` each and feed it through `ProgressWriter`, which forwards
//! every written chunk length to a `ProgressSink`.

use std::io::{self, Write};
use std::sync::Mutex;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Receives incremental byte counts. Must be callable from any thread.
pub trait ProgressSink: Send + Sync {
    fn advance(&self, n: u64);
}

/// Writer decorator: passes writes through to `inner` and reports the number
/// of bytes each write accepted.
pub struct ProgressWriter<W, S> {
    inner: W,
    sink: S,
    written: u64,
}

impl<W: Write, S: ProgressSink> ProgressWriter<W, S> {
    pub fn new(inner: W, sink: S) -> Self {
        Self {
            inner,
            sink,
            written: 0,
        }
    }

    /// Total bytes accepted by the inner writer so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_parts(self) -> (W, S) {
        (self.inner, self.sink)
    }
}

impl<W: Write, S: ProgressSink> Write for ProgressWriter<W, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        self.sink.advance(n as u64);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Shared progress surface for one batch.
pub struct ProgressBoard {
    multi: MultiProgress,
    width: u16,
    bars: Mutex<Vec<ProgressBar>>,
}

impl ProgressBoard {
    /// Bars drawn to stderr, `width` columns wide.
    pub fn stderr(width: u16) -> Self {
        Self::with_target(ProgressDrawTarget::stderr(), width)
    }

    /// Tracks progress without drawing anything.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden(), 80)
    }

    fn with_target(target: ProgressDrawTarget, width: u16) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            width: width.max(1),
            bars: Mutex::new(Vec::new()),
        }
    }

    /// Adds a bar labelled `label`. `total` is the announced content length;
    /// `None` renders an indeterminate spinner with a byte counter.
    pub fn add_entry(&self, label: &str, total: Option<u64>) -> ProgressEntry {
        let bar = match total {
            Some(len) => {
                let template = format!("{{prefix}} [{{bar:{}}}] {{percent:>3}}%", self.width);
                let style = ProgressStyle::with_template(&template)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-");
                ProgressBar::new(len).with_style(style)
            }
            None => {
                let style = ProgressStyle::with_template("{prefix} {spinner} {bytes}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner());
                ProgressBar::no_length().with_style(style)
            }
        };
        bar.set_prefix(label.to_string());
        let bar = self.multi.add(bar);
        if let Ok(mut bars) = self.bars.lock() {
            bars.push(bar.clone());
        }
        ProgressEntry { bar }
    }

    /// Number of entries added so far.
    pub fn entry_count(&self) -> usize {
        self.bars.lock().map(|b| b.len()).unwrap_or(0)
    }

    /// Settles the board once every worker is done: entries finish or abandon
    /// themselves when their worker drops them, and anything still open is
    /// abandoned here so the final frame is drawn. Returns the entry count.
    pub fn wait(&self) -> usize {
        let bars = match self.bars.lock() {
            Ok(bars) => bars,
            Err(poisoned) => poisoned.into_inner(),
        };
        for bar in bars.iter().filter(|b| !b.is_finished()) {
            bar.abandon();
        }
        bars.len()
    }
}

/// One download's bar. Abandoned (left as-is on screen) if dropped unfinished.
pub struct ProgressEntry {
    bar: ProgressBar,
}

impl ProgressEntry {
    /// Marks the download complete. For unknown totals the length is set to
    /// the final position so the bar renders full.
    pub fn finish(&self) {
        if self.bar.length().is_none() {
            self.bar.set_length(self.bar.position());
        }
        self.bar.finish();
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn total(&self) -> Option<u64> {
        self.bar.length()
    }

    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}

impl ProgressSink for ProgressEntry {
    fn advance(&self, n: u64) {
        self.bar.inc(n);
    }
}

impl Drop for ProgressEntry {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}
