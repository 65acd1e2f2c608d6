use std::io::Write;

/// Completed vs. total item count for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
}

impl Progress {
    /// Percentage completed. An empty batch counts as complete.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.processed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Receives progress updates while a batch runs
pub trait ProgressObserver {
    fn on_progress(&mut self, progress: Progress, label: &str);

    /// Called once after the last update
    fn finish(&mut self) {}
}

/// Monotonic counter clamped to its total
#[derive(Debug, Clone)]
pub struct ProgressCounter {
    processed: usize,
    total: usize,
}

impl ProgressCounter {
    pub fn new(total: usize) -> Self {
        Self {
            processed: 0,
            total,
        }
    }

    /// Advance by `count` items, never past the total
    pub fn advance(&mut self, count: usize) -> Progress {
        self.processed = (self.processed + count).min(self.total);
        self.current()
    }

    pub fn current(&self) -> Progress {
        Progress {
            processed: self.processed,
            total: self.total,
        }
    }
}

/// Writes one line per update: `"{label} (42.00% completed)..."`
pub struct LineProgress<W: Write> {
    out: W,
}

impl<W: Write> LineProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ProgressObserver for LineProgress<W> {
    fn on_progress(&mut self, progress: Progress, label: &str) {
        // Progress output is best effort; a closed stdout must not abort a batch.
        let _ = writeln!(self.out, "{} ({:.2}% completed)...", label, progress.percent());
    }
}

/// Rewrites a single line in place: `"\rProgress: 42.00%..."`
pub struct InlineProgress<W: Write> {
    out: W,
}

impl<W: Write> InlineProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ProgressObserver for InlineProgress<W> {
    fn on_progress(&mut self, progress: Progress, _label: &str) {
        let _ = write!(self.out, "\rProgress: {:.2}%...", progress.percent());
        let _ = self.out.flush();
    }

    fn finish(&mut self) {
        let _ = writeln!(self.out);
    }
}

/// Keeps every update, for callers that only need the numbers
#[derive(Debug, Default)]
pub struct RecordedProgress {
    pub updates: Vec<Progress>,
}

impl ProgressObserver for RecordedProgress {
    fn on_progress(&mut self, progress: Progress, _label: &str) {
        self.updates.push(progress);
    }
}
