use crate::domain::Progress;
use crate::ports::{ProgressPort, ScanProgressPort};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Counts files through a batch run.
pub struct ProgressBarAdapter {
    bar: Arc<ProgressBar>,
    quiet: bool,
}

impl ProgressBarAdapter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {percent:>3}% {msg} (ETA: {eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏ "),
        );
        Self {
            bar: Arc::new(bar),
            quiet: false,
        }
    }

    pub fn new_quiet() -> Self {
        Self {
            bar: Arc::new(ProgressBar::hidden()),
            quiet: true,
        }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        if quiet {
            self.bar = Arc::new(ProgressBar::hidden());
        }
        self
    }
}

impl Default for ProgressBarAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanProgressPort for ProgressBarAdapter {
    fn start(&self, total: u64) {
        if self.quiet {
            return;
        }

        self.bar.set_length(total);
        self.bar.set_message("Hashing files...");
        self.bar.enable_steady_tick(Duration::from_millis(100));
    }

    fn update(&self, processed: u64) {
        if self.quiet {
            return;
        }

        self.bar.set_position(processed);
    }

    fn finish(&self) {
        if self.quiet {
            return;
        }

        self.bar.disable_steady_tick();
        self.bar.finish_with_message("✓ Done");
    }
}

/// Percentage bar for a single source. Switches to a spinner while the size is unknown.
pub struct PercentBarAdapter {
    bar: ProgressBar,
}

impl PercentBarAdapter {
    pub fn new(label: impl Into<String>) -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg} {bar:40.cyan/blue} {percent:>3}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(label.into());
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl ProgressPort for PercentBarAdapter {
    fn report(&mut self, percent: f64) -> Result<()> {
        match Progress::from_percent(percent) {
            Progress::Indeterminate => {
                self.bar.set_style(ProgressStyle::default_spinner());
                self.bar.enable_steady_tick(Duration::from_millis(100));
            }
            Progress::Percent(p) => {
                self.bar.set_position(p.min(100.0) as u64);
                if p >= 100.0 {
                    self.bar.finish_and_clear();
                }
            }
        }
        Ok(())
    }
}

/// Emits progress as tracing events, for runs where many files hash at once.
pub struct LogProgressAdapter {
    label: String,
}

impl LogProgressAdapter {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl ProgressPort for LogProgressAdapter {
    fn report(&mut self, percent: f64) -> Result<()> {
        match Progress::from_percent(percent) {
            Progress::Indeterminate => {
                tracing::debug!(file = %self.label, "size unknown, hashing")
            }
            Progress::Percent(p) => tracing::trace!(file = %self.label, percent = p, "progress"),
        }
        Ok(())
    }
}
