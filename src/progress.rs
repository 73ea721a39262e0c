//! Transfer progress: samples, status formatting and the emission gate.
//!
//! Sinks report raw byte counts through a [`TransferObserver`]. The upload
//! stage turns those into [`ProgressSample`]s, renders them with
//! [`format_status`] and lets a [`ProgressGate`] decide which renders are worth
//! sending to the operator.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

const MIB: f64 = 1024.0 * 1024.0;
const BAR_SLOTS: u64 = 20;

/// Default minimum spacing between two emissions of the same transfer.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(2);

/// One observation of a running transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    pub current: u64,
    pub total: u64,
    pub started: Instant,
    pub now: Instant,
}

impl ProgressSample {
    pub fn new(current: u64, total: u64, started: Instant, now: Instant) -> Self {
        Self {
            current,
            total,
            started,
            now,
        }
    }

    /// Seconds since the transfer started.
    pub fn elapsed(&self) -> f64 {
        self.now.saturating_duration_since(self.started).as_secs_f64()
    }

    /// Bytes per second, 0 before any time has passed.
    pub fn speed(&self) -> f64 {
        let elapsed = self.elapsed();
        if elapsed > 0.0 {
            self.current as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Seconds remaining at the current speed, 0 while the speed is unknown.
    pub fn eta(&self) -> f64 {
        let speed = self.speed();
        if speed > 0.0 {
            self.total.saturating_sub(self.current) as f64 / speed
        } else {
            0.0
        }
    }

    /// Completion in percent, 0 for an empty transfer.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 * 100.0 / self.total as f64
        }
    }
}

/// Render a 20 slot bar of `█` (done) and `░` (remaining).
pub fn progress_bar(current: u64, total: u64) -> String {
    let filled = if total == 0 {
        0
    } else {
        ((BAR_SLOTS as u128 * current as u128) / total as u128).min(BAR_SLOTS as u128) as usize
    };

    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(BAR_SLOTS as usize - filled));
    bar
}

/// Render the operator-facing status text for a sample.
pub fn format_status(label: &str, sample: &ProgressSample) -> String {
    let pct = sample.percentage();
    format!(
        "File: `{}`\nProgress: {:.2}%\n{:.2} MB of {:.2} MB\nSpeed: {:.2} MB/s\nETA: {}s\nElapsed: {}s\n[{}] {:.2}%",
        label,
        pct,
        sample.current as f64 / MIB,
        sample.total as f64 / MIB,
        sample.speed() / MIB,
        sample.eta() as u64,
        sample.elapsed() as u64,
        progress_bar(sample.current, sample.total),
        pct,
    )
}

/// Rate limit and dedupe for status emissions of one transfer.
#[derive(Debug, Clone)]
pub struct ProgressGate {
    min_interval: Duration,
    last_emit: Option<Instant>,
    last_text: Option<String>,
}

impl Default for ProgressGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

impl ProgressGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_emit: None,
            last_text: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Forget the previous transfer; the next sample is always eligible.
    pub fn reset(&mut self) {
        self.last_emit = None;
        self.last_text = None;
    }

    fn due(&self, now: Instant) -> bool {
        match self.last_emit {
            Some(last) => now.saturating_duration_since(last) >= self.min_interval,
            None => true,
        }
    }

    /// Decide whether `text` should be emitted at `now`, recording it if so.
    pub fn admit(&mut self, now: Instant, text: &str) -> bool {
        if !self.due(now) || self.last_text.as_deref() == Some(text) {
            return false;
        }

        self.last_emit = Some(now);
        self.last_text = Some(text.to_string());
        true
    }

    /// Render and gate a transfer sample.
    pub fn observe(&mut self, label: &str, sample: &ProgressSample) -> Option<String> {
        if !self.due(sample.now) {
            return None;
        }

        let text = format_status(label, sample);
        self.admit(sample.now, &text).then_some(text)
    }
}

/// Per-chunk progress callback invoked by delivery sinks.
pub trait TransferObserver: Send + Sync {
    fn on_progress(&self, sent: u64, total: u64);
}

/// No-op observer.
impl TransferObserver for () {
    fn on_progress(&self, _sent: u64, _total: u64) {}
}

/// [`TransferObserver`] publishing the latest `(sent, total)` on a watch
/// channel. Publishing never waits for the reader.
#[derive(Debug)]
pub struct ProgressFeed {
    tx: watch::Sender<(u64, u64)>,
}

impl ProgressFeed {
    pub fn channel() -> (Self, watch::Receiver<(u64, u64)>) {
        let (tx, rx) = watch::channel((0, 0));
        (Self { tx }, rx)
    }
}

impl TransferObserver for ProgressFeed {
    fn on_progress(&self, sent: u64, total: u64) {
        self.tx.send_replace((sent, total));
    }
}
