use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Destination for progress glyphs.
pub trait ProgressSink: Send + Sync {
    fn tick(&self);

    /// Called once after the last tick.
    fn finish(&self) {}
}

/// Prints one `.` per tick on stdout and ends the line when finished.
pub struct DotSink;

impl ProgressSink for DotSink {
    fn tick(&self) {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(b".");
        let _ = stdout.flush();
    }

    fn finish(&self) {
        println!();
    }
}

/// Counts ticks instead of drawing them.
#[derive(Debug, Default)]
pub struct CountingSink {
    ticks: AtomicUsize,
    finished: AtomicUsize,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticks(&self) -> usize {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed) > 0
    }
}

impl ProgressSink for CountingSink {
    fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    fn finish(&self) {
        self.finished.fetch_add(1, Ordering::Relaxed);
    }
}

/// Emits a glyph every `interval` until the completion signal arrives.
pub struct ProgressReporter {
    sink: Arc<dyn ProgressSink>,
    interval: Duration,
}

impl ProgressReporter {
    pub fn new(sink: Arc<dyn ProgressSink>, interval: Duration) -> Self {
        Self { sink, interval }
    }

    /// Runs until `done` fires or its sender is dropped, returning the number
    /// of ticks emitted. The first tick comes one full interval after start.
    pub async fn watch(self, mut done: oneshot::Receiver<()>) -> usize {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = 0;

        loop {
            tokio::select! {
                biased;
                _ = &mut done => break,
                _ = ticker.tick() => {
                    self.sink.tick();
                    ticks += 1;
                }
            }
        }

        self.sink.finish();
        tracing::debug!("Progress reporter stopped after {} ticks", ticks);
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval_until_signaled() {
        let sink = Arc::new(CountingSink::new());
        let reporter = ProgressReporter::new(sink.clone(), DEFAULT_TICK_INTERVAL);
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(reporter.watch(rx));

        tokio::time::sleep(Duration::from_millis(1750)).await;
        tx.send(()).unwrap();
        let ticks = handle.await.unwrap();

        assert_eq!(ticks, 3);
        assert_eq!(sink.ticks(), 3);
        assert!(sink.finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_after_completion() {
        let sink = Arc::new(CountingSink::new());
        let reporter = ProgressReporter::new(sink.clone(), DEFAULT_TICK_INTERVAL);
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(reporter.watch(rx));

        tokio::time::sleep(Duration::from_millis(1200)).await;
        tx.send(()).unwrap();
        handle.await.unwrap();
        let after_stop = sink.ticks();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(sink.ticks(), after_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_sender_stops_reporter() {
        let sink = Arc::new(CountingSink::new());
        let reporter = ProgressReporter::new(sink.clone(), DEFAULT_TICK_INTERVAL);
        let (tx, rx) = oneshot::channel::<()>();
        drop(tx);
        assert_eq!(reporter.watch(rx).await, 0);
        assert!(sink.finished());
    }
}
