//! Timer-driven polling of the image directory
//!
//! Change detection is polling, not OS file-watch events. The timer is a
//! [`Ticker`] so tests drive ticks by hand instead of waiting on the clock.
//! All polls go through one mutex-guarded scanner: a directory listing is
//! never started while another is in flight.

use async_trait::async_trait;
use chrono::Utc;
use journeybook_common::events::{EventBus, GalleryEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::services::image_scanner::{ChangeResult, ImageScanner};

/// Default period between poll ticks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Scanner shared between the poll loop and forced polls
pub type SharedScanner = Arc<Mutex<ImageScanner>>;

/// Source of poll ticks
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick; `false` ends the loop
    async fn tick(&mut self) -> bool;
}

/// Wall-clock ticker; slow polls skip missed ticks instead of queueing them
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Ticker driven through a [`TickHandle`]; ends when every handle is dropped
pub struct ManualTicker {
    rx: mpsc::Receiver<()>,
}

#[derive(Clone)]
pub struct TickHandle {
    tx: mpsc::Sender<()>,
}

impl ManualTicker {
    pub fn new() -> (Self, TickHandle) {
        let (tx, rx) = mpsc::channel(16);
        (Self { rx }, TickHandle { tx })
    }
}

impl TickHandle {
    /// Queue one tick; `false` if the loop is gone
    pub async fn tick(&self) -> bool {
        self.tx.send(()).await.is_ok()
    }
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

/// Counters returned when the loop stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub ticks: u64,
    pub changes: u64,
}

/// Poll the shared scanner once
///
/// Holds the scanner lock for the whole listing, which runs on the blocking
/// pool.
pub async fn poll_once(scanner: &SharedScanner) -> ChangeResult {
    let mut guard = scanner.clone().lock_owned().await;
    match tokio::task::spawn_blocking(move || guard.poll()).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Poll task failed: {}", e);
            ChangeResult::Unchanged
        }
    }
}

/// Drives the scanner from a ticker and broadcasts changes
#[derive(Clone)]
pub struct PollLoop {
    scanner: SharedScanner,
    event_bus: EventBus,
}

impl PollLoop {
    pub fn new(scanner: SharedScanner, event_bus: EventBus) -> Self {
        Self { scanner, event_bus }
    }

    /// Run until the ticker ends or `cancel` fires
    pub async fn run<T: Ticker>(&self, mut ticker: T, cancel: CancellationToken) -> PollStats {
        let mut stats = PollStats::default();
        tracing::info!("Image poll loop started");

        loop {
            let keep_going = tokio::select! {
                _ = cancel.cancelled() => false,
                more = ticker.tick() => more,
            };
            if !keep_going {
                break;
            }

            stats.ticks += 1;
            if let ChangeResult::Updated(images) = poll_once(&self.scanner).await {
                stats.changes += 1;
                tracing::info!(count = images.len(), "Image set updated");
                self.event_bus.emit_lossy(GalleryEvent::ImageSetChanged {
                    images,
                    timestamp: Utc::now(),
                });
            }
        }

        tracing::info!(ticks = stats.ticks, changes = stats.changes, "Image poll loop stopped");
        stats
    }

    /// Spawn [`PollLoop::run`] with a wall-clock ticker
    pub fn spawn(
        &self,
        period: Duration,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<PollStats> {
        let this = self.clone();
        tokio::spawn(async move { this.run(IntervalTicker::new(period), cancel).await })
    }
}
