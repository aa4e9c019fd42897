//! Day/night cycle.
//!
//! [`DayNightClock`] is plain state: an hour counter and a night flag. Each
//! call to [`DayNightClock::advance`] moves one hour forward and reports a
//! [`DayNightTransition`] when the night flag flips.
//!
//! Wall-clock pacing lives in [`ClockThread`], which fires a [`ClockTick`]
//! over a channel once per in-game hour. The thread never touches the arena;
//! the driver drains the channel between ticks and hands each tick to
//! [`Arena::on_clock_tick`](crate::arena::Arena::on_clock_tick).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::ClockConfig;

/// Longest the clock thread sleeps before re-checking its stop flag.
const STOP_POLL: Duration = Duration::from_millis(20);

/// Edge of the night flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayNightTransition {
    /// Day turned into night.
    NightStarted,
    /// Night turned into day.
    DayStarted,
}

/// One in-game hour elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    /// Count of ticks sent by this thread, starting at 1.
    pub sequence: u64,
}

/// Hour counter with edge-detected night flag.
#[derive(Debug, Clone, PartialEq)]
pub struct DayNightClock {
    hour: u32,
    is_night: bool,
    config: ClockConfig,
}

impl DayNightClock {
    /// Creates a clock at the configured start hour.
    #[must_use]
    pub fn new(config: &ClockConfig) -> Self {
        let hours = config.hours_per_day.max(1);
        let hour = config.start_hour % hours;
        Self {
            hour,
            is_night: night_at(config, hour),
            config: config.clone(),
        }
    }

    /// Current hour, `0..hours_per_day`.
    #[must_use]
    pub const fn hour(&self) -> u32 {
        self.hour
    }

    /// True between the night start and day start hours.
    #[must_use]
    pub const fn is_night(&self) -> bool {
        self.is_night
    }

    /// Overlay darkness for the current hour.
    #[must_use]
    pub fn darkness(&self) -> f32 {
        if self.is_night {
            self.config.night_darkness
        } else {
            0.0
        }
    }

    /// Wall-clock duration of one in-game hour.
    ///
    /// A cycle length that does not give a finite interval falls back to the
    /// default cycle.
    #[must_use]
    pub fn hour_interval(&self) -> Duration {
        Duration::try_from_secs_f32(hour_secs(&self.config).max(0.0)).unwrap_or_else(|_| {
            tracing::warn!(
                cycle_secs = self.config.cycle_secs,
                "unusable cycle length, using the default"
            );
            Duration::from_secs_f32(hour_secs(&ClockConfig::default()))
        })
    }

    /// Moves one hour forward.
    pub fn advance(&mut self) -> Option<DayNightTransition> {
        let next = (self.hour + 1) % self.config.hours_per_day.max(1);
        self.set_hour(next)
    }

    /// Jumps to `hour` (wrapped into the day), reporting an edge if the night flag flips.
    pub fn set_hour(&mut self, hour: u32) -> Option<DayNightTransition> {
        self.hour = hour % self.config.hours_per_day.max(1);
        let was_night = self.is_night;
        self.is_night = night_at(&self.config, self.hour);
        match (was_night, self.is_night) {
            (false, true) => Some(DayNightTransition::NightStarted),
            (true, false) => Some(DayNightTransition::DayStarted),
            _ => None,
        }
    }
}

impl Default for DayNightClock {
    fn default() -> Self {
        Self::new(&ClockConfig::default())
    }
}

#[allow(clippy::cast_precision_loss)]
fn hour_secs(config: &ClockConfig) -> f32 {
    config.cycle_secs / config.hours_per_day.max(1) as f32
}

fn night_at(config: &ClockConfig, hour: u32) -> bool {
    hour >= config.night_start || hour < config.day_start
}

/// Background thread sending a [`ClockTick`] every interval.
///
/// Stops when dropped, when [`ClockThread::stop`] is called, or when the
/// receiving end is gone.
#[derive(Debug)]
pub struct ClockThread {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ClockThread {
    /// Starts the thread. Returns it with the receiving end of its channel.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn(interval: Duration) -> std::io::Result<(Self, Receiver<ClockTick>)> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("day-night-clock".into())
            .spawn(move || {
                let mut sequence = 0;
                let mut next_fire = Instant::now() + interval;
                while !flag.load(Ordering::Relaxed) {
                    let now = Instant::now();
                    if now < next_fire {
                        thread::sleep((next_fire - now).min(STOP_POLL));
                        continue;
                    }
                    sequence += 1;
                    if tx.send(ClockTick { sequence }).is_err() {
                        break;
                    }
                    next_fire += interval;
                }
                tracing::debug!(sent = sequence, "clock thread stopped");
            })?;

        Ok((
            Self {
                stop,
                handle: Some(handle),
            },
            rx,
        ))
    }

    /// Signals the thread to stop and waits for it.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("clock thread panicked");
            }
        }
    }
}

impl Drop for ClockThread {
    fn drop(&mut self) {
        self.stop();
    }
}
