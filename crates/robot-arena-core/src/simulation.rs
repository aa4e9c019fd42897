//! Simulation driver.
//!
//! [`Simulation`] wraps an [`Arena`] and runs the fixed tick sequence:
//!
//! 1. **CLOCK**: drain hour ticks from the clock channel into the arena
//! 2. **UPDATE**: [`Arena::update_all`]
//! 3. **APPLY**: [`Arena::process_deferred`]
//! 4. **DRAW**: [`Arena::draw_all`]
//!
//! The driver also owns pause/resume and the speed multiplier. Neither touches
//! the arena; a shell reads [`Simulation::tick_interval`] to pace its loop.
//!
//! # Example
//!
//! ```
//! use robot_arena_core::canvas::RecordingCanvas;
//! use robot_arena_core::config::ArenaConfig;
//! use robot_arena_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(ArenaConfig::default());
//! sim.arena_mut().seed_default_scenario();
//!
//! let mut canvas = RecordingCanvas::new();
//! for _ in 0..10 {
//!     sim.step(&mut canvas);
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! ```

use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use crate::arena::{Arena, DeferredSummary};
use crate::canvas::Canvas;
use crate::clock::{ClockThread, ClockTick};
use crate::config::{ArenaConfig, TimingConfig};

/// Lowest accepted speed multiplier.
pub const MIN_SPEED: f32 = 0.1;

// =============================================================================
// Simulation
// =============================================================================

/// Fixed-tick driver around an [`Arena`].
#[derive(Debug)]
pub struct Simulation {
    arena: Arena,
    clock_rx: Option<Receiver<ClockTick>>,
    clock_thread: Option<ClockThread>,
    paused: bool,
    speed: f32,
}

/// What one [`Simulation::step`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Tick after the step.
    pub tick: u64,
    /// Clock ticks applied before the update.
    pub clock_ticks: usize,
    /// Changes applied by the deferred queue.
    pub deferred: DeferredSummary,
    /// True if the step only redrew because the driver is paused.
    pub paused: bool,
}

impl Simulation {
    /// Creates a driver around an empty arena.
    #[must_use]
    pub fn new(config: ArenaConfig) -> Self {
        Self::from_arena(Arena::new(config))
    }

    /// Creates a driver around an existing arena, for example a restored snapshot.
    #[must_use]
    pub const fn from_arena(arena: Arena) -> Self {
        Self {
            arena,
            clock_rx: None,
            clock_thread: None,
            paused: false,
            speed: 1.0,
        }
    }

    /// The driven arena.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable access to the arena, for setup and input.
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Consumes the driver, stopping any clock thread, and returns the arena.
    #[must_use]
    pub fn into_arena(mut self) -> Arena {
        self.stop_clock();
        let Self { arena, .. } = self;
        arena
    }

    /// Current logical tick.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.arena.current_tick()
    }

    // -------------------------------------------------------------------------
    // Stepping
    // -------------------------------------------------------------------------

    /// Runs one tick and draws it.
    ///
    /// While paused the arena is only redrawn; clock ticks that arrive in the
    /// meantime are dropped so the in-game hour stays frozen.
    pub fn step(&mut self, canvas: &mut dyn Canvas) -> StepReport {
        if self.paused {
            self.discard_clock_ticks();
            self.arena.draw_all(canvas);
            return StepReport {
                tick: self.tick(),
                paused: true,
                ..StepReport::default()
            };
        }

        let clock_ticks = self.drain_clock();
        self.arena.update_all();
        let deferred = self.arena.process_deferred();
        self.arena.draw_all(canvas);

        StepReport {
            tick: self.tick(),
            clock_ticks,
            deferred,
            paused: false,
        }
    }

    /// Runs `ticks` steps.
    pub fn run(&mut self, ticks: u64, canvas: &mut dyn Canvas) {
        for _ in 0..ticks {
            self.step(canvas);
        }
    }

    fn drain_clock(&mut self) -> usize {
        let mut ticks = Vec::new();
        if let Some(rx) = &self.clock_rx {
            loop {
                match rx.try_recv() {
                    Ok(tick) => ticks.push(tick),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        tracing::warn!("clock channel disconnected, detaching");
                        self.clock_rx = None;
                        break;
                    }
                }
            }
        }
        for &tick in &ticks {
            self.arena.on_clock_tick(tick);
        }
        ticks.len()
    }

    fn discard_clock_ticks(&mut self) {
        if let Some(rx) = &self.clock_rx {
            let dropped = rx.try_iter().count();
            if dropped > 0 {
                tracing::debug!(dropped, "clock ticks dropped while paused");
            }
        }
    }

    // -------------------------------------------------------------------------
    // Pause and speed
    // -------------------------------------------------------------------------

    /// Stops advancing the arena.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            tracing::info!(tick = self.tick(), "simulation paused");
        }
    }

    /// Resumes advancing the arena.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            tracing::info!(tick = self.tick(), "simulation resumed");
        }
    }

    /// Returns true while paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Sets the speed multiplier. Values below [`MIN_SPEED`] and non-finite
    /// values are raised to [`MIN_SPEED`].
    pub fn set_speed(&mut self, multiplier: f32) {
        self.speed = if multiplier.is_finite() {
            multiplier.max(MIN_SPEED)
        } else {
            MIN_SPEED
        };
        tracing::debug!(speed = self.speed, "speed changed");
    }

    /// Current speed multiplier.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Wall-clock time between ticks at the current speed.
    ///
    /// A tick rate that does not give a finite positive interval falls back to
    /// the default rate.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        let speed = self.speed.max(MIN_SPEED);
        let rate = self.arena.config().timing.tick_rate_hz;
        Duration::try_from_secs_f32(1.0 / rate / speed).unwrap_or_else(|_| {
            tracing::warn!(tick_rate_hz = rate, "unusable tick rate, pacing at the default");
            Duration::from_secs_f32(1.0 / TimingConfig::default().tick_rate_hz / speed)
        })
    }

    // -------------------------------------------------------------------------
    // Clock
    // -------------------------------------------------------------------------

    /// Feeds hour ticks from `rx` into the arena on every step.
    pub fn attach_clock(&mut self, rx: Receiver<ClockTick>) {
        self.clock_rx = Some(rx);
    }

    /// Spawns a [`ClockThread`] firing once per in-game hour and attaches it.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn start_clock(&mut self) -> std::io::Result<()> {
        self.stop_clock();
        let interval = self.arena.clock().hour_interval();
        let (thread, rx) = ClockThread::spawn(interval)?;
        tracing::info!(interval_ms = interval.as_millis(), "clock thread started");
        self.clock_thread = Some(thread);
        self.clock_rx = Some(rx);
        Ok(())
    }

    /// Stops and detaches the clock thread, if any.
    pub fn stop_clock(&mut self) {
        if let Some(mut thread) = self.clock_thread.take() {
            thread.stop();
        }
        self.clock_rx = None;
    }

    /// Advances the clock by one hour immediately, without a thread.
    ///
    /// Used by headless runs that pace the clock by ticks instead of wall time.
    pub fn advance_clock_hour(&mut self) {
        let sequence = self.arena.current_tick();
        self.arena.on_clock_tick(ClockTick { sequence });
    }
}
