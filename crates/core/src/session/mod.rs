//! Single-threaded host loop that interleaves the logic clock with the
//! display-rate render loop.
//!
//! Both loops are driven by their own [`Interval`]. Due events are serviced in
//! time order and each callback runs to completion before the next one
//! starts, so a render always sees whole-object updates but may land between
//! two ticks' worth of listeners. On a tie the clock tick goes first.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::render::{RenderContext, RenderLoop, Renderer};
use crate::scene::SceneGraph;
use crate::timeline::{Clock, Interval};
use crate::Result;

/// Counters accumulated over the life of a [`Session`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub ticks: u64,
    pub frames: u64,
    pub listener_failures: u64,
    /// Overdue ticks discarded by the catch-up limit.
    pub dropped_ticks: u64,
}

enum Due {
    Tick,
    Frame(Duration),
}

/// Owns the clock, the render loop and the render context for one animation
/// session.
pub struct Session<R> {
    clock: Clock,
    clock_timer: Interval,
    render_loop: RenderLoop,
    context: RenderContext<R>,
    max_catch_up_ticks: u32,
    elapsed: Duration,
    stats: SessionStats,
}

impl<R: Renderer> Session<R> {
    pub fn new(clock: Clock, render_loop: RenderLoop, context: RenderContext<R>) -> Result<Self> {
        let clock_timer = Interval::new(clock.interval())?;
        Ok(Self {
            clock,
            clock_timer,
            render_loop,
            context,
            max_catch_up_ticks: u32::MAX,
            elapsed: Duration::ZERO,
            stats: SessionStats::default(),
        })
    }

    /// Caps how many overdue ticks a single [`advance_to`](Self::advance_to)
    /// delivers. The oldest surplus ticks are dropped.
    pub fn with_max_catch_up(mut self, ticks: u32) -> Self {
        self.max_catch_up_ticks = ticks.max(1);
        self
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn context(&self) -> &RenderContext<R> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut RenderContext<R> {
        &mut self.context
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.context.scene
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// True while either loop still has work to do.
    pub fn is_active(&self) -> bool {
        self.clock.is_running() || self.render_loop.is_running()
    }

    /// Stops both loops. Later advances are no-ops.
    pub fn stop(&mut self) {
        self.clock.stop();
        self.render_loop.stop();
        info!(
            ticks = self.stats.ticks,
            frames = self.stats.frames,
            "session stopped"
        );
    }

    /// Services every tick and frame that falls due up to `now`, measured
    /// from the start of the session. Times earlier than the current position
    /// are ignored.
    ///
    /// Every overdue tick is delivered (subject to the catch-up cap), but
    /// refresh deadlines missed since the previous call collapse into a single
    /// frame at the latest of them.
    pub fn advance_to(&mut self, now: Duration) -> Result<()> {
        if now <= self.elapsed {
            return Ok(());
        }

        let pending = self.clock_timer.pending(now);
        let limit = u64::from(self.max_catch_up_ticks);
        if self.clock.is_running() && pending > limit {
            let dropped = pending - limit;
            warn!(pending, dropped, "clock fell behind, dropping overdue ticks");
            self.clock_timer.skip(dropped);
            self.stats.dropped_ticks += dropped;
        }

        while let Some(due) = self.next_due(now) {
            match due {
                Due::Tick => {
                    self.clock_timer.fire();
                    let report = self.clock.tick(&mut self.context.scene);
                    self.stats.ticks += 1;
                    self.stats.listener_failures += report.failures.len() as u64;
                }
                Due::Frame(at) => {
                    self.render_loop.refresh_mut().fire_through(at);
                    self.render_loop.animate(&mut self.context)?;
                    self.stats.frames += 1;
                }
            }
        }

        self.elapsed = now;
        Ok(())
    }

    pub fn advance_by(&mut self, delta: Duration) -> Result<()> {
        self.advance_to(self.elapsed + delta)
    }

    /// Runs the session against the wall clock for `duration`, sleeping
    /// between due events.
    pub fn run_for(&mut self, duration: Duration) -> Result<SessionStats> {
        let origin = self.elapsed;
        let end = origin + duration;
        let started = Instant::now();
        info!(?duration, "session running");

        loop {
            let now = (origin + started.elapsed()).min(end);
            self.advance_to(now)?;
            if now >= end || !self.is_active() {
                break;
            }

            let wake = self.next_wake().unwrap_or(end).min(end);
            std::thread::sleep(wake.saturating_sub(origin + started.elapsed()));
        }

        Ok(self.stats)
    }

    fn next_due(&self, now: Duration) -> Option<Due> {
        let tick = (self.clock.is_running() && self.clock_timer.next_due() <= now)
            .then(|| self.clock_timer.next_due());
        // Missed refreshes collapse into a single frame at the latest one.
        let frame = if self.render_loop.is_running() {
            self.render_loop.refresh().latest_due(now)
        } else {
            None
        };

        match (tick, frame) {
            (Some(tick), Some(frame)) if tick <= frame => Some(Due::Tick),
            (Some(_), None) => Some(Due::Tick),
            (_, Some(frame)) => Some(Due::Frame(frame)),
            (None, None) => None,
        }
    }

    fn next_wake(&self) -> Option<Duration> {
        let tick = self
            .clock
            .is_running()
            .then(|| self.clock_timer.next_due());
        let frame = self
            .render_loop
            .is_running()
            .then(|| self.render_loop.refresh().next_due());
        tick.into_iter().chain(frame).min()
    }
}
