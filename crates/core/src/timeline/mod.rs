//! Fixed-rate logical clock and the listeners it drives.
//!
//! A [`Clock`] does not own a thread or timer. Whoever hosts it (see
//! [`crate::session::Session`]) calls [`Clock::tick`] once per elapsed
//! interval; the clock then runs every registered listener against the scene
//! graph in registration order.

mod interval;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::scene::{ObjectId, SceneGraph};
use crate::{OrreryError, Result};

pub use interval::Interval;

/// Tick interval used when none (or zero) is requested.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Part of an object's transform a listener touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    Position,
    Rotation,
}

/// One property of one object, as declared by a listener's reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Access {
    pub object: ObjectId,
    pub property: Property,
}

impl Access {
    pub fn position(object: ObjectId) -> Self {
        Self {
            object,
            property: Property::Position,
        }
    }

    pub fn rotation(object: ObjectId) -> Self {
        Self {
            object,
            property: Property::Rotation,
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let property = match self.property {
            Property::Position => "position",
            Property::Rotation => "rotation",
        };
        write!(f, "{property} of {}", self.object)
    }
}

/// Per-tick state mutation registered on a [`Clock`].
///
/// Listeners that move objects relative to other objects should report those
/// dependencies through [`reads`](Self::reads) and [`writes`](Self::writes) so
/// the clock can reject registrations that would see stale positions.
pub trait Listener {
    /// Name used in logs and failure reports.
    fn label(&self) -> &str {
        "listener"
    }

    /// Properties whose current-tick value this listener depends on.
    fn reads(&self) -> Vec<Access> {
        Vec::new()
    }

    /// Properties this listener mutates.
    fn writes(&self) -> Vec<Access> {
        Vec::new()
    }

    /// Tick interval the listener's per-tick step was derived from, if any.
    /// The clock refuses listeners built for a different interval.
    fn tick_interval(&self) -> Option<Duration> {
        None
    }

    fn on_tick(&mut self, scene: &mut SceneGraph) -> Result<()>;
}

/// Listener backed by a closure. Built with [`from_fn`].
pub struct FnListener<F> {
    label: String,
    f: F,
}

/// Wraps a closure as a labelled [`Listener`] with no declared dependencies.
pub fn from_fn<F>(label: impl Into<String>, f: F) -> FnListener<F>
where
    F: FnMut(&mut SceneGraph) -> Result<()>,
{
    FnListener {
        label: label.into(),
        f,
    }
}

impl<F> Listener for FnListener<F>
where
    F: FnMut(&mut SceneGraph) -> Result<()>,
{
    fn label(&self) -> &str {
        &self.label
    }

    fn on_tick(&mut self, scene: &mut SceneGraph) -> Result<()> {
        (self.f)(scene)
    }
}

/// Token returned by [`Clock::listen`], used to unregister a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(u64);

/// A listener error that was contained during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerFailure {
    pub listener: ListenerId,
    pub label: String,
    pub message: String,
}

/// Outcome of a single [`Clock::tick`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number, starting from 1. Zero when the clock was stopped.
    pub tick: u64,
    /// Listeners invoked, including ones that failed.
    pub delivered: usize,
    pub failures: Vec<ListenerFailure>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Registration {
    id: ListenerId,
    reads: Vec<Access>,
    listener: Box<dyn Listener>,
}

/// Broadcasts a uniform tick to every registered listener.
pub struct Clock {
    interval: Duration,
    listeners: Vec<Registration>,
    next_id: u64,
    ticks: u64,
    running: bool,
}

impl Clock {
    /// Creates a running clock at the default 10 ms interval.
    pub fn new() -> Self {
        Self {
            interval: DEFAULT_TICK_INTERVAL,
            listeners: Vec::new(),
            next_id: 0,
            ticks: 0,
            running: true,
        }
    }

    /// Creates a clock ticking every `millis` milliseconds. Zero selects the
    /// default interval.
    pub fn from_millis(millis: u64) -> Self {
        let mut clock = Self::new();
        if millis > 0 {
            clock.interval = Duration::from_millis(millis);
        }
        clock
    }

    pub fn with_interval(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(OrreryError::InvalidInterval);
        }
        let mut clock = Self::new();
        clock.interval = interval;
        Ok(clock)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Registers `listener` to run on every subsequent tick, after all
    /// listeners registered before it.
    ///
    /// Fails with [`OrreryError::OrderingViolation`] if the listener writes a
    /// property that an already registered listener reads, and with
    /// [`OrreryError::IntervalMismatch`] if it was built for another interval.
    pub fn listen<L>(&mut self, listener: L) -> Result<ListenerId>
    where
        L: Listener + 'static,
    {
        if let Some(expected) = listener.tick_interval() {
            if expected != self.interval {
                return Err(OrreryError::IntervalMismatch {
                    listener: listener.label().to_string(),
                    expected,
                    actual: self.interval,
                });
            }
        }

        let writes = listener.writes();
        for registered in &self.listeners {
            if let Some(access) = writes.iter().find(|w| registered.reads.contains(*w)) {
                return Err(OrreryError::OrderingViolation {
                    writer: listener.label().to_string(),
                    reader: registered.listener.label().to_string(),
                    access: *access,
                });
            }
        }

        let id = ListenerId(self.next_id);
        self.next_id += 1;
        debug!(listener = listener.label(), ?id, "registered clock listener");
        self.listeners.push(Registration {
            id,
            reads: listener.reads(),
            listener: Box::new(listener),
        });
        Ok(id)
    }

    /// Removes a listener. Returns `false` if the id was not registered.
    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|registration| registration.id != id);
        before != self.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Runs every listener once, in registration order.
    ///
    /// A listener that returns an error or panics is logged and recorded in
    /// the report; the remaining listeners still run and it stays registered.
    /// Stopped clocks deliver nothing.
    pub fn tick(&mut self, scene: &mut SceneGraph) -> TickReport {
        if !self.running {
            return TickReport::default();
        }

        self.ticks += 1;
        let mut report = TickReport {
            tick: self.ticks,
            ..Default::default()
        };

        for registration in &mut self.listeners {
            report.delivered += 1;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                registration.listener.on_tick(&mut *scene)
            }));
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(payload) => panic_message(&*payload),
            };

            let label = registration.listener.label().to_string();
            warn!(listener = %label, tick = self.ticks, error = %message, "clock listener failed");
            report.failures.push(ListenerFailure {
                listener: registration.id,
                label,
                message,
            });
        }

        report
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stops tick delivery. Listeners stay registered but are never invoked
    /// again.
    pub fn stop(&mut self) {
        if self.running {
            info!(ticks = self.ticks, "clock stopped");
        }
        self.running = false;
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("panicked: {detail}")
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("interval", &self.interval)
            .field("listeners", &self.listeners.len())
            .field("ticks", &self.ticks)
            .field("running", &self.running)
            .finish()
    }
}
