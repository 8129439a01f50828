//! Per-tick updaters that animate the scene graph.
//!
//! Each updater is plain state plus an `advance` method and implements
//! [`Listener`](crate::timeline::Listener) so it can be registered on a
//! [`Clock`](crate::timeline::Clock). Bindings validate their parameters when
//! they are built, never on the first tick.

mod orbit;
mod shader_time;
mod spin;

pub use orbit::OrbitUpdater;
pub use shader_time::{animate_material, ShaderTimeUpdater, DEFAULT_TIME_STEP};
pub use spin::SpinUpdater;
