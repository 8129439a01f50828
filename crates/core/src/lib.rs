//! Core library for the Orrery demo.
//!
//! A retained scene graph is animated by a fixed-rate logic [`Clock`] whose
//! listeners mutate object transforms and shader parameters, while a separate
//! [`RenderLoop`] draws whatever the graph holds at display rate. The two are
//! interleaved on one thread by a [`Session`]. Geometry, materials and lights
//! come from the [`SceneFactory`]; actual drawing is delegated to a
//! [`Renderer`] implementation.

pub mod animation;
pub mod config;
pub mod error;
pub mod factory;
pub mod record;
pub mod render;
pub mod scene;
pub mod session;
pub mod system;
pub mod timeline;

pub use animation::{animate_material, OrbitUpdater, ShaderTimeUpdater, SpinUpdater};
pub use config::{AppConfig, Palette, RenderConfig, SceneConfig};
pub use error::{OrreryError, Result};
pub use factory::SceneFactory;
pub use record::{RecordedFrame, Recorder, RecordingSettings};
pub use render::{RenderContext, RenderLoop, Renderer, TraceRenderer};
pub use scene::{Camera, ObjectId, SceneGraph, SceneObject, Transform};
pub use session::{Session, SessionStats};
pub use system::{build_session, SolarSystem};
pub use timeline::{from_fn, Access, Clock, Listener, ListenerId, Property, TickReport};
