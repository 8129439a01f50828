use std::f32::consts::TAU;

use glam::Vec3;

use crate::scene::{ObjectId, SceneGraph};
use crate::timeline::{Access, Listener};
use crate::{OrreryError, Result};

/// Adds a fixed Euler rotation to an object every tick.
///
/// Angles wrap at a full turn, keeping their sign, so precision does not
/// degrade on long runs.
#[derive(Debug, Clone)]
pub struct SpinUpdater {
    label: String,
    target: ObjectId,
    step: Vec3,
}

impl SpinUpdater {
    pub fn bind(scene: &SceneGraph, target: ObjectId, step: Vec3) -> Result<Self> {
        if !step.is_finite() {
            return Err(OrreryError::binding(format!(
                "spin step must be finite, got {step}"
            )));
        }
        let name = &scene.object(target)?.name;
        Ok(Self {
            label: format!("spin {name}"),
            target,
            step,
        })
    }

    /// Spin about the Y axis only.
    pub fn about_y(scene: &SceneGraph, target: ObjectId, radians_per_tick: f32) -> Result<Self> {
        Self::bind(scene, target, Vec3::new(0.0, radians_per_tick, 0.0))
    }

    pub fn advance(&self, scene: &mut SceneGraph) -> Result<()> {
        let transform = scene.transform_mut(self.target)?;
        transform.rotation = (transform.rotation + self.step) % TAU;
        Ok(())
    }
}

impl Listener for SpinUpdater {
    fn label(&self) -> &str {
        &self.label
    }

    fn writes(&self) -> Vec<Access> {
        vec![Access::rotation(self.target)]
    }

    fn on_tick(&mut self, scene: &mut SceneGraph) -> Result<()> {
        self.advance(scene)
    }
}
