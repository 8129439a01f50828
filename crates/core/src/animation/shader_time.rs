use crate::scene::{MaterialId, SceneGraph};
use crate::timeline::{Clock, Listener, ListenerId};
use crate::{OrreryError, Result};

/// Increment applied to a shader's time uniform on every tick.
pub const DEFAULT_TIME_STEP: f64 = 0.0025;

/// Advances the time uniform of an animated material by a fixed step per tick.
#[derive(Debug, Clone)]
pub struct ShaderTimeUpdater {
    label: String,
    material: MaterialId,
    step: f64,
}

impl ShaderTimeUpdater {
    /// Fails if `material` is missing or has no time uniform.
    pub fn bind(scene: &SceneGraph, material: MaterialId, step: f64) -> Result<Self> {
        if !step.is_finite() {
            return Err(OrreryError::binding(format!(
                "time step must be finite, got {step}"
            )));
        }
        if scene.material(material)?.time().is_none() {
            return Err(OrreryError::MissingTimeParameter(material));
        }
        Ok(Self {
            label: format!("shader time of {material}"),
            material,
            step,
        })
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn advance(&self, scene: &mut SceneGraph) -> Result<()> {
        let time = scene
            .material_mut(self.material)?
            .time_mut()
            .ok_or(OrreryError::MissingTimeParameter(self.material))?;
        *time += self.step;
        Ok(())
    }
}

impl Listener for ShaderTimeUpdater {
    fn label(&self) -> &str {
        &self.label
    }

    fn on_tick(&mut self, scene: &mut SceneGraph) -> Result<()> {
        self.advance(scene)
    }
}

/// Attaches a default-step time updater for `material` to `clock`.
pub fn animate_material(
    clock: &mut Clock,
    scene: &SceneGraph,
    material: MaterialId,
) -> Result<ListenerId> {
    clock.listen(ShaderTimeUpdater::bind(scene, material, DEFAULT_TIME_STEP)?)
}
