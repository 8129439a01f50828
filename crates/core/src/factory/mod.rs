//! Factory for the drawable pieces of a scene: spheres, materials, lights
//! and particle fields.
//!
//! The factory only produces values. Adding them to a [`SceneGraph`] and
//! wiring any animation onto a clock is up to the caller.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::scene::{
    AnimatedMaterial, Colour, Geometry, Material, MaterialId, ParticleMaterial, PointLight,
    SceneObject,
};
use crate::{OrreryError, Result};

/// Outer bound of the randomised particle shell.
pub const PARTICLE_MAX_RADIUS: f32 = 1000.0;
/// Minimum distance of any particle from the origin.
pub const PARTICLE_MIN_RADIUS: f32 = 100.0;

/// Deterministic builder for scene objects. Every random choice (particle
/// placement, lumpy displacement) is drawn from a seeded generator so the
/// same seed always yields the same scene.
#[derive(Debug, Clone)]
pub struct SceneFactory {
    rng: ChaCha8Rng,
}

impl SceneFactory {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn sphere(
        &self,
        name: impl Into<String>,
        radius: f32,
        segments: u32,
        material: MaterialId,
    ) -> Result<SceneObject> {
        if radius.is_nan() || radius <= 0.0 || segments < 3 {
            return Err(OrreryError::msg(format!(
                "sphere needs a positive radius and at least 3 segments, got {radius} / {segments}"
            )));
        }
        Ok(SceneObject::mesh(
            name,
            Geometry::sphere(radius, segments),
            material,
        ))
    }

    pub fn material(&self, colour: Colour, opacity: Option<f32>) -> Material {
        Material::phong(colour, opacity)
    }

    pub fn corona_material(&self, colour1: Colour, colour2: Colour, light: Vec3) -> Material {
        AnimatedMaterial::corona(colour1, colour2, light).into()
    }

    pub fn turbulent_material(
        &self,
        colour1: Colour,
        colour2: Colour,
        light: Option<Vec3>,
    ) -> Material {
        AnimatedMaterial::turbulent(colour1, colour2, light).into()
    }

    /// Displacement material for `geometry`: one random offset in
    /// `[-lumpiness / 2, lumpiness / 2)` per vertex.
    pub fn lumpy_material(
        &mut self,
        colour: Colour,
        light: Vec3,
        lumpiness: f32,
        geometry: &Geometry,
    ) -> Material {
        let displacement = (0..geometry.vertex_count())
            .map(|_| self.random(lumpiness))
            .collect();
        AnimatedMaterial::Lumpy {
            colour,
            light_position: light,
            displacement,
        }
        .into()
    }

    pub fn light(&self, colour: Colour, x: f32, y: f32, z: f32) -> PointLight {
        PointLight {
            colour,
            position: Vec3::new(x, y, z),
        }
    }

    pub fn particle_material(&self) -> Material {
        Material::Particle(ParticleMaterial::default())
    }

    pub fn particle_system(
        &mut self,
        name: impl Into<String>,
        count: usize,
        material: MaterialId,
    ) -> SceneObject {
        let positions = (0..count)
            .map(|_| self.random_vector(PARTICLE_MAX_RADIUS, PARTICLE_MIN_RADIUS))
            .collect();
        SceneObject::particles(name, positions, material)
    }

    /// Uniform sample centred on zero with total width `scale`.
    fn random(&mut self, scale: f32) -> f32 {
        self.rng.random::<f32>() * scale - scale / 2.0
    }

    /// Random point pushed out so that it lies at least `minimum` from the
    /// origin.
    fn random_vector(&mut self, maximum: f32, minimum: f32) -> Vec3 {
        let spread = maximum - minimum;
        let raw = Vec3::new(
            self.random(spread),
            self.random(spread),
            self.random(spread),
        );
        raw.normalize_or_zero() * (raw.length() + minimum)
    }
}
