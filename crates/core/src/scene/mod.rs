//! Retained scene graph: drawable objects, their materials, lights and the
//! camera the renderer looks through.
//!
//! The graph is append-only. Objects, materials and lights are addressed by
//! the ids handed out when they were added, which stay valid for the lifetime
//! of the graph. Updaters hold these ids rather than references so the clock
//! can own them without borrowing the graph.

mod material;

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{OrreryError, Result};

pub use material::{
    AnimatedMaterial, Colour, Material, ParticleMaterial, PhongMaterial, INITIAL_SHADER_TIME,
};

/// Handle to an object stored in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(usize);

/// Handle to a material stored in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(usize);

/// Handle to a light stored in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LightId(usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object #{}", self.0)
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "material #{}", self.0)
    }
}

/// Position and Euler rotation (radians, XYZ order) of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// UV sphere with `segments` slices around the Y axis and `rings` stacks.
    Sphere { radius: f32, segments: u32, rings: u32 },
    /// Free-standing points, as used by particle systems.
    Points { positions: Vec<Vec3> },
}

impl Geometry {
    pub fn sphere(radius: f32, segments: u32) -> Self {
        Self::Sphere {
            radius,
            segments,
            rings: segments,
        }
    }

    /// Number of vertices the geometry produces once tessellated.
    pub fn vertex_count(&self) -> usize {
        match self {
            Self::Sphere { segments, rings, .. } => {
                (*segments as usize + 1) * (*rings as usize + 1)
            }
            Self::Points { positions } => positions.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Mesh {
        geometry: Geometry,
        material: MaterialId,
    },
    Particles {
        geometry: Geometry,
        material: MaterialId,
        /// Draw back-to-front relative to the camera.
        sort: bool,
    },
}

/// A drawable entry of the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub transform: Transform,
}

impl SceneObject {
    pub fn mesh(name: impl Into<String>, geometry: Geometry, material: MaterialId) -> Self {
        Self {
            name: name.into(),
            kind: ObjectKind::Mesh { geometry, material },
            transform: Transform::default(),
        }
    }

    pub fn particles(name: impl Into<String>, positions: Vec<Vec3>, material: MaterialId) -> Self {
        Self {
            name: name.into(),
            kind: ObjectKind::Particles {
                geometry: Geometry::Points { positions },
                material,
                sort: true,
            },
            transform: Transform::default(),
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn material(&self) -> MaterialId {
        match &self.kind {
            ObjectKind::Mesh { material, .. } | ObjectKind::Particles { material, .. } => *material,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        match &self.kind {
            ObjectKind::Mesh { geometry, .. } | ObjectKind::Particles { geometry, .. } => geometry,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub colour: Colour,
    pub position: Vec3,
}

/// Perspective camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(-100.0, 50.0, 300.0),
            fov_degrees: 45.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 10_000.0,
        }
    }
}

/// Append-only collection of drawable objects, materials and lights.
///
/// Iteration yields entries in insertion order, which is also the draw order.
#[derive(Debug, Default, Clone)]
pub struct SceneGraph {
    objects: Vec<SceneObject>,
    materials: Vec<Material>,
    lights: Vec<PointLight>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn add_light(&mut self, light: PointLight) -> LightId {
        self.lights.push(light);
        LightId(self.lights.len() - 1)
    }

    pub fn object(&self, id: ObjectId) -> Result<&SceneObject> {
        self.objects.get(id.0).ok_or(OrreryError::UnknownObject(id))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Result<&mut SceneObject> {
        self.objects
            .get_mut(id.0)
            .ok_or(OrreryError::UnknownObject(id))
    }

    /// Shorthand for the current position of `id`.
    pub fn position(&self, id: ObjectId) -> Result<Vec3> {
        Ok(self.object(id)?.transform.position)
    }

    pub fn transform_mut(&mut self, id: ObjectId) -> Result<&mut Transform> {
        Ok(&mut self.object_mut(id)?.transform)
    }

    pub fn material(&self, id: MaterialId) -> Result<&Material> {
        self.materials
            .get(id.0)
            .ok_or(OrreryError::UnknownMaterial(id))
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Result<&mut Material> {
        self.materials
            .get_mut(id.0)
            .ok_or(OrreryError::UnknownMaterial(id))
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(index, object)| (ObjectId(index), object))
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|object| object.name == name)
            .map(ObjectId)
    }
}
