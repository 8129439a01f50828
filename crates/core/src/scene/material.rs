use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Packed `0xRRGGBB` colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colour(pub u32);

impl Colour {
    pub const WHITE: Colour = Colour(0xffffff);
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhongMaterial {
    pub colour: Colour,
    pub opacity: f32,
    pub transparent: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleMaterial {
    pub colour: Colour,
    pub size: f32,
    pub texture: Option<String>,
    pub additive: bool,
    pub transparent: bool,
}

impl Default for ParticleMaterial {
    fn default() -> Self {
        Self {
            colour: Colour::WHITE,
            size: 20.0,
            texture: Some("particle.png".to_string()),
            additive: true,
            transparent: true,
        }
    }
}

/// Shader-driven materials, one variant per shader program.
///
/// Time uniforms accumulate in `f64` so they keep advancing for the life of
/// the process; a GPU backend narrows them only when uploading.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimatedMaterial {
    /// Translucent halo around the star.
    Corona {
        time: f64,
        colour1: Colour,
        colour2: Colour,
        light_position: Vec3,
    },
    /// Procedural turbulence used for the star and planet surfaces.
    Turbulent {
        time: f64,
        colour1: Colour,
        colour2: Colour,
        light_position: Option<Vec3>,
    },
    /// Vertex-displaced sphere; static, so it has no time uniform.
    Lumpy {
        colour: Colour,
        light_position: Vec3,
        displacement: Vec<f32>,
    },
}

/// Initial value of the time uniform of freshly built animated materials.
pub const INITIAL_SHADER_TIME: f64 = 0.0025;

impl AnimatedMaterial {
    pub fn corona(colour1: Colour, colour2: Colour, light_position: Vec3) -> Self {
        Self::Corona {
            time: INITIAL_SHADER_TIME,
            colour1,
            colour2,
            light_position,
        }
    }

    pub fn turbulent(colour1: Colour, colour2: Colour, light_position: Option<Vec3>) -> Self {
        Self::Turbulent {
            time: INITIAL_SHADER_TIME,
            colour1,
            colour2,
            light_position,
        }
    }

    pub fn time(&self) -> Option<f64> {
        match self {
            Self::Corona { time, .. } | Self::Turbulent { time, .. } => Some(*time),
            Self::Lumpy { .. } => None,
        }
    }

    pub fn time_mut(&mut self) -> Option<&mut f64> {
        match self {
            Self::Corona { time, .. } | Self::Turbulent { time, .. } => Some(time),
            Self::Lumpy { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Phong(PhongMaterial),
    Particle(ParticleMaterial),
    Animated(AnimatedMaterial),
}

impl Material {
    /// Plain lit material. `opacity` defaults to fully opaque; anything below
    /// 1.0 turns on blending.
    pub fn phong(colour: Colour, opacity: Option<f32>) -> Self {
        let opacity = opacity.unwrap_or(1.0);
        Self::Phong(PhongMaterial {
            colour,
            opacity,
            transparent: opacity < 1.0,
        })
    }

    pub fn time(&self) -> Option<f64> {
        match self {
            Self::Animated(animated) => animated.time(),
            _ => None,
        }
    }

    pub fn time_mut(&mut self) -> Option<&mut f64> {
        match self {
            Self::Animated(animated) => animated.time_mut(),
            _ => None,
        }
    }
}

impl From<AnimatedMaterial> for Material {
    fn from(value: AnimatedMaterial) -> Self {
        Self::Animated(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_controls_transparency() {
        let Material::Phong(opaque) = Material::phong(Colour(0x123456), None) else {
            panic!("expected phong material");
        };
        assert_eq!(opaque.opacity, 1.0);
        assert!(!opaque.transparent);

        let Material::Phong(glass) = Material::phong(Colour(0x123456), Some(0.5)) else {
            panic!("expected phong material");
        };
        assert!(glass.transparent);
    }

    #[test]
    fn only_shader_materials_expose_time() {
        let mut corona: Material =
            AnimatedMaterial::corona(Colour(0xffff00), Colour(0xff9900), Vec3::ZERO).into();
        assert_eq!(corona.time(), Some(INITIAL_SHADER_TIME));
        *corona.time_mut().unwrap() += 1.0;
        assert!((corona.time().unwrap() - 1.0025).abs() < 1e-6);

        let lumpy: Material = AnimatedMaterial::Lumpy {
            colour: Colour(0xaaaaaa),
            light_position: Vec3::ZERO,
            displacement: Vec::new(),
        }
        .into();
        assert_eq!(lumpy.time(), None);
        assert_eq!(Material::phong(Colour::WHITE, None).time(), None);
    }
}
