//! The demo scene: a turbulent star inside a corona, an orbiting planet with
//! a lumpy moon, and a slowly turning starfield.
//!
//! Building the scene and animating it are separate steps. [`SolarSystem::build`]
//! only populates a [`SceneGraph`]; [`SolarSystem::wire`] registers the
//! updaters on a [`Clock`] in dependency order.

use glam::Vec3;
use tracing::info;

use crate::animation::{OrbitUpdater, ShaderTimeUpdater, SpinUpdater};
use crate::config::{AppConfig, SceneConfig};
use crate::factory::SceneFactory;
use crate::render::{RenderContext, RenderLoop, Renderer};
use crate::scene::{Camera, Geometry, LightId, MaterialId, ObjectId, SceneGraph};
use crate::session::Session;
use crate::timeline::{Clock, ListenerId};
use crate::Result;

const STAR_SEGMENTS: u32 = 16;
const BODY_SEGMENTS: u32 = 32;
/// The corona sits just outside the star's surface.
const CORONA_MARGIN: f32 = 2.0;

/// Handles to everything [`SolarSystem::build`] put into the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarSystem {
    pub star: ObjectId,
    pub corona: ObjectId,
    pub planet: ObjectId,
    pub moon: ObjectId,
    pub starfield: ObjectId,
    pub light: LightId,
    pub star_material: MaterialId,
    pub corona_material: MaterialId,
    pub planet_material: MaterialId,
    pub moon_material: MaterialId,
}

impl SolarSystem {
    /// Adds the bodies, their materials and the light to `scene`.
    ///
    /// The planet starts on the +X axis at its orbit distance from the star,
    /// and the moon on the +X axis at its distance from the planet.
    pub fn build(
        config: &SceneConfig,
        factory: &mut SceneFactory,
        scene: &mut SceneGraph,
    ) -> Result<Self> {
        config.validate()?;
        let palette = config.palette;
        let light_position = config.light_position;

        let [x, y, z] = light_position.to_array();
        let light = scene.add_light(factory.light(palette.light, x, y, z));

        let star_material = scene.add_material(factory.turbulent_material(
            palette.star[0],
            palette.star[1],
            Some(light_position),
        ));
        let star = scene.add_object(factory.sphere(
            "star",
            config.star_radius,
            STAR_SEGMENTS,
            star_material,
        )?);

        let corona_material = scene.add_material(factory.corona_material(
            palette.corona[0],
            palette.corona[1],
            light_position,
        ));
        let corona = scene.add_object(factory.sphere(
            "corona",
            config.star_radius + CORONA_MARGIN,
            BODY_SEGMENTS,
            corona_material,
        )?);

        let planet_material = scene.add_material(factory.turbulent_material(
            palette.planet[0],
            palette.planet[1],
            Some(light_position),
        ));
        let planet_start = Vec3::new(config.planet_orbit_distance, 0.0, 0.0);
        let planet = scene.add_object(
            factory
                .sphere("planet", config.planet_radius, BODY_SEGMENTS, planet_material)?
                .with_position(planet_start),
        );

        let moon_geometry = Geometry::sphere(config.moon_radius, BODY_SEGMENTS);
        let moon_material = scene.add_material(factory.lumpy_material(
            palette.moon,
            light_position,
            config.moon_lumpiness,
            &moon_geometry,
        ));
        let moon = scene.add_object(
            factory
                .sphere("moon", config.moon_radius, BODY_SEGMENTS, moon_material)?
                .with_position(planet_start + Vec3::new(config.moon_orbit_distance, 0.0, 0.0)),
        );

        let particle_material = scene.add_material(factory.particle_material());
        let starfield = scene.add_object(factory.particle_system(
            "starfield",
            config.particle_count,
            particle_material,
        ));

        info!(
            objects = scene.object_count(),
            particles = config.particle_count,
            "built solar system"
        );

        Ok(Self {
            star,
            corona,
            planet,
            moon,
            starfield,
            light,
            star_material,
            corona_material,
            planet_material,
            moon_material,
        })
    }

    /// Registers every updater on `clock`: shader clocks first, then the
    /// planet's orbit before the moon's, then the starfield spin.
    pub fn wire(
        &self,
        config: &SceneConfig,
        clock: &mut Clock,
        scene: &SceneGraph,
    ) -> Result<Vec<ListenerId>> {
        config.validate()?;
        let tick = clock.interval();
        let mut ids = Vec::with_capacity(6);

        for material in [self.star_material, self.corona_material, self.planet_material] {
            ids.push(clock.listen(ShaderTimeUpdater::bind(
                scene,
                material,
                config.shader_time_step,
            )?)?);
        }

        ids.push(clock.listen(OrbitUpdater::bind(
            scene,
            self.star,
            self.planet,
            config.planet_orbit_distance,
            config.planet_period()?,
            tick,
        )?)?);
        ids.push(clock.listen(OrbitUpdater::bind(
            scene,
            self.planet,
            self.moon,
            config.moon_orbit_distance,
            config.moon_period()?,
            tick,
        )?)?);

        ids.push(clock.listen(SpinUpdater::about_y(
            scene,
            self.starfield,
            config.starfield_spin,
        )?)?);

        Ok(ids)
    }
}

/// Camera looking at the system from the configured vantage point.
pub fn camera(config: &AppConfig) -> Camera {
    Camera {
        position: config.scene.camera_position,
        aspect: config.render.aspect,
        ..Camera::default()
    }
}

/// Builds and wires the whole scene into a ready-to-run [`Session`].
pub fn build_session<R: Renderer>(
    config: &AppConfig,
    renderer: R,
) -> Result<(Session<R>, SolarSystem)> {
    config.validate()?;

    let mut factory = SceneFactory::new(config.seed);
    let mut scene = SceneGraph::new();
    let system = SolarSystem::build(&config.scene, &mut factory, &mut scene)?;

    let mut clock = Clock::with_interval(config.scene.clock_interval())?;
    system.wire(&config.scene, &mut clock, &scene)?;

    let render_loop = RenderLoop::new(config.render.refresh_rate_hz)?;
    let context = RenderContext::new(renderer, camera(config), scene);
    let session = Session::new(clock, render_loop, context)?
        .with_max_catch_up(config.render.max_catch_up_ticks);
    Ok((session, system))
}
