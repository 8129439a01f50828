use std::f64::consts::TAU;
use std::time::Duration;

use glam::Vec3;

use crate::scene::{ObjectId, SceneGraph};
use crate::timeline::{Access, Listener};
use crate::{OrreryError, Result};

/// Moves a satellite around a center on a circle in the XZ plane.
///
/// The current angle is not stored: every tick it is recovered from the
/// satellite's position relative to the center, advanced by a fixed step and
/// written back. Any external nudge to the satellite is therefore absorbed on
/// the next tick. The satellite's `y` and the center's position are read fresh
/// each tick, so orbits chain as long as the center's updater runs first.
#[derive(Debug, Clone)]
pub struct OrbitUpdater {
    label: String,
    center: ObjectId,
    satellite: ObjectId,
    distance: f32,
    angular_step: f32,
    tick_interval: Duration,
}

impl OrbitUpdater {
    /// Binds an orbit of `distance` around `center`, completing one revolution
    /// every `period` of real time on a clock ticking every `tick_interval`.
    /// Registering it on a clock with any other interval fails.
    pub fn bind(
        scene: &SceneGraph,
        center: ObjectId,
        satellite: ObjectId,
        distance: f32,
        period: Duration,
        tick_interval: Duration,
    ) -> Result<Self> {
        if !distance.is_finite() || distance <= 0.0 {
            return Err(OrreryError::binding(format!(
                "orbit distance must be positive, got {distance}"
            )));
        }
        if period.is_zero() {
            return Err(OrreryError::binding("orbit period must be positive"));
        }
        if tick_interval.is_zero() {
            return Err(OrreryError::InvalidInterval);
        }
        if center == satellite {
            return Err(OrreryError::binding(format!(
                "{center} cannot orbit itself"
            )));
        }
        let center_name = &scene.object(center)?.name;
        let satellite_name = &scene.object(satellite)?.name;

        let ticks_per_revolution = period.as_secs_f64() / tick_interval.as_secs_f64();
        Ok(Self {
            label: format!("orbit {satellite_name} around {center_name}"),
            center,
            satellite,
            distance,
            angular_step: (TAU / ticks_per_revolution) as f32,
            tick_interval,
        })
    }

    /// Radians added to the satellite's angle on every tick.
    pub fn angular_step(&self) -> f32 {
        self.angular_step
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn center(&self) -> ObjectId {
        self.center
    }

    pub fn satellite(&self) -> ObjectId {
        self.satellite
    }

    /// Advances the satellite by one tick.
    pub fn advance(&self, scene: &mut SceneGraph) -> Result<()> {
        let center = scene.position(self.center)?;
        let transform = scene.transform_mut(self.satellite)?;
        let current = transform.position;

        let theta = (current.z - center.z).atan2(current.x - center.x) + self.angular_step;
        transform.position = Vec3::new(
            center.x + self.distance * theta.cos(),
            current.y,
            center.z + self.distance * theta.sin(),
        );
        Ok(())
    }
}

impl Listener for OrbitUpdater {
    fn label(&self) -> &str {
        &self.label
    }

    fn reads(&self) -> Vec<Access> {
        vec![Access::position(self.center)]
    }

    fn writes(&self) -> Vec<Access> {
        vec![Access::position(self.satellite)]
    }

    fn tick_interval(&self) -> Option<Duration> {
        Some(self.tick_interval)
    }

    fn on_tick(&mut self, scene: &mut SceneGraph) -> Result<()> {
        self.advance(scene)
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{PI, TAU};

    use super::*;
    use crate::scene::{Colour, Geometry, Material, SceneObject};
    use crate::timeline::Clock;

    const TICK: Duration = Duration::from_millis(10);

    fn body(scene: &mut SceneGraph, name: &str, position: Vec3) -> ObjectId {
        let material = scene.add_material(Material::phong(Colour::WHITE, None));
        scene.add_object(
            SceneObject::mesh(name, Geometry::sphere(1.0, 8), material).with_position(position),
        )
    }

    fn angle(scene: &SceneGraph, center: ObjectId, satellite: ObjectId) -> f32 {
        let c = scene.position(center).unwrap();
        let s = scene.position(satellite).unwrap();
        (s.z - c.z).atan2(s.x - c.x)
    }

    fn planar_distance(scene: &SceneGraph, center: ObjectId, satellite: ObjectId) -> f32 {
        let c = scene.position(center).unwrap();
        let s = scene.position(satellite).unwrap();
        (s.x - c.x).hypot(s.z - c.z)
    }

    #[test]
    fn first_tick_advances_by_one_step() {
        let mut scene = SceneGraph::new();
        let sun = body(&mut scene, "sun", Vec3::ZERO);
        let planet = body(&mut scene, "planet", Vec3::new(150.0, 0.0, 0.0));
        // 20 legacy period units at 60 ticks per unit and 10 ms per tick.
        let orbit =
            OrbitUpdater::bind(&scene, sun, planet, 150.0, Duration::from_secs(12), TICK).unwrap();

        orbit.advance(&mut scene).unwrap();

        let theta = TAU / 1200.0;
        let p = scene.position(planet).unwrap();
        assert!((orbit.angular_step() - theta).abs() < 1e-7);
        assert!((p.x - 150.0 * theta.cos()).abs() < 1e-3);
        assert!((p.z - 150.0 * theta.sin()).abs() < 1e-3);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn keeps_constant_distance_and_closes_a_revolution() {
        let mut scene = SceneGraph::new();
        let sun = body(&mut scene, "sun", Vec3::new(5.0, 3.0, -2.0));
        let planet = body(&mut scene, "planet", Vec3::new(55.0, 7.0, -2.0));
        let orbit =
            OrbitUpdater::bind(&scene, sun, planet, 50.0, Duration::from_secs(12), TICK).unwrap();
        let start = angle(&scene, sun, planet);

        for tick in 1..=1200 {
            orbit.advance(&mut scene).unwrap();
            let distance = planar_distance(&scene, sun, planet);
            assert!((distance - 50.0).abs() < 1e-3, "tick {tick}: {distance}");
        }

        let drift = (angle(&scene, sun, planet) - start).rem_euclid(TAU);
        assert!(drift < 1e-3 || TAU - drift < 1e-3, "drift {drift}");
        assert_eq!(scene.position(planet).unwrap().y, 7.0);
    }

    #[test]
    fn snaps_a_perturbed_satellite_back_onto_the_circle() {
        let mut scene = SceneGraph::new();
        let sun = body(&mut scene, "sun", Vec3::ZERO);
        let planet = body(&mut scene, "planet", Vec3::new(0.0, 0.0, 400.0));
        let orbit =
            OrbitUpdater::bind(&scene, sun, planet, 100.0, Duration::from_secs(4), TICK).unwrap();

        orbit.advance(&mut scene).unwrap();

        assert!((planar_distance(&scene, sun, planet) - 100.0).abs() < 1e-3);
        let expected = PI / 2.0 + orbit.angular_step();
        assert!((angle(&scene, sun, planet) - expected).abs() < 1e-4);
    }

    #[test]
    fn chained_orbits_follow_the_moving_center() {
        let mut scene = SceneGraph::new();
        let sun = body(&mut scene, "sun", Vec3::ZERO);
        let planet = body(&mut scene, "planet", Vec3::new(150.0, 0.0, 0.0));
        let moon = body(&mut scene, "moon", Vec3::new(200.0, 0.0, 0.0));

        let mut clock = Clock::new();
        let planet_orbit =
            OrbitUpdater::bind(&scene, sun, planet, 150.0, Duration::from_secs(12), TICK).unwrap();
        let moon_orbit = OrbitUpdater::bind(
            &scene,
            planet,
            moon,
            50.0,
            Duration::from_millis(1200),
            TICK,
        )
        .unwrap();
        clock.listen(planet_orbit.clone()).unwrap();
        clock.listen(moon_orbit.clone()).unwrap();

        for _ in 0..250 {
            assert!(clock.tick(&mut scene).is_clean());
            assert!((planar_distance(&scene, planet, moon) - 50.0).abs() < 1e-3);
        }

        // Registering the planet after the moon would make the moon orbit the
        // planet's previous position.
        let mut reversed = Clock::new();
        reversed.listen(moon_orbit).unwrap();
        assert!(matches!(
            reversed.listen(planet_orbit),
            Err(OrreryError::OrderingViolation { .. })
        ));
    }

    #[test]
    fn rejects_bad_bindings_up_front() {
        let mut scene = SceneGraph::new();
        let sun = body(&mut scene, "sun", Vec3::ZERO);
        let planet = body(&mut scene, "planet", Vec3::X);
        let period = Duration::from_secs(1);

        for distance in [0.0, -1.0, f32::NAN] {
            assert!(OrbitUpdater::bind(&scene, sun, planet, distance, period, TICK).is_err());
        }
        assert!(OrbitUpdater::bind(&scene, sun, planet, 1.0, Duration::ZERO, TICK).is_err());
        assert!(OrbitUpdater::bind(&scene, sun, planet, 1.0, period, Duration::ZERO).is_err());
        assert!(OrbitUpdater::bind(&scene, sun, sun, 1.0, period, TICK).is_err());

        let mut other = SceneGraph::new();
        let lonely = body(&mut other, "lonely", Vec3::ZERO);
        assert!(matches!(
            OrbitUpdater::bind(&other, lonely, planet, 1.0, period, TICK),
            Err(OrreryError::UnknownObject(_))
        ));
    }

    #[test]
    fn only_registers_on_a_clock_with_the_same_interval() {
        let mut scene = SceneGraph::new();
        let sun = body(&mut scene, "sun", Vec3::ZERO);
        let planet = body(&mut scene, "planet", Vec3::X);
        let period = Duration::from_secs(12);
        let slow = OrbitUpdater::bind(&scene, sun, planet, 1.0, period, TICK * 2).unwrap();

        let mut clock = Clock::with_interval(TICK).unwrap();
        assert!(matches!(
            clock.listen(slow),
            Err(OrreryError::IntervalMismatch { .. })
        ));
        let matching = OrbitUpdater::bind(&scene, sun, planet, 1.0, period, clock.interval());
        assert!(clock.listen(matching.unwrap()).is_ok());
    }

    #[test]
    fn tick_against_a_foreign_scene_fails_without_panicking() {
        let mut scene = SceneGraph::new();
        let sun = body(&mut scene, "sun", Vec3::ZERO);
        let planet = body(&mut scene, "planet", Vec3::X);
        let orbit =
            OrbitUpdater::bind(&scene, sun, planet, 1.0, Duration::from_secs(1), TICK).unwrap();

        assert!(orbit.advance(&mut SceneGraph::new()).is_err());
    }
}
