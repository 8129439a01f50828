use std::path::Path;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::scene::Colour;
use crate::timeline::DEFAULT_TICK_INTERVAL;
use crate::{OrreryError, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scene: SceneConfig,
    pub render: RenderConfig,
    /// Seed for particle placement and surface displacement.
    pub seed: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            render: RenderConfig::default(),
            seed: 0x5eed,
        }
    }
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.scene.validate()?;
        self.render.validate()
    }
}

/// Sizes, distances and timings of the solar system scene.
///
/// Orbit periods are seconds of wall-clock time for one full revolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub star_radius: f32,
    pub planet_radius: f32,
    pub moon_radius: f32,
    pub moon_lumpiness: f32,
    pub planet_orbit_distance: f32,
    pub planet_orbit_period: f64,
    pub moon_orbit_distance: f32,
    pub moon_orbit_period: f64,
    pub particle_count: usize,
    /// Logic clock interval. Zero selects the 10 ms default.
    pub clock_frequency_ms: u64,
    pub palette: Palette,
    pub light_position: Vec3,
    pub camera_position: Vec3,
    pub shader_time_step: f64,
    /// Rotation of the starfield about Y, in radians per tick.
    pub starfield_spin: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            star_radius: 50.0,
            planet_radius: 20.0,
            moon_radius: 10.0,
            moon_lumpiness: 1.0,
            planet_orbit_distance: 150.0,
            planet_orbit_period: 12.0,
            moon_orbit_distance: 50.0,
            moon_orbit_period: 1.2,
            particle_count: 1000,
            clock_frequency_ms: 10,
            palette: Palette::default(),
            light_position: Vec3::new(15.0, 100.0, 150.0),
            camera_position: Vec3::new(-100.0, 50.0, 300.0),
            shader_time_step: 0.0025,
            starfield_spin: -0.001,
        }
    }
}

impl SceneConfig {
    pub fn clock_interval(&self) -> Duration {
        match self.clock_frequency_ms {
            0 => DEFAULT_TICK_INTERVAL,
            ms => Duration::from_millis(ms),
        }
    }

    pub fn planet_period(&self) -> Result<Duration> {
        period("planet_orbit_period", self.planet_orbit_period)
    }

    pub fn moon_period(&self) -> Result<Duration> {
        period("moon_orbit_period", self.moon_orbit_period)
    }

    pub fn validate(&self) -> Result<()> {
        let lengths = [
            ("star_radius", self.star_radius),
            ("planet_radius", self.planet_radius),
            ("moon_radius", self.moon_radius),
            ("planet_orbit_distance", self.planet_orbit_distance),
            ("moon_orbit_distance", self.moon_orbit_distance),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }

        self.planet_period()?;
        self.moon_period()?;

        if !self.moon_lumpiness.is_finite() || self.moon_lumpiness < 0.0 {
            return Err(invalid("moon_lumpiness must be zero or positive"));
        }
        if !self.shader_time_step.is_finite() || !self.starfield_spin.is_finite() {
            return Err(invalid("per-tick steps must be finite"));
        }
        Ok(())
    }
}

/// Colours of the scene's bodies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub star: [Colour; 2],
    pub corona: [Colour; 2],
    pub planet: [Colour; 2],
    pub moon: Colour,
    pub light: Colour,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            star: [Colour(0xff6600), Colour(0xff3300)],
            corona: [Colour(0xffff00), Colour(0xff9900)],
            planet: [Colour(0x6666ff), Colour(0xffffff)],
            moon: Colour(0xaaaaaa),
            light: Colour::WHITE,
        }
    }
}

/// Configuration specific to the render loop and its host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub refresh_rate_hz: f64,
    /// Upper bound on clock ticks delivered for a single host wake-up;
    /// older overdue ticks are dropped.
    pub max_catch_up_ticks: u32,
    pub aspect: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            refresh_rate_hz: 60.0,
            max_catch_up_ticks: 25,
            aspect: 16.0 / 9.0,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.refresh_rate_hz.is_finite() || self.refresh_rate_hz <= 0.0 {
            return Err(invalid("refresh_rate_hz must be positive"));
        }
        if self.max_catch_up_ticks == 0 {
            return Err(invalid("max_catch_up_ticks must be at least 1"));
        }
        if !self.aspect.is_finite() || self.aspect <= 0.0 {
            return Err(invalid("aspect must be positive"));
        }
        Ok(())
    }
}

fn period(name: &str, seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .ok()
        .filter(|period| !period.is_zero())
        .ok_or_else(|| {
            invalid(format!(
                "{name} must be a positive number of seconds, got {seconds}"
            ))
        })
}

fn invalid(reason: impl Into<String>) -> OrreryError {
    OrreryError::InvalidConfig(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_scene() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scene.clock_interval(), Duration::from_millis(10));
        assert_eq!(config.scene.planet_period().unwrap(), Duration::from_secs(12));
        assert_eq!(config.scene.particle_count, 1000);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "scene": { "moon_radius": 4.0, "clock_frequency_ms": 0 } }"#)
                .unwrap();

        assert_eq!(config.scene.moon_radius, 4.0);
        assert_eq!(config.scene.star_radius, 50.0);
        assert_eq!(config.scene.clock_interval(), DEFAULT_TICK_INTERVAL);
        assert_eq!(config.render.refresh_rate_hz, 60.0);
    }

    #[test]
    fn rejects_non_positive_orbits() {
        let mut config = AppConfig::default();
        config.scene.moon_orbit_period = 0.0;
        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("moon_orbit_period"));

        let mut config = AppConfig::default();
        config.scene.planet_orbit_distance = -3.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.render.refresh_rate_hz = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn survives_a_json_round_trip() {
        let config = AppConfig::default();
        let parsed: AppConfig = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn loads_from_disk() {
        let path =
            std::env::temp_dir().join(format!("orrery-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "seed": 9, "render": { "refresh_rate_hz": 30.0 } }"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.seed, 9);
        assert_eq!(config.render.refresh_rate_hz, 30.0);
    }
}
