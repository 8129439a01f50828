use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::render::Renderer;
use crate::scene::{Camera, SceneGraph, Transform};
use crate::{OrreryError, Result};

/// Configuration options for the recording subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSettings {
    pub output_path: String,
    /// Keep every n-th rendered frame.
    pub frame_stride: u32,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            output_path: String::new(),
            frame_stride: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub name: String,
    pub transform: Transform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Index of the rendered frame, counting frames skipped by the stride.
    pub frame: u64,
    pub objects: Vec<ObjectSnapshot>,
}

/// Renderer that snapshots object transforms instead of drawing them.
#[derive(Debug, Default)]
pub struct Recorder {
    settings: RecordingSettings,
    is_recording: bool,
    rendered: u64,
    frames: Vec<RecordedFrame>,
}

impl Recorder {
    pub fn new(settings: RecordingSettings) -> Self {
        Self {
            settings,
            is_recording: false,
            rendered: 0,
            frames: Vec::new(),
        }
    }

    pub fn start(&mut self) -> Result<()> {
        if self.settings.frame_stride == 0 {
            return Err(OrreryError::InvalidConfig(
                "frame stride must be at least 1".to_string(),
            ));
        }
        self.is_recording = true;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        self.is_recording = false;
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    /// Serialises the captured frames as JSON to the configured output path.
    pub fn finish(&self) -> Result<()> {
        if self.settings.output_path.is_empty() {
            return Err(OrreryError::InvalidConfig(
                "recording has no output path".to_string(),
            ));
        }
        self.write_json(&self.settings.output_path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &self.frames)?;
        writer.flush()?;
        Ok(())
    }
}

impl Renderer for Recorder {
    fn render(&mut self, scene: &SceneGraph, _camera: &Camera) -> Result<()> {
        let frame = self.rendered;
        self.rendered += 1;
        if !self.is_recording || frame % u64::from(self.settings.frame_stride) != 0 {
            return Ok(());
        }

        self.frames.push(RecordedFrame {
            frame,
            objects: scene
                .objects()
                .map(|(_, object)| ObjectSnapshot {
                    name: object.name.clone(),
                    transform: object.transform,
                })
                .collect(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::scene::{Colour, Geometry, Material, SceneObject};

    fn scene() -> SceneGraph {
        let mut scene = SceneGraph::new();
        let material = scene.add_material(Material::phong(Colour::WHITE, None));
        scene.add_object(
            SceneObject::mesh("ball", Geometry::sphere(1.0, 8), material)
                .with_position(Vec3::new(1.0, 2.0, 3.0)),
        );
        scene
    }

    #[test]
    fn captures_only_while_recording() {
        let mut recorder = Recorder::new(RecordingSettings::default());
        let scene = scene();
        let camera = Camera::default();

        recorder.render(&scene, &camera).unwrap();
        recorder.start().unwrap();
        recorder.render(&scene, &camera).unwrap();
        recorder.stop().unwrap();
        recorder.render(&scene, &camera).unwrap();

        assert_eq!(recorder.frames().len(), 1);
        let frame = &recorder.frames()[0];
        assert_eq!(frame.frame, 1);
        assert_eq!(frame.objects[0].name, "ball");
        assert_eq!(frame.objects[0].transform.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn honours_the_frame_stride() {
        let mut recorder = Recorder::new(RecordingSettings {
            frame_stride: 3,
            ..Default::default()
        });
        recorder.start().unwrap();
        let scene = scene();
        for _ in 0..7 {
            recorder.render(&scene, &Camera::default()).unwrap();
        }

        let indices: Vec<_> = recorder.frames().iter().map(|f| f.frame).collect();
        assert_eq!(indices, vec![0, 3, 6]);
    }

    #[test]
    fn writes_frames_as_json() {
        let path =
            std::env::temp_dir().join(format!("orrery-record-{}.json", std::process::id()));
        let mut recorder = Recorder::new(RecordingSettings {
            output_path: path.to_string_lossy().into_owned(),
            ..Default::default()
        });
        recorder.start().unwrap();
        recorder.render(&scene(), &Camera::default()).unwrap();
        recorder.finish().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let frames: Vec<RecordedFrame> = serde_json::from_str(&text).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(frames, recorder.frames());
    }

    #[test]
    fn finishing_without_a_path_is_an_error() {
        assert!(Recorder::default().finish().is_err());
        let mut zero = Recorder::new(RecordingSettings {
            frame_stride: 0,
            ..Default::default()
        });
        assert!(zero.start().is_err());
    }
}
