//! Display-rate rendering, decoupled from the logic clock.
//!
//! The [`RenderLoop`] never advances simulation state. Each invocation hands
//! whatever the scene graph currently holds to a [`Renderer`].

use std::time::Duration;

use tracing::{debug, info};

use crate::scene::{Camera, SceneGraph};
use crate::timeline::Interval;
use crate::Result;

/// Draws one frame of a scene graph through a camera.
pub trait Renderer {
    fn render(&mut self, scene: &SceneGraph, camera: &Camera) -> Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, scene: &SceneGraph, camera: &Camera) -> Result<()> {
        (**self).render(scene, camera)
    }
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn render(&mut self, scene: &SceneGraph, camera: &Camera) -> Result<()> {
        (**self).render(scene, camera)
    }
}

/// Everything a frame needs: the renderer, the camera and the scene graph,
/// owned for the lifetime of an animation session.
#[derive(Debug)]
pub struct RenderContext<R> {
    pub renderer: R,
    pub camera: Camera,
    pub scene: SceneGraph,
}

impl<R: Renderer> RenderContext<R> {
    pub fn new(renderer: R, camera: Camera, scene: SceneGraph) -> Self {
        Self {
            renderer,
            camera,
            scene,
        }
    }

    pub fn render(&mut self) -> Result<()> {
        self.renderer.render(&self.scene, &self.camera)
    }
}

/// Redraws at the display's refresh cadence until stopped.
#[derive(Debug, Clone)]
pub struct RenderLoop {
    refresh: Interval,
    frames: u64,
    running: bool,
}

impl RenderLoop {
    pub fn new(refresh_rate_hz: f64) -> Result<Self> {
        Ok(Self::with_refresh(Interval::from_hz(refresh_rate_hz)?))
    }

    pub fn with_refresh(refresh: Interval) -> Self {
        Self {
            refresh,
            frames: 0,
            running: true,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.refresh.period()
    }

    pub(crate) fn refresh(&self) -> &Interval {
        &self.refresh
    }

    pub(crate) fn refresh_mut(&mut self) -> &mut Interval {
        &mut self.refresh
    }

    /// Renders the context once. Does nothing after [`stop`](Self::stop).
    ///
    /// Renderer failures are returned to the caller untouched.
    pub fn animate<R: Renderer>(&mut self, context: &mut RenderContext<R>) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        context.render()?;
        self.frames += 1;
        Ok(())
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        if self.running {
            info!(frames = self.frames, "render loop stopped");
        }
        self.running = false;
    }
}

/// Headless renderer that logs every frame at debug level.
#[derive(Debug, Default)]
pub struct TraceRenderer {
    frames: u64,
}

impl TraceRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for TraceRenderer {
    fn render(&mut self, scene: &SceneGraph, camera: &Camera) -> Result<()> {
        self.frames += 1;
        debug!(
            frame = self.frames,
            objects = scene.object_count(),
            lights = scene.lights().len(),
            camera = ?camera.position,
            "frame"
        );
        for (_, object) in scene.objects() {
            debug!(
                frame = self.frames,
                object = %object.name,
                position = ?object.transform.position,
                rotation = ?object.transform.rotation,
                "object"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OrreryError;

    #[derive(Default)]
    struct Counting {
        calls: u32,
        fail: bool,
    }

    impl Renderer for Counting {
        fn render(&mut self, _scene: &SceneGraph, _camera: &Camera) -> Result<()> {
            self.calls += 1;
            if self.fail {
                return Err(OrreryError::Render("device lost".to_string()));
            }
            Ok(())
        }
    }

    fn context(renderer: Counting) -> RenderContext<Counting> {
        RenderContext::new(renderer, Camera::default(), SceneGraph::new())
    }

    #[test]
    fn renders_once_per_animate_call() {
        let mut render_loop = RenderLoop::new(60.0).unwrap();
        let mut ctx = context(Counting::default());

        render_loop.animate(&mut ctx).unwrap();
        render_loop.animate(&mut ctx).unwrap();

        assert_eq!(ctx.renderer.calls, 2);
        assert_eq!(render_loop.frames(), 2);
    }

    #[test]
    fn stopped_loop_stops_drawing() {
        let mut render_loop = RenderLoop::new(60.0).unwrap();
        let mut ctx = context(Counting::default());
        render_loop.stop();

        render_loop.animate(&mut ctx).unwrap();

        assert_eq!(ctx.renderer.calls, 0);
        assert!(!render_loop.is_running());
    }

    #[test]
    fn renderer_errors_reach_the_caller() {
        let mut render_loop = RenderLoop::new(60.0).unwrap();
        let mut ctx = context(Counting {
            fail: true,
            ..Default::default()
        });

        let err = render_loop.animate(&mut ctx).unwrap_err();

        assert!(matches!(err, OrreryError::Render(_)));
        assert_eq!(render_loop.frames(), 0);
    }

    #[test]
    fn boxed_renderers_delegate() {
        let mut boxed: Box<dyn Renderer> = Box::new(TraceRenderer::new());
        boxed
            .render(&SceneGraph::new(), &Camera::default())
            .unwrap();
    }
}
