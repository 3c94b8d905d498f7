//! Frame driver: one `tick` per displayed frame, `update` then `draw`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::scene::Scene;
use crate::core::time::FixedTimestep;
use crate::renderer::canvas::{Canvas, ExportError};
use crate::renderer::traits::Surface;

/// Owns a scene and the surface it draws to.
///
/// In variable-step mode each tick clamps `frame_dt` to the scene's
/// `max_dt` and runs one update. In fixed-step mode the clamped frame time
/// feeds a [`FixedTimestep`] and the scene is updated once per due step.
pub struct SceneRunner<S: Surface> {
    scene: Scene,
    surface: S,
    max_dt: f32,
    timestep: Option<FixedTimestep>,
}

impl<S: Surface> SceneRunner<S> {
    pub fn new(scene: Scene, surface: S) -> Self {
        let max_dt = scene.config().max_dt;
        Self {
            scene,
            surface,
            max_dt,
            timestep: None,
        }
    }

    /// Switch to fixed-step updates of `dt` seconds.
    pub fn with_fixed_step(mut self, dt: f32) -> Self {
        self.timestep = Some(FixedTimestep::new(dt));
        self
    }

    /// Advance and draw one frame. Returns the number of updates run.
    pub fn tick(&mut self, frame_dt: f32) -> u32 {
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, self.max_dt.max(0.0))
        } else {
            0.0
        };
        let steps = match &mut self.timestep {
            Some(timestep) => {
                let steps = timestep.accumulate(dt);
                let step_dt = timestep.dt();
                for _ in 0..steps {
                    self.scene.update(step_dt);
                }
                steps
            }
            None => {
                self.scene.update(dt);
                1
            }
        };
        self.scene.draw(&mut self.surface);
        steps
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_parts(self) -> (Scene, S) {
        (self.scene, self.surface)
    }
}

impl SceneRunner<Canvas> {
    /// Create a runner drawing into a canvas sized from the scene's viewport.
    pub fn headless(scene: Scene) -> Result<Self, ExportError> {
        let config = scene.config();
        let canvas = Canvas::new(config.width, config.height)?;
        Ok(Self::new(scene, canvas))
    }

    /// Write the most recently drawn frame.
    pub fn export_frame(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        self.surface.export_png(path)
    }

    /// Tick `frames` times with `dt` and write each frame as
    /// `{prefix}_00000.png`, `{prefix}_00001.png`, and so on.
    pub fn export_frames(
        &mut self,
        frames: u32,
        dt: f32,
        prefix: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>, ExportError> {
        let prefix = prefix.as_ref();
        if let Some(dir) = prefix.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let stem = prefix
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "frame".to_string());

        let mut written = Vec::with_capacity(frames as usize);
        for index in 0..frames {
            self.tick(dt);
            let path = prefix.with_file_name(format!("{stem}_{index:05}.png"));
            self.export_frame(&path)?;
            written.push(path);
        }
        log::info!("exported {} frames to {}", written.len(), prefix.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::SceneConfig;
    use crate::api::types::Color;
    use crate::components::shape::circle;
    use crate::core::physics::MassClass;
    use crate::renderer::recorder::RecordingSurface;
    use glam::Vec2;

    fn falling_ball() -> (Scene, crate::api::types::EntityId) {
        let mut scene = Scene::new(SceneConfig::default());
        let ball = scene.insert(circle(Vec2::ZERO, 0.2, MassClass::Dynamic, Color::RED));
        (scene, ball)
    }

    #[test]
    fn tick_updates_then_draws() {
        let (scene, ball) = falling_ball();
        let mut runner = SceneRunner::new(scene, RecordingSurface::new(800, 600));
        assert_eq!(runner.tick(1.0 / 60.0), 1);
        assert_eq!(runner.surface().frames_completed(), 1);
        assert_eq!(runner.scene().frame_count(), 1);
        assert!(runner.scene().position(ball).unwrap().y < 0.0);
    }

    #[test]
    fn long_frames_are_clamped() {
        let (scene, ball) = falling_ball();
        let mut clamped = SceneRunner::new(scene, RecordingSurface::new(800, 600));
        clamped.tick(5.0);

        let (mut reference, ball_ref) = falling_ball();
        reference.update(1.0 / 30.0);

        let a = clamped.scene().position(ball).unwrap();
        let b = reference.position(ball_ref).unwrap();
        assert!((a - b).length() < 1e-5, "{a} vs {b}");
    }

    #[test]
    fn fixed_step_runs_due_steps() {
        let (scene, _) = falling_ball();
        let mut runner =
            SceneRunner::new(scene, RecordingSurface::new(800, 600)).with_fixed_step(1.0 / 128.0);
        assert_eq!(runner.tick(1.0 / 32.0), 4);
        assert_eq!(runner.tick(0.001), 0);
        assert_eq!(runner.surface().frames_completed(), 2);
    }

    #[test]
    fn export_frames_writes_numbered_pngs() {
        let dir = std::env::temp_dir().join(format!("px-scene-runner-{}", std::process::id()));
        let mut config = SceneConfig::default();
        config.width = 32;
        config.height = 24;
        let mut runner = SceneRunner::headless(Scene::new(config)).expect("canvas");

        let paths = runner
            .export_frames(3, 1.0 / 60.0, dir.join("frame"))
            .expect("export");
        assert_eq!(paths.len(), 3);
        assert!(paths[2].ends_with("frame_00002.png"));
        let decoded = crate::assets::raster::decode_file(&paths[0]).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (32, 24));
        assert_eq!(decoded.pixel(0, 0), Some(Color::WHITE));

        let _ = fs::remove_dir_all(&dir);
    }
}
