//! Raster-backed visuals: static images and sprite-sheet animations.

use std::path::Path;

use glam::Vec2;

use crate::api::config::YAxis;
use crate::api::types::Color;
use crate::assets::raster::{decode_file, AssetError, Raster};
use crate::components::entity::{HasOpacity, Playback, Visual};
use crate::renderer::traits::Surface;

/// Side length in pixels of the placeholder frames drawn when an asset fails to load.
const PLACEHOLDER_SIZE: u32 = 8;

/// Frame sequence drawn over a fixed world-space rectangle.
#[derive(Debug, Clone)]
pub struct SpriteVisual {
    frames: Vec<Raster>,
    /// Drawn width and height in world units.
    size: Vec2,
    /// Seconds per frame; zero disables playback.
    frame_duration: f32,
    frame_index: usize,
    frame_timer: f32,
    playing: bool,
    looping: bool,
    opacity: f32,
    fallback: Option<String>,
}

impl SpriteVisual {
    /// Sprite over already-decoded frames. An empty list gets one placeholder frame.
    pub fn from_frames(frames: Vec<Raster>, size: Vec2, fps: f32) -> Self {
        let (frames, fallback) = if frames.is_empty() {
            (placeholder_frames(1), Some("sprite has no frames".to_string()))
        } else {
            (frames, None)
        };
        Self {
            frames,
            size,
            frame_duration: if fps > 0.0 { 1.0 / fps } else { 0.0 },
            frame_index: 0,
            frame_timer: 0.0,
            playing: false,
            looping: true,
            opacity: 1.0,
            fallback,
        }
    }

    /// A single static image.
    pub fn from_image(image: Raster, size: Vec2) -> Self {
        Self::from_frames(vec![image], size, 0.0)
    }

    /// Slice a decoded sheet into frames.
    pub fn from_sheet(
        sheet: &Raster,
        columns: u32,
        total_frames: u32,
        frame_width: u32,
        frame_height: u32,
        size: Vec2,
        fps: f32,
    ) -> Result<Self, AssetError> {
        let frames = sheet.slice_sheet(columns, total_frames, frame_width, frame_height)?;
        Ok(Self::from_frames(frames, size, fps))
    }

    /// Load and slice a sheet from disk. On failure the sprite draws red
    /// placeholder frames and reports the reason through
    /// [`Visual::fallback_reason`].
    pub fn load_sheet(
        path: impl AsRef<Path>,
        columns: u32,
        total_frames: u32,
        frame_width: u32,
        frame_height: u32,
        size: Vec2,
        fps: f32,
    ) -> Self {
        let path = path.as_ref();
        let result = decode_file(path).and_then(|sheet| {
            Self::from_sheet(&sheet, columns, total_frames, frame_width, frame_height, size, fps)
        });
        result.unwrap_or_else(|err| Self::placeholder(total_frames.max(1), size, fps, err))
    }

    /// Load a static image from disk, falling back to a red placeholder.
    pub fn load_image(path: impl AsRef<Path>, size: Vec2) -> Self {
        match decode_file(path) {
            Ok(image) => Self::from_image(image, size),
            Err(err) => Self::placeholder(1, size, 0.0, err),
        }
    }

    fn placeholder(frame_count: u32, size: Vec2, fps: f32, err: AssetError) -> Self {
        log::warn!("sprite asset unavailable, drawing placeholder: {err}");
        let mut sprite = Self::from_frames(placeholder_frames(frame_count), size, fps);
        sprite.fallback = Some(err.to_string());
        sprite
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn current_frame(&self) -> usize {
        self.frame_index
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Jump to a frame, keeping the playback state.
    pub fn set_frame(&mut self, index: usize) {
        if index < self.frames.len() {
            self.frame_index = index;
            self.frame_timer = 0.0;
        }
    }
}

/// Red square drawn in place of an asset that failed to load.
pub(crate) fn placeholder_raster() -> Raster {
    Raster::solid(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, Color::RED)
}

fn placeholder_frames(count: u32) -> Vec<Raster> {
    (0..count).map(|_| placeholder_raster()).collect()
}

/// Draw a raster in the local frame, keeping row 0 on top when world +Y
/// points up the screen.
pub(crate) fn draw_upright(
    surface: &mut dyn Surface,
    raster: &Raster,
    center: Vec2,
    size: Vec2,
    opacity: f32,
    y_axis: YAxis,
) {
    if y_axis == YAxis::Up {
        surface.push_transform();
        surface.scale(Vec2::new(1.0, -1.0));
        surface.image(raster, Vec2::new(center.x, -center.y), size, opacity);
        surface.pop_transform();
    } else {
        surface.image(raster, center, size, opacity);
    }
}

impl Visual for SpriteVisual {
    fn draw(&self, surface: &mut dyn Surface, y_axis: YAxis) {
        let Some(frame) = self.frames.get(self.frame_index) else {
            return;
        };
        draw_upright(surface, frame, Vec2::ZERO, self.size, self.opacity, y_axis);
    }

    fn update(&mut self, dt: f32) {
        if !self.playing || self.frame_duration <= 0.0 || self.frames.len() < 2 {
            return;
        }
        self.frame_timer += dt;
        while self.frame_timer >= self.frame_duration {
            self.frame_timer -= self.frame_duration;
            if self.frame_index + 1 < self.frames.len() {
                self.frame_index += 1;
            } else if self.looping {
                self.frame_index = 0;
            } else {
                self.playing = false;
                self.frame_timer = 0.0;
                break;
            }
        }
    }

    fn extents(&self) -> Vec2 {
        self.size
    }

    fn as_opacity(&self) -> Option<&dyn HasOpacity> {
        Some(self)
    }

    fn as_opacity_mut(&mut self) -> Option<&mut dyn HasOpacity> {
        Some(self)
    }

    fn as_playback_mut(&mut self) -> Option<&mut dyn Playback> {
        Some(self)
    }

    fn fallback_reason(&self) -> Option<&str> {
        self.fallback.as_deref()
    }
}

impl HasOpacity for SpriteVisual {
    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }
}

impl Playback for SpriteVisual {
    /// Start from the first frame.
    fn play(&mut self, looping: bool) {
        self.looping = looping;
        self.playing = true;
        self.frame_index = 0;
        self.frame_timer = 0.0;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.frame_timer = 0.0;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}
