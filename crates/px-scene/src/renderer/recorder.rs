use glam::{Affine2, Vec2};

use crate::api::types::Color;
use crate::assets::raster::Raster;
use crate::renderer::traits::{Style, Surface, TransformStack};

/// One primitive captured by a [`RecordingSurface`], with the transform that was current.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Background(Color),
    Ellipse {
        transform: Affine2,
        center: Vec2,
        radii: Vec2,
        style: Style,
    },
    Rect {
        transform: Affine2,
        center: Vec2,
        size: Vec2,
        style: Style,
    },
    Polygon {
        transform: Affine2,
        points: Vec<Vec2>,
        style: Style,
    },
    Image {
        transform: Affine2,
        center: Vec2,
        size: Vec2,
        opacity: f32,
        raster_size: (u32, u32),
    },
}

impl DrawCommand {
    /// Pixel position of the primitive's center, if it has one.
    pub fn pixel_center(&self) -> Option<Vec2> {
        match self {
            DrawCommand::Background(_) => None,
            DrawCommand::Ellipse { transform, center, .. }
            | DrawCommand::Rect { transform, center, .. }
            | DrawCommand::Image { transform, center, .. } => {
                Some(transform.transform_point2(*center))
            }
            DrawCommand::Polygon { transform, points, .. } => {
                if points.is_empty() {
                    return None;
                }
                let sum: Vec2 = points.iter().copied().sum();
                Some(transform.transform_point2(sum / points.len() as f32))
            }
        }
    }
}

/// A surface that records what was drawn instead of rasterizing it.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Vec2,
    stack: TransformStack,
    commands: Vec<DrawCommand>,
    frames: u64,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Vec2::new(width as f32, height as f32),
            stack: TransformStack::default(),
            commands: Vec::new(),
            frames: 0,
        }
    }

    /// Commands of the most recent frame.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Primitives only, skipping the background clear.
    pub fn shapes(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| !matches!(c, DrawCommand::Background(_)))
    }

    pub fn frames_completed(&self) -> u64 {
        self.frames
    }

    /// Transform stack depth; zero between balanced frames.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn begin_frame(&mut self) {
        self.stack.reset();
        self.commands.clear();
    }

    fn set_background(&mut self, color: Color) {
        self.commands.push(DrawCommand::Background(color));
    }

    fn push_transform(&mut self) {
        self.stack.push();
    }

    fn pop_transform(&mut self) {
        self.stack.pop();
    }

    fn translate(&mut self, offset: Vec2) {
        self.stack.translate(offset);
    }

    fn rotate(&mut self, angle: f32) {
        self.stack.rotate(angle);
    }

    fn scale(&mut self, factor: Vec2) {
        self.stack.scale(factor);
    }

    fn ellipse(&mut self, center: Vec2, radii: Vec2, style: &Style) {
        self.commands.push(DrawCommand::Ellipse {
            transform: self.stack.current(),
            center,
            radii,
            style: *style,
        });
    }

    fn rect(&mut self, center: Vec2, size: Vec2, style: &Style) {
        self.commands.push(DrawCommand::Rect {
            transform: self.stack.current(),
            center,
            size,
            style: *style,
        });
    }

    fn polygon(&mut self, points: &[Vec2], style: &Style) {
        self.commands.push(DrawCommand::Polygon {
            transform: self.stack.current(),
            points: points.to_vec(),
            style: *style,
        });
    }

    fn image(&mut self, raster: &Raster, center: Vec2, size: Vec2, opacity: f32) {
        self.commands.push(DrawCommand::Image {
            transform: self.stack.current(),
            center,
            size,
            opacity,
            raster_size: (raster.width(), raster.height()),
        });
    }

    fn end_frame(&mut self) {
        self.frames += 1;
    }
}
