//! Vector artwork rasterized once at load time.

use std::path::Path;

use glam::Vec2;

use crate::api::config::YAxis;
use crate::assets::raster::{AssetError, Raster};
use crate::assets::svg::{rasterize_svg, rasterize_svg_file};
use crate::components::entity::{HasOpacity, Visual};
use crate::components::sprite::{draw_upright, placeholder_raster};
use crate::renderer::traits::Surface;

/// Raster resolution used when none is given.
pub const DEFAULT_PIXELS_PER_UNIT: f32 = 64.0;

/// An SVG document drawn over a fixed world-space rectangle.
///
/// The document is rendered once, at `pixels_per_unit` texels per world
/// unit, and stretched like any other image afterwards. Rotation and render
/// scale come from the entity pose.
#[derive(Debug, Clone)]
pub struct SvgVisual {
    raster: Raster,
    size: Vec2,
    opacity: f32,
    fallback: Option<String>,
}

impl SvgVisual {
    pub fn from_data(data: &[u8], size: Vec2, pixels_per_unit: f32) -> Self {
        let (width, height) = raster_dims(size, pixels_per_unit);
        match rasterize_svg(data, width, height) {
            Ok(raster) => Self::from_raster(raster, size),
            Err(err) => Self::placeholder(size, err),
        }
    }

    /// Load an SVG file. On failure the visual draws a red placeholder and
    /// reports the reason through [`Visual::fallback_reason`].
    pub fn load(path: impl AsRef<Path>, size: Vec2, pixels_per_unit: f32) -> Self {
        let (width, height) = raster_dims(size, pixels_per_unit);
        match rasterize_svg_file(path, width, height) {
            Ok(raster) => Self::from_raster(raster, size),
            Err(err) => Self::placeholder(size, err),
        }
    }

    fn from_raster(raster: Raster, size: Vec2) -> Self {
        Self {
            raster,
            size,
            opacity: 1.0,
            fallback: None,
        }
    }

    fn placeholder(size: Vec2, err: AssetError) -> Self {
        log::warn!("svg asset unavailable, drawing placeholder: {err}");
        let mut visual = Self::from_raster(placeholder_raster(), size);
        visual.fallback = Some(err.to_string());
        visual
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }
}

fn raster_dims(size: Vec2, pixels_per_unit: f32) -> (u32, u32) {
    let texels = (size.abs() * pixels_per_unit.max(0.0)).ceil();
    (texels.x.max(1.0) as u32, texels.y.max(1.0) as u32)
}

impl Visual for SvgVisual {
    fn draw(&self, surface: &mut dyn Surface, y_axis: YAxis) {
        draw_upright(surface, &self.raster, Vec2::ZERO, self.size, self.opacity, y_axis);
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

    fn fallback_reason(&self) -> Option<&str> {
        self.fallback.as_deref()
    }
}

impl HasOpacity for SvgVisual {
    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Color;
    use crate::renderer::recorder::{DrawCommand, RecordingSurface};

    const BADGE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2">
        <rect width="4" height="2" fill="blue"/>
    </svg>"#;

    #[test]
    fn resolution_follows_size() {
        let visual = SvgVisual::from_data(BADGE.as_bytes(), Vec2::new(2.0, 1.0), 16.0);
        assert!(visual.fallback_reason().is_none());
        assert_eq!((visual.raster().width(), visual.raster().height()), (32, 16));
        assert_eq!(visual.raster().pixel(16, 8), Some(Color::BLUE));
        assert_eq!(visual.extents(), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn broken_source_falls_back_to_placeholder() {
        let visual = SvgVisual::from_data(b"<svg", Vec2::ONE, DEFAULT_PIXELS_PER_UNIT);
        assert!(visual.fallback_reason().unwrap().contains("invalid svg"));
        assert_eq!(visual.raster().pixel(0, 0), Some(Color::RED));

        let missing = SvgVisual::load("no/such/logo.svg", Vec2::ONE, DEFAULT_PIXELS_PER_UNIT);
        assert!(missing.fallback_reason().unwrap().contains("no/such/logo.svg"));
    }

    #[test]
    fn draws_one_upright_image() {
        let mut visual = SvgVisual::from_data(BADGE.as_bytes(), Vec2::new(2.0, 1.0), 8.0);
        visual.set_opacity(0.5);
        let mut surface = RecordingSurface::new(10, 10);
        visual.draw(&mut surface, YAxis::Up);
        match &surface.commands()[0] {
            DrawCommand::Image { size, opacity, raster_size, transform, .. } => {
                assert_eq!(*size, Vec2::new(2.0, 1.0));
                assert_eq!(*opacity, 0.5);
                assert_eq!(*raster_size, (16, 8));
                assert_eq!(transform.matrix2.y_axis.y, -1.0);
            }
            other => panic!("expected Image, got {other:?}"),
        }
        assert_eq!(surface.depth(), 0);
    }
}
