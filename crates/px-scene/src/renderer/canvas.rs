//! Software canvas backed by a tiny-skia pixmap.
//!
//! The transform stack maps local shapes to pixels; tiny-skia fills and
//! strokes the resulting paths with anti-aliasing and source-over blending.

use std::path::Path;

use glam::{Affine2, Vec2};
use tiny_skia::{
    FillRule, FilterQuality, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke,
    Transform,
};

use crate::api::types::Color;
use crate::assets::raster::Raster;
use crate::renderer::traits::{Style, Surface, TransformStack};

/// Thinnest outline drawn, in pixels.
const MIN_STROKE_PX: f32 = 1.0;

/// Errors raised while writing a rendered frame to disk.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to create output directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot allocate a {width}x{height} canvas")]
    Size { width: u32, height: u32 },
}

fn to_skia_transform(t: Affine2) -> Transform {
    Transform::from_row(
        t.matrix2.x_axis.x,
        t.matrix2.x_axis.y,
        t.matrix2.y_axis.x,
        t.matrix2.y_axis.y,
        t.translation.x,
        t.translation.y,
    )
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.red(), color.green(), color.blue(), color.alpha());
    paint.anti_alias = true;
    paint
}

/// An in-memory pixel buffer implementing [`Surface`], read back as ARGB.
pub struct Canvas {
    pixmap: Pixmap,
    stack: TransformStack,
}

impl Canvas {
    /// Fails for a zero or oversized dimension.
    pub fn new(width: u32, height: u32) -> Result<Self, ExportError> {
        let pixmap = Pixmap::new(width, height).ok_or(ExportError::Size { width, height })?;
        Ok(Self {
            pixmap,
            stack: TransformStack::default(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Row-major ARGB copy of the buffer.
    pub fn pixels(&self) -> Vec<Color> {
        self.snapshot().pixels().to_vec()
    }

    /// The buffer as raw `0xAARRGGBB` words.
    pub fn to_argb(&self) -> Vec<u32> {
        let pixels = self.pixels();
        bytemuck::cast_slice::<Color, u32>(&pixels).to_vec()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::argb(c.alpha(), c.red(), c.green(), c.blue()))
    }

    /// Copy of the current buffer as a [`Raster`].
    pub fn snapshot(&self) -> Raster {
        Raster::from_pixmap(&self.pixmap)
    }

    /// Encode the buffer as a PNG file.
    pub fn export_png(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let path = path.as_ref();
        let img = image::RgbaImage::from_fn(self.width(), self.height(), |x, y| {
            image::Rgba(self.pixel(x, y).unwrap_or(Color::TRANSPARENT).to_rgba8())
        });
        img.save_with_format(path, image::ImageFormat::Png)
            .map_err(|source| ExportError::Encode {
                path: path.display().to_string(),
                source,
            })
    }

    fn draw_path(&mut self, path: &tiny_skia::Path, style: &Style) {
        let transform = to_skia_transform(self.stack.current());
        if let Some(color) = style.fill {
            self.pixmap
                .fill_path(path, &solid_paint(color), FillRule::Winding, transform, None);
        }
        if let Some(color) = style.stroke {
            let scale = self.stack.linear_scale();
            if scale <= f32::EPSILON {
                return;
            }
            // Stroke width is given in local units and scaled by the transform.
            let stroke = Stroke {
                width: style.stroke_weight.max(MIN_STROKE_PX / scale),
                line_join: LineJoin::Miter,
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(path, &solid_paint(color), &stroke, transform, None);
        }
    }
}

impl Surface for Canvas {
    fn size(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.height() as f32)
    }

    fn begin_frame(&mut self) {
        self.stack.reset();
    }

    fn set_background(&mut self, color: Color) {
        self.pixmap.fill(tiny_skia::Color::from_rgba8(
            color.red(),
            color.green(),
            color.blue(),
            color.alpha(),
        ));
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
        let oval = Rect::from_xywh(
            center.x - radii.x,
            center.y - radii.y,
            radii.x * 2.0,
            radii.y * 2.0,
        );
        if let Some(path) = oval.and_then(PathBuilder::from_oval) {
            self.draw_path(&path, style);
        }
    }

    fn rect(&mut self, center: Vec2, size: Vec2, style: &Style) {
        let h = size / 2.0;
        self.polygon(
            &[
                center + Vec2::new(-h.x, -h.y),
                center + Vec2::new(h.x, -h.y),
                center + Vec2::new(h.x, h.y),
                center + Vec2::new(-h.x, h.y),
            ],
            style,
        );
    }

    fn polygon(&mut self, points: &[Vec2], style: &Style) {
        let [first, rest @ ..] = points else {
            return;
        };
        if rest.len() < 2 {
            return;
        }
        let mut builder = PathBuilder::new();
        builder.move_to(first.x, first.y);
        for p in rest {
            builder.line_to(p.x, p.y);
        }
        builder.close();
        if let Some(path) = builder.finish() {
            self.draw_path(&path, style);
        }
    }

    fn image(&mut self, raster: &Raster, center: Vec2, size: Vec2, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        if size.x <= 0.0 || size.y <= 0.0 || opacity <= 0.0 {
            return;
        }
        let Some(texture) = raster.to_pixmap() else {
            return;
        };
        // Texel space -> local rectangle -> pixels.
        let origin = center - size / 2.0;
        let texel = Vec2::new(
            size.x / raster.width() as f32,
            size.y / raster.height() as f32,
        );
        let local = Affine2::from_translation(origin) * Affine2::from_scale(texel);
        let paint = PixmapPaint {
            opacity,
            quality: FilterQuality::Nearest,
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            texture.as_ref(),
            &paint,
            to_skia_transform(self.stack.current() * local),
            None,
        );
    }

    fn end_frame(&mut self) {
        if self.stack.depth() != 0 {
            log::warn!("frame ended with {} unpopped transforms", self.stack.depth());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Canvas {
        let mut c = Canvas::new(100, 100).unwrap();
        c.begin_frame();
        c.set_background(Color::WHITE);
        c
    }

    #[test]
    fn background_fills_every_pixel() {
        let c = canvas();
        assert!(c.pixels().iter().all(|p| *p == Color::WHITE));
        assert_eq!(c.to_argb()[0], 0xFFFF_FFFF);
    }

    #[test]
    fn rect_fills_interior_only() {
        let mut c = canvas();
        c.rect(Vec2::new(50.0, 50.0), Vec2::new(20.0, 20.0), &Style::filled(Color::RED));
        assert_eq!(c.pixel(50, 50), Some(Color::RED));
        assert_eq!(c.pixel(41, 41), Some(Color::RED));
        assert_eq!(c.pixel(30, 30), Some(Color::WHITE));
        assert_eq!(c.pixel(61, 50), Some(Color::WHITE));
    }

    #[test]
    fn transform_moves_shapes() {
        let mut c = canvas();
        c.push_transform();
        c.translate(Vec2::new(50.0, 50.0));
        c.scale(Vec2::new(10.0, -10.0));
        c.ellipse(Vec2::new(2.0, 2.0), Vec2::splat(0.5), &Style::filled(Color::BLUE));
        c.pop_transform();
        // (2, 2) in world lands at (70, 30) in pixels
        assert_eq!(c.pixel(70, 30), Some(Color::BLUE));
        assert_eq!(c.pixel(70, 70), Some(Color::WHITE));
    }

    #[test]
    fn translucent_fill_blends_once() {
        let mut c = canvas();
        let half_black = Color::BLACK.with_opacity(0.5);
        c.polygon(
            &[
                Vec2::new(10.0, 10.0),
                Vec2::new(90.0, 10.0),
                Vec2::new(90.0, 90.0),
                Vec2::new(10.0, 90.0),
            ],
            &Style::filled(half_black),
        );
        // One path, so the interior blends exactly once everywhere.
        let center = c.pixel(50, 50).unwrap();
        assert_eq!(c.pixel(30, 30), Some(center));
        assert!((center.red() as i32 - 127).abs() <= 1);
    }

    #[test]
    fn stroke_draws_outline() {
        let mut c = canvas();
        let style = Style::filled(Color::WHITE).with_stroke(Color::BLACK, 2.0);
        c.rect(Vec2::new(50.0, 50.0), Vec2::new(40.0, 40.0), &style);
        assert_eq!(c.pixel(30, 50), Some(Color::BLACK));
        assert_eq!(c.pixel(50, 50), Some(Color::WHITE));
    }

    #[test]
    fn degenerate_shapes_draw_nothing() {
        let mut c = canvas();
        let style = Style::filled(Color::RED);
        c.polygon(&[Vec2::ZERO, Vec2::ONE], &style);
        c.ellipse(Vec2::new(50.0, 50.0), Vec2::new(0.0, 5.0), &style);
        c.rect(Vec2::new(50.0, 50.0), Vec2::ZERO, &style);
        assert!(c.pixels().iter().all(|p| *p == Color::WHITE));
    }

    #[test]
    fn image_maps_row_zero_to_local_min_y() {
        let mut c = canvas();
        let mut pixels = vec![Color::RED; 2];
        pixels.extend([Color::BLUE; 2]);
        let raster = Raster::from_pixels(2, 2, pixels).unwrap();
        c.image(&raster, Vec2::new(50.0, 50.0), Vec2::new(20.0, 20.0), 1.0);
        assert_eq!(c.pixel(50, 45), Some(Color::RED));
        assert_eq!(c.pixel(50, 55), Some(Color::BLUE));
        assert_eq!(c.pixel(50, 65), Some(Color::WHITE));
    }

    #[test]
    fn image_opacity_zero_is_invisible() {
        let mut c = canvas();
        let raster = Raster::solid(2, 2, Color::RED);
        c.image(&raster, Vec2::new(50.0, 50.0), Vec2::new(20.0, 20.0), 0.0);
        assert_eq!(c.pixel(50, 50), Some(Color::WHITE));
    }

    #[test]
    fn shapes_outside_the_canvas_are_clipped() {
        let mut c = canvas();
        c.rect(Vec2::new(-50.0, 500.0), Vec2::new(20.0, 20.0), &Style::filled(Color::RED));
        c.rect(Vec2::new(100.0, 100.0), Vec2::new(20.0, 20.0), &Style::filled(Color::RED));
        assert_eq!(c.pixel(99, 99), Some(Color::RED));
        assert_eq!(c.pixel(0, 0), Some(Color::WHITE));
    }

    #[test]
    fn zero_sized_canvas_is_rejected() {
        assert!(matches!(
            Canvas::new(0, 10),
            Err(ExportError::Size { width: 0, height: 10 })
        ));
    }

    #[test]
    fn rotated_image_is_drawn_through_the_transform() {
        let mut c = canvas();
        c.push_transform();
        c.translate(Vec2::new(50.0, 50.0));
        c.rotate(std::f32::consts::FRAC_PI_2);
        let raster = Raster::from_pixels(2, 1, vec![Color::RED, Color::BLUE]).unwrap();
        // Local +X now points down the screen.
        c.image(&raster, Vec2::ZERO, Vec2::new(20.0, 10.0), 1.0);
        c.pop_transform();
        assert_eq!(c.pixel(50, 44), Some(Color::RED));
        assert_eq!(c.pixel(50, 55), Some(Color::BLUE));
        assert_eq!(c.pixel(42, 50), Some(Color::WHITE));
    }

    #[test]
    fn export_writes_png() {
        let mut c = canvas();
        c.rect(Vec2::new(50.0, 50.0), Vec2::new(20.0, 20.0), &Style::filled(Color::RED));
        let path = std::env::temp_dir().join(format!("px_scene_canvas_{}.png", std::process::id()));
        c.export_png(&path).unwrap();
        let back = crate::assets::decode_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back.pixel(50, 50), Some(Color::RED));
        assert_eq!(back.pixel(0, 0), Some(Color::WHITE));
    }
}
