//! Bitmap-font text.
//!
//! Glyphs come from a grid atlas laid out in ASCII order, one cell per
//! character starting at `start_char`. Each line is centered on the entity
//! position.

use std::path::Path;
use std::sync::Arc;

use glam::Vec2;

use crate::api::config::YAxis;
use crate::api::types::Color;
use crate::assets::raster::{decode_file, AssetError, Raster};
use crate::components::entity::{HasOpacity, Visual};
use crate::components::sprite::{draw_upright, placeholder_raster};
use crate::renderer::traits::Surface;

/// Glyph height in world units when none is given.
pub const DEFAULT_FONT_SIZE: f32 = 0.5;

const DEFAULT_SPACING: f32 = 0.55;

/// Glyph images plus the character mapping and advance.
#[derive(Debug, Clone)]
pub struct FontAtlas {
    glyphs: Vec<Raster>,
    /// First character in the atlas (default 32, space).
    start_char: u8,
    /// Horizontal advance as a fraction of the font size.
    spacing: f32,
}

impl FontAtlas {
    pub fn new(glyphs: Vec<Raster>) -> Self {
        Self {
            glyphs,
            start_char: 32,
            spacing: DEFAULT_SPACING,
        }
    }

    /// Slice a `cols`×`rows` grid of `glyph_width`×`glyph_height` cells.
    pub fn from_sheet(
        sheet: &Raster,
        cols: u32,
        rows: u32,
        glyph_width: u32,
        glyph_height: u32,
    ) -> Result<Self, AssetError> {
        let glyphs = sheet.slice_sheet(cols, cols * rows, glyph_width, glyph_height)?;
        Ok(Self::new(glyphs))
    }

    pub fn load(
        path: impl AsRef<Path>,
        cols: u32,
        rows: u32,
        glyph_width: u32,
        glyph_height: u32,
    ) -> Result<Self, AssetError> {
        let sheet = decode_file(path)?;
        Self::from_sheet(&sheet, cols, rows, glyph_width, glyph_height)
    }

    pub fn with_start_char(mut self, c: u8) -> Self {
        self.start_char = c;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Glyph for `c`, or `None` for characters outside the atlas.
    pub fn glyph(&self, c: char) -> Option<&Raster> {
        if !c.is_ascii() {
            return None;
        }
        let index = (c as u8).checked_sub(self.start_char)?;
        self.glyphs.get(index as usize)
    }
}

/// A laid-out glyph: horizontal center in local units and its tinted image.
#[derive(Debug, Clone)]
struct PlacedGlyph {
    x: f32,
    raster: Raster,
}

/// A line of text in one color, centered on the entity.
#[derive(Debug, Clone)]
pub struct TextVisual {
    text: String,
    font: Option<Arc<FontAtlas>>,
    /// Glyph height in world units.
    font_size: f32,
    color: Color,
    opacity: f32,
    placed: Vec<PlacedGlyph>,
    fallback: Option<String>,
}

impl TextVisual {
    pub fn new(text: impl Into<String>, font: Arc<FontAtlas>, font_size: f32) -> Self {
        let mut visual = Self {
            text: text.into(),
            font: Some(font),
            font_size,
            color: Color::BLACK,
            opacity: 1.0,
            placed: Vec::new(),
            fallback: None,
        };
        visual.layout();
        visual
    }

    /// Text over an atlas loaded from disk. Without the atlas every glyph
    /// draws as a red placeholder and the reason is reported through
    /// [`Visual::fallback_reason`].
    pub fn load(
        text: impl Into<String>,
        path: impl AsRef<Path>,
        cols: u32,
        rows: u32,
        glyph_width: u32,
        glyph_height: u32,
        font_size: f32,
    ) -> Self {
        match FontAtlas::load(path, cols, rows, glyph_width, glyph_height) {
            Ok(font) => Self::new(text, Arc::new(font), font_size),
            Err(err) => Self::without_font(text, font_size, err),
        }
    }

    fn without_font(text: impl Into<String>, font_size: f32, err: AssetError) -> Self {
        log::warn!("font atlas unavailable, drawing placeholder glyphs: {err}");
        let mut visual = Self {
            text: text.into(),
            font: None,
            font_size,
            color: Color::BLACK,
            opacity: 1.0,
            placed: Vec::new(),
            fallback: Some(err.to_string()),
        };
        visual.layout();
        visual
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.set_color(color);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.layout();
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.layout();
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    fn advance(&self) -> f32 {
        let spacing = self.font.as_ref().map_or(DEFAULT_SPACING, |f| f.spacing());
        self.font_size * spacing
    }

    /// Characters without a glyph still take up an advance.
    fn layout(&mut self) {
        let advance = self.advance();
        let count = self.text.chars().count();
        let start = -(advance * count as f32) / 2.0 + advance / 2.0;
        self.placed = self
            .text
            .chars()
            .enumerate()
            .filter(|(_, c)| !c.is_whitespace())
            .filter_map(|(i, c)| {
                let raster = match &self.font {
                    Some(font) => font.glyph(c)?.tinted(self.color),
                    None => placeholder_raster(),
                };
                Some(PlacedGlyph {
                    x: start + i as f32 * advance,
                    raster,
                })
            })
            .collect();
    }
}

impl Visual for TextVisual {
    fn draw(&self, surface: &mut dyn Surface, y_axis: YAxis) {
        let size = Vec2::splat(self.font_size);
        for glyph in &self.placed {
            draw_upright(
                surface,
                &glyph.raster,
                Vec2::new(glyph.x, 0.0),
                size,
                self.opacity,
                y_axis,
            );
        }
    }

    fn extents(&self) -> Vec2 {
        let count = self.text.chars().count();
        if count == 0 {
            return Vec2::ZERO;
        }
        Vec2::new(self.advance() * count as f32, self.font_size)
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

impl HasOpacity for TextVisual {
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
    use crate::renderer::recorder::{DrawCommand, RecordingSurface};
    use approx::assert_relative_eq;

    /// 4x2 grid of 2x2 cells covering '0'..='7'; each glyph has one opaque texel.
    fn digits() -> Arc<FontAtlas> {
        let mut pixels = vec![Color::TRANSPARENT; 8 * 4];
        for i in 0..8u32 {
            let x = (i % 4) * 2;
            let y = (i / 4) * 2;
            pixels[(y * 8 + x) as usize] = Color::WHITE;
        }
        let sheet = Raster::from_pixels(8, 4, pixels).unwrap();
        let atlas = FontAtlas::from_sheet(&sheet, 4, 2, 2, 2)
            .unwrap()
            .with_start_char(b'0')
            .with_spacing(0.5);
        Arc::new(atlas)
    }

    fn image_centers(surface: &RecordingSurface) -> Vec<Vec2> {
        surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Image { center, .. } => Some(*center),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn glyph_lookup_respects_start_char() {
        let font = digits();
        assert!(font.glyph('0').is_some());
        assert!(font.glyph('7').is_some());
        assert!(font.glyph('8').is_none());
        assert!(font.glyph('/').is_none());
        assert!(font.glyph('é').is_none());
    }

    #[test]
    fn line_is_centered_on_the_origin() {
        let text = TextVisual::new("012", digits(), 2.0);
        assert_eq!(text.extents(), Vec2::new(3.0, 2.0));

        let mut surface = RecordingSurface::new(10, 10);
        text.draw(&mut surface, YAxis::Down);
        let xs: Vec<f32> = image_centers(&surface).iter().map(|c| c.x).collect();
        assert_eq!(xs.len(), 3);
        assert_relative_eq!(xs[0], -1.0);
        assert_relative_eq!(xs[1], 0.0);
        assert_relative_eq!(xs[2], 1.0);
    }

    #[test]
    fn unknown_characters_keep_their_advance() {
        let text = TextVisual::new("0 9", digits(), 2.0);
        let mut surface = RecordingSurface::new(10, 10);
        text.draw(&mut surface, YAxis::Down);
        let centers = image_centers(&surface);
        assert_eq!(centers.len(), 1);
        assert_relative_eq!(centers[0].x, -1.0);
        assert_eq!(text.extents().x, 3.0);
    }

    #[test]
    fn glyphs_take_the_text_color() {
        let text = TextVisual::new("1", digits(), 1.0).with_color(Color::RED);
        let glyph = &text.placed[0].raster;
        assert_eq!(glyph.pixel(0, 0), Some(Color::RED));
        assert_eq!(glyph.pixel(1, 1).map(|c| c.alpha()), Some(0));
    }

    #[test]
    fn missing_atlas_draws_placeholders() {
        let text = TextVisual::load("ab", "no/such/font.png", 16, 6, 8, 8, DEFAULT_FONT_SIZE);
        assert!(text.fallback_reason().unwrap().contains("no/such/font.png"));
        let mut surface = RecordingSurface::new(10, 10);
        text.draw(&mut surface, YAxis::Up);
        assert_eq!(image_centers(&surface).len(), 2);
        assert_eq!(surface.depth(), 0);
    }

    #[test]
    fn set_text_relays_out() {
        let mut text = TextVisual::new("0", digits(), 1.0);
        text.set_text("0123");
        assert_eq!(text.text(), "0123");
        assert_eq!(text.placed.len(), 4);
        assert_eq!(text.extents(), Vec2::new(2.0, 1.0));
    }
}
