//! Drawing surface abstraction.
//!
//! A [`Surface`] is an immediate-mode 2D target with a transform stack in the
//! style of Processing: shapes are given in the current local frame and the
//! surface maps them through the accumulated transform to pixels.

use glam::{Affine2, Vec2};

use crate::api::types::Color;
use crate::assets::raster::Raster;

/// Fill and outline for a shape. `None` disables that part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    /// Outline width in local units.
    pub stroke_weight: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Some(Color::WHITE),
            stroke: Some(Color::BLACK),
            stroke_weight: 0.01,
        }
    }
}

impl Style {
    pub fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
            stroke_weight: 0.0,
        }
    }

    pub fn with_stroke(mut self, color: Color, weight: f32) -> Self {
        self.stroke = Some(color);
        self.stroke_weight = weight;
        self
    }

    pub fn without_stroke(mut self) -> Self {
        self.stroke = None;
        self
    }

    /// Multiply both fill and stroke alpha by `opacity`.
    pub fn faded(self, opacity: f32) -> Self {
        Self {
            fill: self.fill.map(|c| c.fade(opacity)),
            stroke: self.stroke.map(|c| c.fade(opacity)),
            ..self
        }
    }
}

/// An immediate-mode drawing target.
pub trait Surface {
    /// Size in pixels.
    fn size(&self) -> Vec2;

    /// Start a frame. The transform stack is reset to identity.
    fn begin_frame(&mut self);

    /// Clear the whole surface to `color`, ignoring the transform.
    fn set_background(&mut self, color: Color);

    fn push_transform(&mut self);
    fn pop_transform(&mut self);
    fn translate(&mut self, offset: Vec2);
    /// Rotate the local frame by `angle` radians.
    fn rotate(&mut self, angle: f32);
    fn scale(&mut self, factor: Vec2);

    fn ellipse(&mut self, center: Vec2, radii: Vec2, style: &Style);
    /// Axis-aligned rectangle centered on `center` in the local frame.
    fn rect(&mut self, center: Vec2, size: Vec2, style: &Style);
    /// Closed polygon through `points`.
    fn polygon(&mut self, points: &[Vec2], style: &Style);
    /// Draw `raster` stretched over the local rectangle. Row 0 lands on the local -Y edge.
    fn image(&mut self, raster: &Raster, center: Vec2, size: Vec2, opacity: f32);

    fn end_frame(&mut self);
}

/// Affine transform stack shared by the surface implementations.
#[derive(Debug, Clone, Default)]
pub struct TransformStack {
    current: Affine2,
    saved: Vec<Affine2>,
}

impl TransformStack {
    pub fn current(&self) -> Affine2 {
        self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn reset(&mut self) {
        self.current = Affine2::IDENTITY;
        self.saved.clear();
    }

    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    pub fn pop(&mut self) {
        match self.saved.pop() {
            Some(t) => self.current = t,
            None => log::warn!("pop_transform without matching push"),
        }
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.current = self.current * Affine2::from_translation(offset);
    }

    pub fn rotate(&mut self, angle: f32) {
        self.current = self.current * Affine2::from_angle(angle);
    }

    pub fn scale(&mut self, factor: Vec2) {
        self.current = self.current * Affine2::from_scale(factor);
    }

    /// Average linear scale of the current transform.
    pub fn linear_scale(&self) -> f32 {
        self.current.matrix2.determinant().abs().sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn stack_composes_in_call_order() {
        let mut stack = TransformStack::default();
        stack.translate(Vec2::new(400.0, 300.0));
        stack.scale(Vec2::new(100.0, -100.0));
        let p = stack.current().transform_point2(Vec2::new(1.0, 1.0));
        assert_relative_eq!(p.x, 500.0);
        assert_relative_eq!(p.y, 200.0);
        assert_relative_eq!(stack.linear_scale(), 100.0);
    }

    #[test]
    fn push_pop_restores() {
        let mut stack = TransformStack::default();
        stack.push();
        stack.rotate(1.0);
        assert_eq!(stack.depth(), 1);
        stack.pop();
        assert_eq!(stack.current(), Affine2::IDENTITY);
        // Unbalanced pop keeps the current transform.
        stack.translate(Vec2::X);
        stack.pop();
        assert_eq!(stack.current(), Affine2::from_translation(Vec2::X));
    }

    #[test]
    fn faded_style_scales_alpha() {
        let style = Style::filled(Color::RED).with_stroke(Color::BLACK, 0.01).faded(0.5);
        assert_eq!(style.fill.unwrap().alpha(), 128);
        assert_eq!(style.stroke.unwrap().alpha(), 128);
    }
}
