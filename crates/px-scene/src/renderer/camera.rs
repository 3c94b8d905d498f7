use glam::{Affine2, Vec2};

use crate::api::config::YAxis;
use crate::renderer::traits::Surface;

/// 2D view: a world-space center and a scale in pixels per world unit.
/// The scale is always positive and finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    center: Vec2,
    scale: f32,
    viewport: Vec2,
    default_scale: f32,
}

impl Camera {
    pub fn new(viewport: Vec2, default_scale: f32) -> Self {
        let default_scale = if default_scale.is_finite() && default_scale > 0.0 {
            default_scale
        } else {
            1.0
        };
        Self {
            center: Vec2::ZERO,
            scale: default_scale,
            viewport,
            default_scale,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn default_scale(&self) -> f32 {
        self.default_scale
    }

    pub fn look_at(&mut self, target: Vec2) {
        self.center = target;
    }

    /// Set the zoom. Non-positive or non-finite values are ignored.
    pub fn set_scale(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.scale = scale;
        }
    }

    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    /// Center on the origin at the default scale.
    pub fn reset(&mut self) {
        self.center = Vec2::ZERO;
        self.scale = self.default_scale;
    }

    /// Frame the box `[min, max]` grown by `padding` (a fraction of its size).
    ///
    /// The scale is the smallest that fits every positive dimension. Returns
    /// `false` when neither dimension is positive; the scale then falls back
    /// to the default.
    pub fn fit_bounds(&mut self, min: Vec2, max: Vec2, padding: f32) -> bool {
        self.center = (min + max) / 2.0;
        let size = (max - min) * (1.0 + padding.max(0.0));
        let fit_x = (size.x > 0.0).then(|| self.viewport.x / size.x);
        let fit_y = (size.y > 0.0).then(|| self.viewport.y / size.y);
        let fit = match (fit_x, fit_y) {
            (Some(x), Some(y)) => Some(x.min(y)),
            (x, y) => x.or(y),
        };
        match fit.filter(|s| s.is_finite() && *s > 0.0) {
            Some(scale) => {
                self.scale = scale;
                true
            }
            None => {
                self.scale = self.default_scale;
                false
            }
        }
    }

    /// Frame one object of bounding `size` at `center`, leaving `margin` times its size visible.
    /// Returns `false` (and uses the default scale) when `size` is not positive.
    pub fn fit_object(&mut self, center: Vec2, size: f32, margin: f32) -> bool {
        self.center = center;
        let span = size * margin;
        let scale = self.viewport.x.min(self.viewport.y) / span;
        if size > 0.0 && scale.is_finite() && scale > 0.0 {
            self.scale = scale;
            true
        } else {
            self.scale = self.default_scale;
            false
        }
    }

    pub fn view(&self, y_axis: YAxis) -> ViewTransform {
        ViewTransform {
            center: self.center,
            scale: self.scale,
            half_viewport: self.viewport / 2.0,
            y_sign: y_axis.sign(),
        }
    }

    /// Push the world→pixel mapping onto `surface`'s current transform.
    pub fn apply(&self, surface: &mut dyn Surface, y_axis: YAxis) {
        surface.translate(self.viewport / 2.0);
        surface.scale(Vec2::new(self.scale, self.scale * y_axis.sign()));
        surface.translate(-self.center);
    }
}

/// Snapshot of a camera's world↔pixel mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    center: Vec2,
    scale: f32,
    half_viewport: Vec2,
    y_sign: f32,
}

impl ViewTransform {
    pub fn world_to_pixel(&self, world: Vec2) -> Vec2 {
        let d = world - self.center;
        self.half_viewport + Vec2::new(d.x * self.scale, d.y * self.scale * self.y_sign)
    }

    pub fn pixel_to_world(&self, pixel: Vec2) -> Vec2 {
        let d = pixel - self.half_viewport;
        self.center + Vec2::new(d.x / self.scale, d.y / (self.scale * self.y_sign))
    }

    /// On-screen rotation for a world angle. Y-up worlds negate it.
    pub fn pixel_angle(&self, world_angle: f32) -> f32 {
        world_angle * self.y_sign
    }

    pub fn to_affine(&self) -> Affine2 {
        Affine2::from_translation(self.half_viewport)
            * Affine2::from_scale(Vec2::new(self.scale, self.scale * self.y_sign))
            * Affine2::from_translation(-self.center)
    }
}
