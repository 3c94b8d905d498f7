//! Filled vector shapes backed by rigid bodies.

use glam::Vec2;

use crate::api::config::YAxis;
use crate::api::types::Color;
use crate::components::entity::{Entity, HasOpacity, Visual};
use crate::core::physics::{BodyDesc, ColliderShape, MassClass, Material};
use crate::renderer::traits::{Style, Surface};

/// Outline width used by the shape constructors, in world units.
pub const DEFAULT_STROKE_WEIGHT: f32 = 0.01;

/// Draws a collider shape with a fill and outline.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeVisual {
    shape: ColliderShape,
    style: Style,
    opacity: f32,
}

impl ShapeVisual {
    pub fn new(shape: ColliderShape, style: Style) -> Self {
        Self {
            shape,
            style,
            opacity: 1.0,
        }
    }

    pub fn shape(&self) -> &ColliderShape {
        &self.shape
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }
}

impl Visual for ShapeVisual {
    fn draw(&self, surface: &mut dyn Surface, _y_axis: YAxis) {
        let style = self.style.faded(self.opacity);
        match &self.shape {
            ColliderShape::Ball { radius } => surface.ellipse(Vec2::ZERO, Vec2::splat(*radius), &style),
            ColliderShape::Cuboid { half_width, half_height } => surface.rect(
                Vec2::ZERO,
                Vec2::new(2.0 * half_width, 2.0 * half_height),
                &style,
            ),
            ColliderShape::ConvexPolygon { points } => surface.polygon(points, &style),
        }
    }

    fn extents(&self) -> Vec2 {
        self.shape.extents(0.0)
    }

    fn as_opacity(&self) -> Option<&dyn HasOpacity> {
        Some(self)
    }

    fn as_opacity_mut(&mut self) -> Option<&mut dyn HasOpacity> {
        Some(self)
    }
}

impl HasOpacity for ShapeVisual {
    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }
}

fn default_style(fill: Color) -> Style {
    Style::filled(fill).with_stroke(Color::BLACK, DEFAULT_STROKE_WEIGHT)
}

/// A physics-backed entity drawing its own collider.
pub fn physics_shape(
    shape: ColliderShape,
    position: Vec2,
    mass: MassClass,
    material: Material,
    fill: Color,
) -> Entity {
    let visual = ShapeVisual::new(shape.clone(), default_style(fill));
    Entity::new(visual).with_body(
        BodyDesc::new(shape, mass)
            .with_position(position)
            .with_material(material),
    )
}

pub fn circle(position: Vec2, radius: f32, mass: MassClass, fill: Color) -> Entity {
    physics_shape(
        ColliderShape::Ball { radius },
        position,
        mass,
        Material::default(),
        fill,
    )
}

pub fn rectangle(position: Vec2, width: f32, height: f32, mass: MassClass, fill: Color) -> Entity {
    physics_shape(
        ColliderShape::rectangle(width, height),
        position,
        mass,
        Material::default(),
        fill,
    )
}

pub fn square(position: Vec2, side: f32, mass: MassClass, fill: Color) -> Entity {
    rectangle(position, side, side, mass, fill)
}

/// Vertices of an equilateral triangle centered on its centroid, apex up.
pub fn equilateral_triangle_points(side: f32) -> Vec<Vec2> {
    let h = side * 3.0_f32.sqrt() / 2.0;
    vec![
        Vec2::new(0.0, 2.0 * h / 3.0),
        Vec2::new(-side / 2.0, -h / 3.0),
        Vec2::new(side / 2.0, -h / 3.0),
    ]
}

pub fn triangle(position: Vec2, side: f32, mass: MassClass, fill: Color) -> Entity {
    physics_shape(
        ColliderShape::ConvexPolygon {
            points: equilateral_triangle_points(side),
        },
        position,
        mass,
        Material::default(),
        fill,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::recorder::{DrawCommand, RecordingSurface};
    use approx::assert_relative_eq;

    #[test]
    fn triangle_centroid_is_origin() {
        let points = equilateral_triangle_points(1.0);
        let centroid: Vec2 = points.iter().copied().sum::<Vec2>() / 3.0;
        assert_relative_eq!(centroid.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(centroid.y, 0.0, epsilon = 1e-6);
        let side = points[1].distance(points[2]);
        assert_relative_eq!(side, points[0].distance(points[1]), epsilon = 1e-5);
    }

    #[test]
    fn circle_entity_carries_body_and_style() {
        let e = circle(Vec2::new(1.0, 2.0), 0.5, MassClass::Dynamic, Color::RED);
        assert_eq!(e.position(), Vec2::new(1.0, 2.0));
        let desc = e.body().unwrap().desc();
        assert_eq!(desc.shape, ColliderShape::Ball { radius: 0.5 });
        assert_eq!(desc.material, Material::default());
        assert_eq!(e.opacity(), Some(1.0));
    }

    #[test]
    fn draw_fades_style_by_opacity() {
        let mut visual = ShapeVisual::new(
            ColliderShape::rectangle(1.0, 2.0),
            default_style(Color::BLUE),
        );
        visual.set_opacity(0.0);
        let mut surface = RecordingSurface::new(10, 10);
        visual.draw(&mut surface, YAxis::Up);
        match &surface.commands()[0] {
            DrawCommand::Rect { size, style, .. } => {
                assert_eq!(*size, Vec2::new(1.0, 2.0));
                assert_eq!(style.fill.unwrap().alpha(), 0);
                assert_eq!(style.stroke_weight, DEFAULT_STROKE_WEIGHT);
            }
            other => panic!("expected Rect, got {other:?}"),
        }
    }

    #[test]
    fn opacity_is_clamped() {
        let mut visual = ShapeVisual::new(ColliderShape::Ball { radius: 1.0 }, Style::default());
        visual.set_opacity(1.5);
        assert_eq!(visual.opacity(), 1.0);
        visual.set_opacity(-1.0);
        assert_eq!(visual.opacity(), 0.0);
    }
}
