pub mod entity;
pub mod shape;
pub mod sprite;
pub mod svg;
pub mod text;

pub use entity::{Entity, HasOpacity, Invisible, PhysicsBody, Playback, Visual};
pub use shape::{circle, physics_shape, rectangle, square, triangle, ShapeVisual};
pub use sprite::SpriteVisual;
pub use svg::SvgVisual;
pub use text::{FontAtlas, TextVisual};
