pub mod api;
pub mod core;
pub mod components;
pub mod renderer;
pub mod assets;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::config::{ConfigError, SceneConfig, YAxis};
pub use api::diagnostics::{Diagnostic, DiagnosticSink, LogSink, NullSink, RecordingSink};
pub use api::runner::SceneRunner;
pub use api::types::{Color, EntityId, Pose};
pub use assets::raster::{AssetError, Raster};
pub use assets::svg::{rasterize_svg, rasterize_svg_file};
pub use components::entity::{Entity, HasOpacity, Invisible, Playback, Visual};
pub use components::shape::{circle, rectangle, square, triangle, ShapeVisual};
pub use components::sprite::SpriteVisual;
pub use components::svg::SvgVisual;
pub use components::text::{FontAtlas, TextVisual};
pub use core::physics::{BodyDesc, ColliderShape, MassClass, Material, PhysicsWorld};
pub use core::scene::Scene;
pub use core::time::FixedTimestep;
pub use renderer::camera::{Camera, ViewTransform};
pub use renderer::canvas::{Canvas, ExportError};
pub use renderer::recorder::{DrawCommand, RecordingSurface};
pub use renderer::traits::{Style, Surface};

pub use extensions::{
    Animation, Easing, lerp, lerp_vec2,
    Effect, EffectBehavior, EffectPhase,
    ActionKind, Sequence,
};
