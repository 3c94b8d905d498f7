pub mod camera;
pub mod canvas;
pub mod recorder;
pub mod traits;

pub use camera::{Camera, ViewTransform};
pub use canvas::{Canvas, ExportError};
pub use recorder::{DrawCommand, RecordingSurface};
pub use traits::{Style, Surface, TransformStack};
