pub mod raster;
pub mod svg;

pub use raster::{decode_bytes, decode_file, AssetError, Raster};
pub use svg::{rasterize_svg, rasterize_svg_file};
