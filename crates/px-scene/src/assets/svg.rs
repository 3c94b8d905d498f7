//! SVG rasterization through usvg and resvg.

use std::path::Path;

use tiny_skia::{Pixmap, Transform};
use usvg::{Options, Tree};

use crate::assets::raster::{AssetError, Raster};

/// Render SVG source into a `width`×`height` raster.
///
/// The drawing is scaled to fit while keeping its aspect ratio and centered.
pub fn rasterize_svg(data: &[u8], width: u32, height: u32) -> Result<Raster, AssetError> {
    if width == 0 || height == 0 {
        return Err(AssetError::Svg(format!("cannot rasterize at {width}x{height}")));
    }
    let tree = Tree::from_data(data, &Options::default())
        .map_err(|e| AssetError::Svg(e.to_string()))?;
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| AssetError::Svg(format!("cannot allocate {width}x{height} pixmap")))?;

    let svg_size = tree.size();
    let scale = (width as f32 / svg_size.width()).min(height as f32 / svg_size.height());
    let offset_x = (width as f32 - svg_size.width() * scale) / 2.0;
    let offset_y = (height as f32 - svg_size.height() * scale) / 2.0;
    let transform = Transform::from_scale(scale, scale).post_translate(offset_x, offset_y);

    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(Raster::from_pixmap(&pixmap))
}

/// Read and rasterize an SVG file.
pub fn rasterize_svg_file(
    path: impl AsRef<Path>,
    width: u32,
    height: u32,
) -> Result<Raster, AssetError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| AssetError::Read {
        path: path.display().to_string(),
        source,
    })?;
    rasterize_svg(&data, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Color;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
        <rect x="0" y="0" width="10" height="5" fill="red"/>
        <rect x="0" y="5" width="10" height="5" fill="blue"/>
    </svg>"#;

    #[test]
    fn renders_at_requested_size() {
        let raster = rasterize_svg(SQUARE.as_bytes(), 20, 20).unwrap();
        assert_eq!((raster.width(), raster.height()), (20, 20));
        assert_eq!(raster.pixel(10, 2), Some(Color::RED));
        assert_eq!(raster.pixel(10, 17), Some(Color::BLUE));
    }

    #[test]
    fn wide_target_letterboxes() {
        let raster = rasterize_svg(SQUARE.as_bytes(), 40, 20).unwrap();
        assert_eq!(raster.pixel(2, 10).map(Color::alpha), Some(0));
        assert_eq!(raster.pixel(20, 2), Some(Color::RED));
    }

    #[test]
    fn bad_input_is_an_error() {
        assert!(matches!(
            rasterize_svg(b"<not svg", 8, 8),
            Err(AssetError::Svg(_))
        ));
        assert!(rasterize_svg(SQUARE.as_bytes(), 0, 8).is_err());
        let err = rasterize_svg_file("no/such/icon.svg", 8, 8).unwrap_err();
        assert!(err.to_string().contains("no/such/icon.svg"));
    }
}
