//! Decoded bitmaps and sprite-sheet slicing.

use std::path::Path;

use tiny_skia::{ColorU8, Pixmap};

use crate::api::types::Color;

/// Errors raised while decoding or slicing an image asset.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to decode image bytes: {0}")]
    DecodeBytes(#[from] image::ImageError),
    #[error("invalid sprite sheet: {0}")]
    InvalidSheet(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid svg: {0}")]
    Svg(String),
}

/// An ARGB bitmap, row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Raster {
    /// A bitmap filled with one color.
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width as usize) * (height as usize)],
        }
    }

    /// Wrap existing pixels. Returns `None` if the length does not match.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Option<Self> {
        (pixels.len() == (width as usize) * (height as usize)).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    fn from_rgba(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.pixels().map(|p| Color::from_rgba8(p.0)).collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Copy out the `width`×`height` region starting at (`x`, `y`).
    pub fn sub_image(&self, x: u32, y: u32, width: u32, height: u32) -> Option<Raster> {
        if x.checked_add(width)? > self.width || y.checked_add(height)? > self.height {
            return None;
        }
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for row in y..y + height {
            let start = row as usize * self.width as usize + x as usize;
            pixels.extend_from_slice(&self.pixels[start..start + width as usize]);
        }
        Some(Raster {
            width,
            height,
            pixels,
        })
    }

    /// Cut `total_frames` frames of `frame_width`×`frame_height` out of a grid
    /// with `columns` frames per row, reading left to right then top to bottom.
    pub fn slice_sheet(
        &self,
        columns: u32,
        total_frames: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Vec<Raster>, AssetError> {
        if columns == 0 || total_frames == 0 || frame_width == 0 || frame_height == 0 {
            return Err(AssetError::InvalidSheet(format!(
                "{columns} columns, {total_frames} frames of {frame_width}x{frame_height}"
            )));
        }
        (0..total_frames)
            .map(|i| {
                let x = (i % columns) * frame_width;
                let y = (i / columns) * frame_height;
                self.sub_image(x, y, frame_width, frame_height).ok_or_else(|| {
                    AssetError::InvalidSheet(format!(
                        "frame {i} at ({x}, {y}) lies outside the {}x{} sheet",
                        self.width, self.height
                    ))
                })
            })
            .collect()
    }

    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_rgba8()).collect()
    }

    /// Read back a premultiplied pixmap as straight-alpha ARGB.
    pub fn from_pixmap(pixmap: &Pixmap) -> Self {
        let pixels = pixmap
            .pixels()
            .iter()
            .map(|p| {
                let c = p.demultiply();
                Color::argb(c.alpha(), c.red(), c.green(), c.blue())
            })
            .collect();
        Self {
            width: pixmap.width(),
            height: pixmap.height(),
            pixels,
        }
    }

    /// Premultiplied copy for drawing with tiny-skia. `None` for an empty raster.
    pub fn to_pixmap(&self) -> Option<Pixmap> {
        let mut pixmap = Pixmap::new(self.width, self.height)?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(&self.pixels) {
            *dst = ColorU8::from_rgba(src.red(), src.green(), src.blue(), src.alpha()).premultiply();
        }
        Some(pixmap)
    }

    /// Replace every pixel's RGB with `tint`, scaling alpha by the tint's alpha.
    pub fn tinted(&self, tint: Color) -> Raster {
        let pixels = self
            .pixels
            .iter()
            .map(|p| tint.with_opacity(p.opacity() * tint.opacity()))
            .collect();
        Raster {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

/// Decode an image file (PNG) into a [`Raster`].
pub fn decode_file(path: impl AsRef<Path>) -> Result<Raster, AssetError> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| AssetError::Decode {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Raster::from_rgba(img.to_rgba8()))
}

/// Decode in-memory image bytes into a [`Raster`].
pub fn decode_bytes(bytes: &[u8]) -> Result<Raster, AssetError> {
    Ok(Raster::from_rgba(image::load_from_memory(bytes)?.to_rgba8()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: u32, height: u32) -> Raster {
        let pixels = (0..width * height).map(Color).collect();
        Raster::from_pixels(width, height, pixels).unwrap()
    }

    #[test]
    fn from_pixels_checks_length() {
        assert!(Raster::from_pixels(2, 2, vec![Color::RED; 3]).is_none());
        assert!(Raster::from_pixels(2, 2, vec![Color::RED; 4]).is_some());
    }

    #[test]
    fn sub_image_copies_region() {
        let r = numbered(4, 3);
        let sub = r.sub_image(1, 1, 2, 2).unwrap();
        assert_eq!(sub.pixels(), &[Color(5), Color(6), Color(9), Color(10)]);
        assert!(r.sub_image(3, 0, 2, 1).is_none());
    }

    #[test]
    fn sheet_slices_row_major() {
        // 2 columns of 2x1 frames, 2 rows
        let sheet = numbered(4, 2);
        let frames = sheet.slice_sheet(2, 3, 2, 1).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].pixels(), &[Color(0), Color(1)]);
        assert_eq!(frames[1].pixels(), &[Color(2), Color(3)]);
        assert_eq!(frames[2].pixels(), &[Color(4), Color(5)]);
    }

    #[test]
    fn sheet_rejects_out_of_bounds_frames() {
        let sheet = numbered(4, 2);
        assert!(matches!(
            sheet.slice_sheet(2, 5, 2, 1),
            Err(AssetError::InvalidSheet(_))
        ));
        assert!(sheet.slice_sheet(0, 1, 2, 1).is_err());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode_bytes(b"not a png"),
            Err(AssetError::DecodeBytes(_))
        ));
        let err = decode_file("does/not/exist.png").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.png"));
    }

    #[test]
    fn decode_png_bytes() {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 255, 128]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let raster = decode_bytes(&bytes).unwrap();
        assert_eq!(raster.pixel(0, 0), Some(Color::RED));
        assert_eq!(raster.pixel(1, 0), Some(Color::argb(128, 0, 0, 255)));
        assert_eq!(raster.pixel(2, 0), None);
    }

    #[test]
    fn pixmap_round_trip_keeps_straight_alpha() {
        let pixels = vec![Color::RED, Color::argb(0, 0, 0, 0), Color::BLUE, Color::WHITE];
        let raster = Raster::from_pixels(2, 2, pixels).unwrap();
        let pixmap = raster.to_pixmap().unwrap();
        assert_eq!(Raster::from_pixmap(&pixmap), raster);
        assert!(Raster::solid(0, 3, Color::RED).to_pixmap().is_none());
    }

    #[test]
    fn tint_keeps_alpha_mask() {
        let mask = Raster::from_pixels(2, 1, vec![Color::WHITE, Color::TRANSPARENT]).unwrap();
        let red = mask.tinted(Color::RED);
        assert_eq!(red.pixel(0, 0), Some(Color::RED));
        assert_eq!(red.pixel(1, 0).map(Color::alpha), Some(0));
    }
}
