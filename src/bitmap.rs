//! Pixel buffers and the handful of operations the cascade performs on them.

use image::imageops::{self, FilterType};
use image::{ImageReader, Rgba, RgbaImage};
use resvg::usvg;
use std::path::Path;

/// A decoded icon: 8-bit straight-alpha RGBA pixels.
pub type Bitmap = RgbaImage;

/// Colour of the last-resort placeholder swatch.
pub const PLACEHOLDER_FILL: Rgba<u8> = Rgba([0xee, 0x22, 0x11, 0x55]);

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read image file")]
    Io(#[from] std::io::Error),
    #[error("could not decode raster image")]
    Image(#[from] image::ImageError),
    #[error("could not parse svg document")]
    Svg(#[from] usvg::Error),
    #[error("svg document has empty dimensions")]
    EmptySvg,
}

/// Decode a raster image at its natural size. The format is guessed from the file's contents.
pub fn decode_raster(path: &Path) -> Result<Bitmap, LoadError> {
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;

    Ok(image.to_rgba8())
}

/// Rasterize an SVG file so that it fits a `size`×`size` box.
pub fn render_svg_file(path: &Path, size: u32) -> Result<Bitmap, LoadError> {
    let data = std::fs::read(path)?;

    render_svg(&data, size)
}

/// Rasterize an SVG document so that it fits a `size`×`size` box, keeping its aspect ratio.
pub fn render_svg(data: &[u8], size: u32) -> Result<Bitmap, LoadError> {
    let tree = usvg::Tree::from_data(data, &usvg::Options::default())?;

    let natural = tree.size();
    let (width, height) =
        fit_box(natural.width(), natural.height(), size).ok_or(LoadError::EmptySvg)?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or(LoadError::EmptySvg)?;
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / natural.width(),
        height as f32 / natural.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    // tiny-skia hands out premultiplied pixels
    let mut bitmap = RgbaImage::new(width, height);
    for (dst, src) in bitmap.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }

    Ok(bitmap)
}

/// Load any supported image file scaled to fit a `size`×`size` box, keeping its aspect ratio.
///
/// Unlike theme lookups, this scales raster images both up and down.
pub fn load_at_scale(path: &Path, size: u32) -> Result<Bitmap, LoadError> {
    let is_svg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

    if is_svg {
        return render_svg_file(path, size);
    }

    let bitmap = decode_raster(path)?;
    let (width, height) = bitmap.dimensions();

    match fit_box(width as f32, height as f32, size) {
        Some(target) if target != (width, height) => {
            Ok(imageops::resize(&bitmap, target.0, target.1, FilterType::Lanczos3))
        }
        _ => Ok(bitmap),
    }
}

/// Shrink a bitmap taller than `size` so that its height is exactly `size`.
///
/// Width follows proportionally. Bitmaps that already fit vertically are returned untouched,
/// even when they are wider than `size`; nothing is ever scaled up.
pub fn shrink_to_height(bitmap: Bitmap, size: u32) -> Bitmap {
    let (width, height) = bitmap.dimensions();

    if height <= size {
        return bitmap;
    }

    let new_width = (u64::from(width) * u64::from(size) / u64::from(height)).max(1);
    let new_width = u32::try_from(new_width).unwrap_or(u32::MAX);

    imageops::resize(&bitmap, new_width, size, FilterType::Lanczos3)
}

/// A `size`×`size` swatch of [`PLACEHOLDER_FILL`].
pub fn placeholder(size: u32) -> Bitmap {
    RgbaImage::from_pixel(size, size, PLACEHOLDER_FILL)
}

// Dimensions of a `width`×`height` image scaled to fit a `size`×`size` box.
fn fit_box(width: f32, height: f32, size: u32) -> Option<(u32, u32)> {
    if !(width > 0.0 && height > 0.0) || size == 0 {
        return None;
    }

    let scale = size as f32 / width.max(height);
    let scaled = |side: f32| ((side * scale).round() as u32).clamp(1, size);

    Some((scaled(width), scaled(height)))
}
