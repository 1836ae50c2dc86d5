use std::sync::Arc;

use once_cell::sync::Lazy;
use tiny_skia::{Color, Pixmap, Transform};

use crate::config::CanvasSize;
use crate::error::{InsightsError, Result};

/// 100 dots per inch, expressed per metre for the pHYs chunk.
const PIXELS_PER_METRE: u32 = 3937;

static FONTS: Lazy<Arc<usvg::fontdb::Database>> = Lazy::new(|| {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    tracing::debug!(faces = db.len(), "loaded chart fonts");
    Arc::new(db)
});

pub fn svg_to_png(svg: &str, size: CanvasSize) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb = FONTS.clone();
    let tree = usvg::Tree::from_str(svg, &options).map_err(InsightsError::render)?;

    let mut pixmap = Pixmap::new(size.width, size.height).ok_or_else(|| {
        InsightsError::RenderFailure(format!("invalid canvas {}x{}", size.width, size.height))
    })?;
    pixmap.fill(Color::WHITE);
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    encode_png(&pixmap)
}

fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }

    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: PIXELS_PER_METRE,
            yppu: PIXELS_PER_METRE,
            unit: png::Unit::Meter,
        }));
        encoder
            .write_header()
            .map_err(InsightsError::render)?
            .write_image_data(&rgba)
            .map_err(InsightsError::render)?;
    }
    Ok(buffer)
}
