//! Output adapters: PNG with embedded print resolution, and single-page PDF
//!
//! The PNG path writes a pHYs chunk so print pipelines see the render DPI.
//! The PDF path creates one page sized exactly to the bled label in
//! millimetres and places the raster at the density that fills the page.

use image::RgbImage;
use printpdf::{ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px};
use std::path::Path;

use crate::error::{LabelError, Result, ResultExt};

/// Supported output file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Pdf,
}

impl OutputFormat {
    pub fn from_key(key: &str) -> Result<OutputFormat> {
        match key.trim().to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(LabelError::UnsupportedFormat {
                format: other.to_string(),
            }
            .into()),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
        }
    }
}

/// Encode the canvas as PNG with a pHYs chunk carrying the render DPI
pub fn encode_png(img: &RgbImage, dpi: u32) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, img.width(), img.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);

        // pHYs stores pixels per metre
        let ppm = (dpi as f64 / 0.0254).round() as u32;
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));

        let mut writer = encoder.write_header()?;
        writer.write_image_data(img.as_raw())?;
    }
    Ok(buf)
}

/// Encode the canvas as a single-page PDF. The page matches the canvas
/// millimetre dimensions and the raster is placed at the density that maps
/// its pixel width onto the full page width.
pub fn encode_pdf(img: &RgbImage, page_w_mm: f64, page_h_mm: f64, title: &str) -> Result<Vec<u8>> {
    let (doc, page, layer) =
        PdfDocument::new(title, Mm(page_w_mm as f32), Mm(page_h_mm as f32), "Layer 1");
    let current_layer = doc.get_page(page).get_layer(layer);

    let xobject = ImageXObject {
        width: Px(img.width() as usize),
        height: Px(img.height() as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: img.as_raw().clone(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    };
    let image = Image::from(xobject);

    let fill_dpi = img.width() as f32 / (page_w_mm as f32 / 25.4);
    image.add_to_layer(
        current_layer,
        ImageTransform {
            translate_x: Some(Mm(0.0)),
            translate_y: Some(Mm(0.0)),
            dpi: Some(fill_dpi),
            ..Default::default()
        },
    );

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| anyhow::anyhow!("PDF serialization failed: {}", e))?;
    Ok(bytes)
}

/// Write an encoded output buffer to disk
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_path_context("write", path)
}
