//! Barcode symbologies for label rendering
//!
//! Encodes Code 39, Code 128, GS1 DataMatrix (ECC 200) and QR symbols as
//! grayscale images ready for pasting onto a label canvas. Every encoder
//! returns an explicit outcome: either a rendered symbol or a skip with the
//! reason, so the layout can leave the slot blank instead of aborting.

use barcoders::sym::code128::Code128;
use barcoders::sym::code39::Code39;
use datamatrix::{DataMatrix, SymbolList};
use image::{GrayImage, Luma};
use qrcode::{EcLevel, QrCode};
use tracing::debug;

use crate::dates;
use crate::fields::DodLabelFields;

/// GS1 group separator placed after variable-length elements
pub const GS: char = '\u{1d}';

/// Code 128 payloads are capped to keep the symbol scannable on small labels
pub const CODE128_MAX_LEN: usize = 20;

/// Why a symbol was not produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Input was empty or a placeholder
    EmptyInput,
    /// The symbology rejected the payload
    UnsupportedData(String),
}

/// Result of an encode attempt
#[derive(Debug)]
pub enum EncodeOutcome {
    Encoded(GrayImage),
    Skipped(SkipReason),
}

impl EncodeOutcome {
    pub fn image(&self) -> Option<&GrayImage> {
        match self {
            EncodeOutcome::Encoded(img) => Some(img),
            EncodeOutcome::Skipped(_) => None,
        }
    }

    pub fn is_encoded(&self) -> bool {
        matches!(self, EncodeOutcome::Encoded(_))
    }
}

/// Render a linear module pattern as a grayscale image with quiet zones
fn render_linear(modules: &[u8], module_px: u32, height_px: u32) -> GrayImage {
    let quiet = 10 * module_px;
    let width = modules.len() as u32 * module_px + 2 * quiet;
    let mut img = GrayImage::from_pixel(width, height_px, Luma([255u8]));
    for (i, &module) in modules.iter().enumerate() {
        if module == 1 {
            let x0 = quiet + i as u32 * module_px;
            for dx in 0..module_px {
                for y in 0..height_px {
                    img.put_pixel(x0 + dx, y, Luma([0u8]));
                }
            }
        }
    }
    img
}

/// Encode a 9-character NIIN as Code 39 without a checksum. Payloads are
/// reduced to their ASCII digits and coerced to exactly nine characters by
/// left-zero-padding or truncation.
pub fn code39_niin(niin: &str, module_px: u32, height_px: u32) -> EncodeOutcome {
    let trimmed = niin.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return EncodeOutcome::Skipped(SkipReason::EmptyInput);
    }
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        debug!("Code 39 rejected '{}': no digits", trimmed);
        return EncodeOutcome::Skipped(SkipReason::UnsupportedData(trimmed.to_string()));
    }
    let padded = format!("{:0>9}", digits);
    let payload = &padded[padded.len() - 9..];

    match Code39::new(payload) {
        Ok(barcode) => {
            let encoded = barcode.encode();
            EncodeOutcome::Encoded(render_linear(&encoded, module_px, height_px))
        }
        Err(e) => {
            debug!("Code 39 rejected '{}': {}", payload, e);
            EncodeOutcome::Skipped(SkipReason::UnsupportedData(payload.to_string()))
        }
    }
}

/// Encode a value as Code 128 in character set B, truncated to
/// [`CODE128_MAX_LEN`]. Empty or placeholder input is skipped.
pub fn code128(data: &str, module_px: u32, height_px: u32) -> EncodeOutcome {
    let trimmed = data.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return EncodeOutcome::Skipped(SkipReason::EmptyInput);
    }
    let payload: String = trimmed.chars().take(CODE128_MAX_LEN).collect();

    // Set B prefix: widest printable character range
    let prefixed = format!("\u{0181}{}", payload);
    match Code128::new(&prefixed) {
        Ok(barcode) => {
            let encoded = barcode.encode();
            EncodeOutcome::Encoded(render_linear(&encoded, module_px, height_px))
        }
        Err(e) => {
            debug!("Code 128 rejected '{}': {}", payload, e);
            EncodeOutcome::Skipped(SkipReason::UnsupportedData(payload))
        }
    }
}

/// Assemble the GS1 element string for the DataMatrix: AI 7001 (NATO stock
/// number), AI 10 (batch, capped at 20), AI 17 (expiry YYMMDD). Group
/// separators follow the variable-length elements only.
pub fn gs1_payload(fields: &DodLabelFields, expiry: Option<chrono::NaiveDate>) -> String {
    let batch: String = fields.batch_lot_no.chars().take(20).collect();
    format!(
        "7001{}{}10{}{}17{}",
        fields.nsn13(),
        GS,
        batch,
        GS,
        dates::gs1_expiry(expiry)
    )
}

/// Encode a GS1 payload as an ECC 200 DataMatrix with a 2-module quiet zone
pub fn gs1_datamatrix(payload: &str, module_px: u32) -> EncodeOutcome {
    if payload.is_empty() {
        return EncodeOutcome::Skipped(SkipReason::EmptyInput);
    }
    let encoded = match DataMatrix::encode(payload.as_bytes(), SymbolList::default()) {
        Ok(encoded) => encoded,
        Err(e) => {
            debug!("DataMatrix rejected payload: {:?}", e);
            return EncodeOutcome::Skipped(SkipReason::UnsupportedData(payload.to_string()));
        }
    };

    let bitmap = encoded.bitmap();
    let quiet = 2u32;
    let width = (bitmap.width() as u32 + 2 * quiet) * module_px;
    let height = (bitmap.height() as u32 + 2 * quiet) * module_px;
    let mut img = GrayImage::from_pixel(width, height, Luma([255u8]));

    for (x, y) in bitmap.pixels() {
        let x0 = (x as u32 + quiet) * module_px;
        let y0 = (y as u32 + quiet) * module_px;
        for dx in 0..module_px {
            for dy in 0..module_px {
                img.put_pixel(x0 + dx, y0 + dy, Luma([0u8]));
            }
        }
    }
    EncodeOutcome::Encoded(img)
}

/// Encode a QR symbol at error correction level L, scaled to roughly
/// `target_px` wide with a 2-module border
pub fn qr_code(data: &str, target_px: u32) -> EncodeOutcome {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return EncodeOutcome::Skipped(SkipReason::EmptyInput);
    }
    let code = match QrCode::with_error_correction_level(trimmed.as_bytes(), EcLevel::L) {
        Ok(code) => code,
        Err(e) => {
            debug!("QR rejected payload: {}", e);
            return EncodeOutcome::Skipped(SkipReason::UnsupportedData(trimmed.to_string()));
        }
    };

    let modules = code.to_colors();
    let module_count = code.width() as u32;
    let border = 2u32;
    let scale = (target_px / (module_count + 2 * border)).max(1);
    let img_size = (module_count + 2 * border) * scale;

    let mut img = GrayImage::from_pixel(img_size, img_size, Luma([255u8]));
    for (i, color) in modules.iter().enumerate() {
        let x = (i as u32) % module_count + border;
        let y = (i as u32) / module_count + border;
        if *color == qrcode::Color::Dark {
            for dx in 0..scale {
                for dy in 0..scale {
                    img.put_pixel(x * scale + dx, y * scale + dy, Luma([0u8]));
                }
            }
        }
    }
    EncodeOutcome::Encoded(img)
}
