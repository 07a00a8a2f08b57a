//! GHS drum label layout engine
//!
//! Renders the A5 chemical drum label: company header, product name, a
//! grey-grid information table, GHS pictogram row, hazard and precautionary
//! statement blocks, storage instructions, an emergency contact block with a
//! red header, and a Code 128 plus QR footer.

use image::RgbImage;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::barcodes;
use crate::draw;
use crate::error::Result;
use crate::fields::LabelRecord;
use crate::fonts::FontSet;
use crate::geometry::{FontSizes, Geometry, LabelSize};

/// Maximum pictograms rendered on one label
const MAX_PICTOGRAMS: usize = 5;

/// Issuer identity printed in the label header
#[derive(Debug, Clone)]
pub struct CompanyInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl Default for CompanyInfo {
    fn default() -> CompanyInfo {
        CompanyInfo {
            name: "Valorem Chemicals Pty Ltd".to_string(),
            address: "Sydney NSW, Australia".to_string(),
            phone: "+61 2 9000 0000".to_string(),
        }
    }
}

/// Render configuration for drum labels
#[derive(Debug, Clone)]
pub struct DrumProfile {
    pub size: LabelSize,
    pub dpi: u32,
    pub margin_mm: f64,
    pub company: CompanyInfo,
    /// Folder holding GHS pictogram PNGs named by code (GHS02.png, ...)
    pub pictogram_dir: Option<PathBuf>,
    pub font_regular: Option<PathBuf>,
    pub font_bold: Option<PathBuf>,
}

impl DrumProfile {
    pub fn new(dpi: u32) -> DrumProfile {
        DrumProfile {
            size: LabelSize::A5,
            dpi,
            margin_mm: 5.0,
            company: CompanyInfo::default(),
            pictogram_dir: None,
            font_regular: None,
            font_bold: None,
        }
    }
}

/// Normalized field set for a drum label
#[derive(Debug, Clone)]
pub struct DrumLabelFields {
    pub product_name: String,
    pub product_code: String,
    pub batch_number: String,
    pub supplier: String,
    pub net_weight: String,
    pub gross_weight: String,
    pub un_number: String,
    pub proper_shipping_name: String,
    pub manufacture_date: String,
    pub expiry_date: String,
    pub ghs_pictograms: Vec<String>,
    pub hazard_statements: String,
    pub precautionary_statements: String,
    pub storage: String,
    pub emergency_contact: String,
    pub qr_data: String,
}

impl DrumLabelFields {
    pub fn from_record(record: &LabelRecord) -> DrumLabelFields {
        let product_code = record.cleaned("product_code", "-");
        let batch_number = record.cleaned("batch_number", "-");
        let manufacture_date = record.cleaned("manufacture_date", "-");

        let qr_data = {
            let explicit = record.cleaned("qr_data", "");
            if explicit.is_empty() {
                format!("{}|{}|{}", product_code, batch_number, manufacture_date)
            } else {
                explicit
            }
        };

        let ghs_pictograms = record
            .cleaned("ghs_pictograms", "")
            .split([',', '|'])
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .take(MAX_PICTOGRAMS)
            .collect();

        DrumLabelFields {
            product_name: record.cleaned("product_name", "N/A"),
            product_code,
            batch_number,
            supplier: record.cleaned("supplier", "-"),
            net_weight: record.cleaned("net_weight", "-"),
            gross_weight: record.cleaned("gross_weight", "-"),
            un_number: record.cleaned("un_number", "-"),
            proper_shipping_name: record.cleaned("proper_shipping_name", "-"),
            manufacture_date,
            expiry_date: record.cleaned("expiry_date", "-"),
            ghs_pictograms,
            hazard_statements: record.cleaned("hazard_statements", "-"),
            precautionary_statements: record.cleaned("precautionary_statements", "-"),
            storage: record.cleaned("storage", "-"),
            emergency_contact: record.cleaned("emergency_contact", "-"),
            qr_data,
        }
    }
}

/// Layout engine for GHS drum labels
pub struct DrumLabelEngine {
    geometry: Geometry,
    fonts: FontSet,
    sizes: FontSizes,
    margin_px: u32,
    company: CompanyInfo,
    pictogram_dir: Option<PathBuf>,
}

impl DrumLabelEngine {
    pub fn new(profile: &DrumProfile) -> Result<DrumLabelEngine> {
        let geometry = Geometry::new(profile.size, profile.dpi);
        let (w_mm, h_mm) = profile.size.dimensions_mm();
        let sizes = FontSizes::for_label(w_mm, h_mm, profile.dpi);
        let fonts = FontSet::load(
            profile.font_regular.as_deref(),
            profile.font_bold.as_deref(),
        )?;
        Ok(DrumLabelEngine {
            margin_px: geometry.px(profile.margin_mm),
            geometry,
            fonts,
            sizes,
            company: profile.company.clone(),
            pictogram_dir: profile.pictogram_dir.clone(),
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn render(&self, fields: &DrumLabelFields) -> RgbImage {
        let g = &self.geometry;
        let mut img = RgbImage::from_pixel(g.canvas_w, g.canvas_h, draw::WHITE);

        draw::dashed_rect(
            &mut img,
            g.bleed as i32,
            g.bleed as i32,
            (g.bleed + g.label_w) as i32,
            (g.bleed + g.label_h) as i32,
            g.px(2.0),
            draw::CUT_LINE_GRAY,
        );

        let x_left = (g.bleed + self.margin_px) as i32;
        let x_right = (g.bleed + g.label_w - self.margin_px) as i32;
        let bottom = (g.bleed + g.label_h - self.margin_px) as i32;
        let center_x = (g.bleed + g.label_w / 2) as i32;
        let mut y = (g.bleed + self.margin_px) as i32;

        y = self.render_header(&mut img, center_x, x_left, x_right, y);

        draw::text_centered(
            &mut img,
            &self.fonts.bold,
            self.sizes.large,
            center_x,
            y,
            &fields.product_name,
            draw::BLACK,
        );
        y += self.sizes.large as i32 + g.px(3.0) as i32;

        y = self.render_info_grid(&mut img, fields, x_left, x_right, y);
        y = self.render_pictograms(&mut img, fields, x_left, y);
        y = self.render_statements(&mut img, fields, x_left, x_right, y);
        y = self.render_storage(&mut img, fields, x_left, y);
        self.render_emergency(&mut img, fields, x_left, x_right, y);

        self.render_footer(&mut img, fields, x_left, x_right, bottom);

        img
    }

    fn render_header(&self, img: &mut RgbImage, center_x: i32, x_left: i32, x_right: i32, mut y: i32) -> i32 {
        let g = &self.geometry;
        draw::text_centered(
            img,
            &self.fonts.bold,
            self.sizes.header,
            center_x,
            y,
            &self.company.name,
            draw::BLACK,
        );
        y += self.sizes.header as i32 + g.px(1.0) as i32;
        draw::text_centered(
            img,
            &self.fonts.regular,
            self.sizes.small,
            center_x,
            y,
            &format!("{}  Ph: {}", self.company.address, self.company.phone),
            draw::BLACK,
        );
        y += self.sizes.small as i32 + g.px(1.0) as i32;
        draw::hline(img, x_left, x_right, y, 2, draw::BLACK);
        y + g.px(2.0) as i32
    }

    fn render_info_grid(
        &self,
        img: &mut RgbImage,
        fields: &DrumLabelFields,
        x_left: i32,
        x_right: i32,
        mut y: i32,
    ) -> i32 {
        let g = &self.geometry;
        let row_h = self.sizes.data as u32 + g.px(2.0);
        let table_w = (x_right - x_left) as u32;
        let col_split = x_left + g.px(45.0) as i32;

        let rows: [(&str, &str); 8] = [
            ("Product Code", &fields.product_code),
            ("Batch Number", &fields.batch_number),
            ("Supplier", &fields.supplier),
            ("Net Weight", &fields.net_weight),
            ("Gross Weight", &fields.gross_weight),
            ("UN Number", &fields.un_number),
            ("Date of Manufacture", &fields.manufacture_date),
            ("Expiry Date", &fields.expiry_date),
        ];

        for (label, value) in rows {
            draw::rect_outline(img, x_left, y, table_w, row_h, 1, draw::GRID_GRAY);
            draw::vline(img, col_split, y, y + row_h as i32, 1, draw::GRID_GRAY);
            let text_y = y + g.px(0.5) as i32;
            draw::text(
                img,
                &self.fonts.regular,
                self.sizes.small,
                x_left + g.px(1.5) as i32,
                text_y,
                label,
                draw::BLACK,
            );
            draw::text(
                img,
                &self.fonts.bold,
                self.sizes.data,
                col_split + g.px(1.5) as i32,
                text_y,
                value,
                draw::BLACK,
            );
            y += row_h as i32;
        }

        if fields.un_number != "-" && fields.proper_shipping_name != "-" {
            draw::text(
                img,
                &self.fonts.bold,
                self.sizes.small,
                x_left,
                y + g.px(1.0) as i32,
                &format!("UN {}: {}", fields.un_number, fields.proper_shipping_name),
                draw::BLACK,
            );
            y += self.sizes.small as i32 + g.px(2.0) as i32;
        }
        y + g.px(3.0) as i32
    }

    /// GHS pictograms loaded from the configured folder; a missing or
    /// unreadable file is logged and skipped
    fn render_pictograms(
        &self,
        img: &mut RgbImage,
        fields: &DrumLabelFields,
        x_left: i32,
        y: i32,
    ) -> i32 {
        let g = &self.geometry;
        if fields.ghs_pictograms.is_empty() {
            return y;
        }
        let Some(dir) = &self.pictogram_dir else {
            debug!("No pictogram folder configured, skipping pictogram row");
            return y;
        };

        let side = g.px(20.0);
        let mut x = x_left;
        let mut drawn = 0u32;
        for code in &fields.ghs_pictograms {
            let path = dir.join(format!("{}.png", code));
            match image::open(&path) {
                Ok(picto) => {
                    let resized = picto.resize_exact(side, side, image::imageops::FilterType::Triangle);
                    image::imageops::overlay(img, &resized.to_rgb8(), x as i64, y as i64);
                    x += side as i32 + g.px(2.0) as i32;
                    drawn += 1;
                }
                Err(e) => {
                    warn!("Pictogram {} unavailable ({}), skipped", path.display(), e);
                }
            }
        }
        if drawn == 0 {
            return y;
        }
        y + side as i32 + g.px(3.0) as i32
    }

    fn render_statements(
        &self,
        img: &mut RgbImage,
        fields: &DrumLabelFields,
        x_left: i32,
        _x_right: i32,
        mut y: i32,
    ) -> i32 {
        let g = &self.geometry;

        for (title, content) in [
            ("Hazard Statements", &fields.hazard_statements),
            ("Precautionary Statements", &fields.precautionary_statements),
        ] {
            if content.as_str() == "-" {
                continue;
            }
            draw::text(img, &self.fonts.bold, self.sizes.body, x_left, y, title, draw::BLACK);
            y += self.sizes.body as i32 + g.px(1.0) as i32;
            for statement in content.split('|') {
                let statement = statement.trim();
                if statement.is_empty() {
                    continue;
                }
                let bullet = format!("\u{2022} {}", statement);
                draw::text(
                    img,
                    &self.fonts.regular,
                    self.sizes.small,
                    x_left + g.px(2.0) as i32,
                    y,
                    &bullet,
                    draw::BLACK,
                );
                y += self.sizes.small as i32 + g.px(0.5) as i32;
            }
            y += g.px(2.0) as i32;
        }
        y
    }

    fn render_storage(&self, img: &mut RgbImage, fields: &DrumLabelFields, x_left: i32, mut y: i32) -> i32 {
        let g = &self.geometry;
        if fields.storage == "-" {
            return y;
        }
        draw::text(img, &self.fonts.bold, self.sizes.body, x_left, y, "Storage", draw::BLACK);
        y += self.sizes.body as i32 + g.px(1.0) as i32;
        draw::text(
            img,
            &self.fonts.regular,
            self.sizes.small,
            x_left,
            y,
            &fields.storage,
            draw::BLACK,
        );
        y + self.sizes.small as i32 + g.px(3.0) as i32
    }

    fn render_emergency(
        &self,
        img: &mut RgbImage,
        fields: &DrumLabelFields,
        x_left: i32,
        x_right: i32,
        mut y: i32,
    ) {
        let g = &self.geometry;
        if fields.emergency_contact == "-" {
            return;
        }
        let block_w = (x_right - x_left) as u32;
        let header_h = self.sizes.body as u32 + g.px(1.5);
        draw::rect_filled(img, x_left, y, block_w, header_h, draw::EMERGENCY_RED);
        draw::text(
            img,
            &self.fonts.bold,
            self.sizes.body,
            x_left + g.px(1.5) as i32,
            y + g.px(0.5) as i32,
            "EMERGENCY CONTACT",
            draw::WHITE,
        );
        y += header_h as i32 + g.px(1.0) as i32;
        draw::text(
            img,
            &self.fonts.regular,
            self.sizes.small,
            x_left,
            y,
            &fields.emergency_contact,
            draw::BLACK,
        );
    }

    /// Code 128 bottom-left, QR bottom-right
    fn render_footer(
        &self,
        img: &mut RgbImage,
        fields: &DrumLabelFields,
        x_left: i32,
        x_right: i32,
        bottom: i32,
    ) {
        let g = &self.geometry;
        let barcode_h = g.px(10.0);
        if let Some(code_payload) = footer_code_payload(fields) {
            match barcodes::code128(&code_payload, 2, barcode_h) {
                barcodes::EncodeOutcome::Encoded(symbol) => {
                    let fitted = draw::fit_within(&symbol, g.px(55.0), barcode_h);
                    draw::paste_gray(img, &fitted, x_left, bottom - fitted.height() as i32);
                }
                barcodes::EncodeOutcome::Skipped(reason) => {
                    debug!("Footer Code 128 skipped: {:?}", reason);
                }
            }
        } else {
            debug!("Footer Code 128 skipped: both components are placeholders");
        }

        let qr_side = g.px(25.0);
        match barcodes::qr_code(&fields.qr_data, qr_side) {
            barcodes::EncodeOutcome::Encoded(symbol) => {
                draw::paste_gray(
                    img,
                    &symbol,
                    x_right - symbol.width() as i32,
                    bottom - symbol.height() as i32,
                );
            }
            barcodes::EncodeOutcome::Skipped(reason) => {
                debug!("Footer QR skipped: {:?}", reason);
            }
        }
    }
}

/// Footer barcode payload, `None` when both components are placeholders
fn footer_code_payload(fields: &DrumLabelFields) -> Option<String> {
    if fields.product_code == "-" && fields.batch_number == "-" {
        return None;
    }
    Some(format!("{}{}", fields.product_code, fields.batch_number))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> LabelRecord {
        let mut record = LabelRecord::new();
        record.set("product_name", "Valorem Solvent 40");
        record.set("product_code", "VAL-S40");
        record.set("batch_number", "B240815");
        record.set("supplier", "Valorem Chemicals");
        record.set("net_weight", "180 kg");
        record.set("gross_weight", "195 kg");
        record.set("un_number", "1263");
        record.set("proper_shipping_name", "PAINT RELATED MATERIAL");
        record.set("manufacture_date", "15/08/2024");
        record.set("expiry_date", "15/08/2026");
        record.set("ghs_pictograms", "GHS02, GHS07");
        record.set("hazard_statements", "H226 Flammable liquid | H336 May cause drowsiness");
        record.set("precautionary_statements", "P210 Keep away from heat");
        record.set("storage", "Store below 30 C in a ventilated area");
        record.set("emergency_contact", "Poisons Information Centre 13 11 26");
        record
    }

    #[test]
    fn test_fields_qr_fallback() {
        let fields = DrumLabelFields::from_record(&sample_record());
        assert_eq!(fields.qr_data, "VAL-S40|B240815|15/08/2024");

        let mut record = sample_record();
        record.set("qr_data", "https://valoremchem.com.au/b/B240815");
        let fields = DrumLabelFields::from_record(&record);
        assert_eq!(fields.qr_data, "https://valoremchem.com.au/b/B240815");
    }

    #[test]
    fn test_fields_pictogram_list() {
        let fields = DrumLabelFields::from_record(&sample_record());
        assert_eq!(fields.ghs_pictograms, vec!["GHS02", "GHS07"]);

        let mut record = sample_record();
        record.set("ghs_pictograms", "a,b,c,d,e,f,g");
        let fields = DrumLabelFields::from_record(&record);
        assert_eq!(fields.ghs_pictograms.len(), MAX_PICTOGRAMS);
    }

    #[test]
    fn test_render_canvas_dimensions() {
        if !FontSet::available() {
            return;
        }
        let profile = DrumProfile::new(300);
        let engine = DrumLabelEngine::new(&profile).unwrap();
        let fields = DrumLabelFields::from_record(&sample_record());
        let img = engine.render(&fields);
        let g = engine.geometry();
        assert_eq!(img.width(), g.canvas_w);
        assert_eq!(img.height(), g.canvas_h);
    }

    #[test]
    fn test_footer_payload_skips_double_placeholder() {
        let fields = DrumLabelFields::from_record(&LabelRecord::new());
        assert_eq!(fields.product_code, "-");
        assert_eq!(fields.batch_number, "-");
        assert_eq!(footer_code_payload(&fields), None);

        let fields = DrumLabelFields::from_record(&sample_record());
        assert_eq!(footer_code_payload(&fields), Some("VAL-S40B240815".to_string()));
    }

    #[test]
    fn test_render_missing_pictogram_files() {
        if !FontSet::available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let mut profile = DrumProfile::new(300);
        profile.pictogram_dir = Some(dir.path().to_path_buf());
        let engine = DrumLabelEngine::new(&profile).unwrap();
        let fields = DrumLabelFields::from_record(&sample_record());
        // files absent: render continues without the pictogram row
        let img = engine.render(&fields);
        assert_eq!(img.width(), engine.geometry().canvas_w);
    }
}
