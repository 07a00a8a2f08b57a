//! DoD shipping label layout engine
//!
//! Renders a MIL-STD-129 style label with a sequential top-to-bottom cursor:
//! centered header, main border, NIIN barcode row with hazard box and GS1
//! DataMatrix, batch and use-by Code 128 rows, bordered information table,
//! safety markings block and an optional contractor block. Sub-elements that
//! cannot be produced leave their slot blank; a render never aborts.

use ab_glyph::FontVec;
use image::RgbImage;
use std::path::PathBuf;
use tracing::debug;

use crate::barcodes;
use crate::dates;
use crate::draw;
use crate::error::Result;
use crate::fields::{format_date_display, DodLabelFields};
use crate::fonts::FontSet;
use crate::geometry::{FontSizes, Geometry, LabelSize};

/// Render configuration shared by a batch of labels
#[derive(Debug, Clone)]
pub struct RenderProfile {
    pub size: LabelSize,
    pub dpi: u32,
    /// Inner margin between the label edge and content, in millimetres
    pub margin_mm: f64,
    /// Explicit font overrides; system fonts are searched when absent
    pub font_regular: Option<PathBuf>,
    pub font_bold: Option<PathBuf>,
}

impl RenderProfile {
    pub fn new(size: LabelSize, dpi: u32) -> RenderProfile {
        RenderProfile {
            size,
            dpi,
            margin_mm: 3.0,
            font_regular: None,
            font_bold: None,
        }
    }
}

/// Layout engine for DoD shipping labels. Fonts are loaded once at
/// construction; each render is a pure function of one field set.
pub struct LabelEngine {
    geometry: Geometry,
    fonts: FontSet,
    sizes: FontSizes,
    margin_px: u32,
}

impl LabelEngine {
    pub fn new(profile: &RenderProfile) -> Result<LabelEngine> {
        let geometry = Geometry::new(profile.size, profile.dpi);
        let (w_mm, h_mm) = profile.size.dimensions_mm();
        let sizes = FontSizes::for_label(w_mm, h_mm, profile.dpi);
        let fonts = FontSet::load(
            profile.font_regular.as_deref(),
            profile.font_bold.as_deref(),
        )?;
        Ok(LabelEngine {
            margin_px: geometry.px(profile.margin_mm),
            geometry,
            fonts,
            sizes,
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Render one label to an RGB canvas sized label-plus-bleed
    pub fn render(&self, fields: &DodLabelFields) -> RgbImage {
        let g = &self.geometry;
        let mut img = RgbImage::from_pixel(g.canvas_w, g.canvas_h, draw::WHITE);

        // Trim cut line around the printable area
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
        let border_bottom = (g.bleed + g.label_h - self.margin_px) as i32;
        let center_x = (g.bleed + g.label_w / 2) as i32;
        let mut y = (g.bleed + self.margin_px) as i32;

        let bold = &self.fonts.bold;

        // Header: product description and stock number, centered
        draw::text_centered(
            &mut img,
            bold,
            self.sizes.large,
            center_x,
            y,
            &fields.product_description,
            draw::BLACK,
        );
        y += self.sizes.large as i32 + g.px(2.0) as i32;

        draw::text_centered(
            &mut img,
            bold,
            self.sizes.header,
            center_x,
            y,
            &format!("NSN: {}", fields.nato_stock_no),
            draw::BLACK,
        );
        y += self.sizes.header as i32 + g.px(3.0) as i32;

        // Main content border
        let border_x = x_left - g.px(3.0) as i32;
        let border_w = (x_right + g.px(3.0) as i32 - border_x) as u32;
        let border_h = (border_bottom - y).max(0) as u32;
        draw::rect_outline(&mut img, border_x, y, border_w, border_h, 2, draw::BLACK);
        y += g.px(2.0) as i32;

        // Expiry feeds both the use-by Code 128 and the GS1 DataMatrix
        let (expiry_display, expiry) =
            dates::compute_expiry(&fields.date_of_manufacture, fields.shelf_life_months);

        y = self.render_niin_row(&mut img, fields, expiry, x_left, x_right, y);

        draw::hline(&mut img, x_left, x_right, y, 1, draw::BLACK);
        y += g.px(2.0) as i32;

        y = self.render_code128_row(&mut img, fields, expiry, &expiry_display, x_left, y);

        draw::hline(&mut img, x_left, x_right, y, 1, draw::BLACK);
        y += g.px(2.0) as i32;

        y = self.render_info_table(&mut img, fields, &expiry_display, x_left, x_right, y);

        y = self.render_safety_block(&mut img, fields, x_left, x_right, y);

        self.render_contractor_block(&mut img, fields, x_left, x_right, y, border_bottom);

        img
    }

    /// Code 39 NIIN, unit of issue, hazard box and DataMatrix on one row
    fn render_niin_row(
        &self,
        img: &mut RgbImage,
        fields: &DodLabelFields,
        expiry: Option<chrono::NaiveDate>,
        x_left: i32,
        x_right: i32,
        mut y: i32,
    ) -> i32 {
        let g = &self.geometry;
        let barcode_h = g.px(10.0);
        let mut row_h = barcode_h as i32;

        match barcodes::code39_niin(&fields.niin, 2, barcode_h) {
            barcodes::EncodeOutcome::Encoded(symbol) => {
                let fitted = draw::fit_within(&symbol, g.px(35.0), barcode_h);
                draw::paste_gray(img, &fitted, x_left, y);
            }
            barcodes::EncodeOutcome::Skipped(reason) => {
                debug!("NIIN Code 39 skipped: {:?}", reason);
            }
        }

        // Unit of issue next to the barcode
        let unit_x = x_left + g.px(38.0) as i32;
        draw::text(img, &self.fonts.regular, self.sizes.small, unit_x, y, "Unit: ", draw::BLACK);
        let label_w = draw::text_width(&self.fonts.regular, self.sizes.small, "Unit: ") as i32;
        draw::text(
            img,
            &self.fonts.bold,
            self.sizes.data,
            unit_x + label_w,
            y,
            &fields.unit_of_issue,
            draw::BLACK,
        );

        // Hazard class box, only when a class is assigned
        if fields.hazardous_material_code != "-" {
            let box_side = g.px(8.0);
            let box_x = x_left + g.px(60.0) as i32;
            draw::text(
                img,
                &self.fonts.regular,
                self.sizes.tiny,
                box_x,
                y,
                "HAZARD",
                draw::BLACK,
            );
            let box_y = y + self.sizes.tiny as i32 + g.px(1.0) as i32;
            draw::rect_filled(img, box_x, box_y, box_side, box_side, draw::BLACK);
            draw::text_centered(
                img,
                &self.fonts.bold,
                self.sizes.data,
                box_x + box_side as i32 / 2,
                box_y + (box_side as i32 - self.sizes.data as i32) / 2,
                &fields.hazardous_material_code,
                draw::WHITE,
            );
            row_h = row_h.max(self.sizes.tiny as i32 + g.px(1.0) as i32 + box_side as i32);
        }

        // GS1 DataMatrix at the far right
        let dm_side = g.px(14.0);
        let payload = barcodes::gs1_payload(fields, expiry);
        match barcodes::gs1_datamatrix(&payload, 6) {
            barcodes::EncodeOutcome::Encoded(symbol) => {
                let fitted = draw::fit_within(&symbol, dm_side, dm_side);
                draw::paste_gray(img, &fitted, x_right - fitted.width() as i32, y);
                row_h = row_h.max(fitted.height() as i32);
            }
            barcodes::EncodeOutcome::Skipped(reason) => {
                debug!("DataMatrix skipped: {:?}", reason);
            }
        }

        y += row_h + g.px(1.0) as i32;

        draw::text(
            img,
            &self.fonts.regular,
            self.sizes.small,
            x_left,
            y,
            &format!("NIIN: {}", fields.niin),
            draw::BLACK,
        );
        y + self.sizes.small as i32 + g.px(2.0) as i32
    }

    /// Batch and use-by Code 128 symbols with their captions
    fn render_code128_row(
        &self,
        img: &mut RgbImage,
        fields: &DodLabelFields,
        expiry: Option<chrono::NaiveDate>,
        expiry_display: &str,
        x_left: i32,
        mut y: i32,
    ) -> i32 {
        let g = &self.geometry;
        let barcode_h = g.px(8.0);
        let use_by_x = x_left + g.px(50.0) as i32;

        match barcodes::code128(&fields.batch_lot_no, 2, barcode_h) {
            barcodes::EncodeOutcome::Encoded(symbol) => {
                let fitted = draw::fit_within(&symbol, g.px(40.0), barcode_h);
                draw::paste_gray(img, &fitted, x_left, y);
            }
            barcodes::EncodeOutcome::Skipped(reason) => {
                debug!("Batch Code 128 skipped: {:?}", reason);
            }
        }

        let use_by = dates::use_by_payload(expiry);
        match barcodes::code128(&use_by, 2, barcode_h) {
            barcodes::EncodeOutcome::Encoded(symbol) => {
                let fitted = draw::fit_within(&symbol, g.px(40.0), barcode_h);
                draw::paste_gray(img, &fitted, use_by_x, y);
            }
            barcodes::EncodeOutcome::Skipped(reason) => {
                debug!("Use-by Code 128 skipped: {:?}", reason);
            }
        }

        y += barcode_h as i32 + g.px(1.0) as i32;

        // Narrow labels get the abbreviated caption
        let managed_caption = if g.label_w < g.px(90.0) {
            format!("B/L: {}", fields.batch_managed)
        } else {
            format!("Batch Lot Managed: {}", fields.batch_managed)
        };
        draw::text(
            img,
            &self.fonts.regular,
            self.sizes.small,
            x_left,
            y,
            &managed_caption,
            draw::BLACK,
        );
        draw::text(
            img,
            &self.fonts.regular,
            self.sizes.small,
            use_by_x,
            y,
            &format!("Use by Date: {}", expiry_display),
            draw::BLACK,
        );
        y + self.sizes.small as i32 + g.px(2.0) as i32
    }

    /// Bordered two-column information table
    fn render_info_table(
        &self,
        img: &mut RgbImage,
        fields: &DodLabelFields,
        expiry_display: &str,
        x_left: i32,
        x_right: i32,
        mut y: i32,
    ) -> i32 {
        let g = &self.geometry;
        let row_h = self.sizes.data as u32 + g.px(2.0);
        let col_split = x_left + g.px(32.0) as i32;
        let table_w = (x_right - x_left) as u32;
        let retest = dates::resolve_retest(&fields.retest_date, expiry_display);
        let dom_display = format_date_display(&fields.date_of_manufacture);

        let rows: [(&str, &str); 7] = [
            ("NATO Code & JSD", ""),
            ("Specification", &fields.specification),
            ("Batch Lot No.", &fields.batch_lot_no),
            ("Date of Manufacture", &dom_display),
            ("Capacity/Net Weight", &fields.capacity_net_weight),
            ("Re-Test Date", &retest),
            ("Test Report No.", &fields.test_report_no),
        ];

        for (label, value) in rows {
            draw::rect_outline(img, x_left, y, table_w, row_h, 1, draw::BLACK);
            draw::vline(img, col_split, y, y + row_h as i32, 1, draw::BLACK);

            let text_y = y + g.px(0.5) as i32;
            draw::text(
                img,
                &self.fonts.regular,
                self.sizes.small,
                x_left + g.px(1.0) as i32,
                text_y,
                label,
                draw::BLACK,
            );

            let value_x = col_split + g.px(1.0) as i32;
            if label == "NATO Code & JSD" {
                self.render_nato_cell(img, fields, value_x, text_y, row_h);
            } else {
                draw::text(
                    img,
                    &self.fonts.bold,
                    self.sizes.data,
                    value_x,
                    text_y,
                    value,
                    draw::BLACK,
                );
            }
            y += row_h as i32;
        }
        y + g.px(2.0) as i32
    }

    /// NATO code drawn inside its own thick box when assigned, then the JSD
    fn render_nato_cell(
        &self,
        img: &mut RgbImage,
        fields: &DodLabelFields,
        x: i32,
        y: i32,
        row_h: u32,
    ) {
        let g = &self.geometry;
        let mut cursor = x;
        if fields.nato_code != "-" {
            let pad = g.px(1.0) as i32;
            let code_w = draw::text_width(&self.fonts.bold, self.sizes.data, &fields.nato_code);
            draw::rect_outline(
                img,
                cursor,
                y - pad / 2,
                code_w + 2 * pad as u32,
                row_h.saturating_sub(g.px(0.5)),
                2,
                draw::BLACK,
            );
            draw::text(
                img,
                &self.fonts.bold,
                self.sizes.data,
                cursor + pad,
                y,
                &fields.nato_code,
                draw::BLACK,
            );
            cursor += code_w as i32 + 2 * pad + g.px(1.0) as i32;
        }
        let jsd = format!(" | {}", fields.jsd_reference);
        draw::text(
            img,
            &self.fonts.bold,
            self.sizes.data,
            cursor,
            y,
            &jsd,
            draw::BLACK,
        );
    }

    /// Safety and movement markings, always rendered even when the content
    /// is a placeholder
    fn render_safety_block(
        &self,
        img: &mut RgbImage,
        fields: &DodLabelFields,
        x_left: i32,
        x_right: i32,
        mut y: i32,
    ) -> i32 {
        let g = &self.geometry;
        let block_w = (x_right - x_left) as u32;
        let header_h = self.sizes.small as u32 + g.px(1.5);

        draw::rect_filled(img, x_left, y, block_w, header_h, draw::SHADE_GRAY);
        draw::rect_outline(img, x_left, y, block_w, header_h, 1, draw::BLACK);
        draw::text(
            img,
            &self.fonts.bold,
            self.sizes.small,
            x_left + g.px(1.0) as i32,
            y + g.px(0.5) as i32,
            "Field 12: Safety & Movement Markings",
            draw::BLACK,
        );
        y += header_h as i32;

        let lines = wrap_text(
            &self.fonts.regular,
            self.sizes.small,
            &fields.safety_markings,
            block_w - 2 * g.px(1.0),
        );
        let content_h = lines.len() as u32 * (self.sizes.small as u32 + g.px(0.5)) + g.px(1.5);
        draw::rect_outline(img, x_left, y, block_w, content_h, 1, draw::BLACK);
        let mut line_y = y + g.px(0.5) as i32;
        for line in &lines {
            draw::text(
                img,
                &self.fonts.regular,
                self.sizes.small,
                x_left + g.px(1.0) as i32,
                line_y,
                line,
                draw::BLACK,
            );
            line_y += self.sizes.small as i32 + g.px(0.5) as i32;
        }
        y + content_h as i32 + g.px(2.0) as i32
    }

    /// Contractor details, pipe-split into lines, rendered only when the
    /// remaining space above the border holds the whole block
    fn render_contractor_block(
        &self,
        img: &mut RgbImage,
        fields: &DodLabelFields,
        x_left: i32,
        _x_right: i32,
        y: i32,
        border_bottom: i32,
    ) {
        if fields.contractor_details == "-" {
            return;
        }
        let g = &self.geometry;
        let lines: Vec<&str> = fields
            .contractor_details
            .split('|')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let line_h = self.sizes.small as i32 + g.px(0.5) as i32;
        let block_h = self.sizes.small as i32 + g.px(1.0) as i32 + lines.len() as i32 * line_h;

        if y + block_h > border_bottom - g.px(2.0) as i32 {
            debug!("Contractor block omitted, insufficient vertical space");
            return;
        }

        let mut line_y = y;
        draw::text(
            img,
            &self.fonts.bold,
            self.sizes.small,
            x_left,
            line_y,
            "Contractor:",
            draw::BLACK,
        );
        line_y += self.sizes.small as i32 + g.px(1.0) as i32;
        for line in lines {
            draw::text(
                img,
                &self.fonts.regular,
                self.sizes.small,
                x_left,
                line_y,
                line,
                draw::BLACK,
            );
            line_y += line_h;
        }
    }
}

/// Greedy word wrap against measured pixel widths
fn wrap_text(font: &FontVec, size: f32, content: &str, max_w: u32) -> Vec<String> {
    let mut lines = Vec::new();
    for segment in content.split('|') {
        let mut current = String::new();
        for word in segment.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if draw::text_width(font, size, &candidate) <= max_w || current.is_empty() {
                current = candidate;
            } else {
                lines.push(current);
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push("-".to_string());
    }
    lines
}
