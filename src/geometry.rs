//! Physical units and label geometry
//!
//! Converts millimetre coordinates to device pixels and points, defines the
//! supported label size presets, and derives the font tier sizes for a given
//! label area and resolution.

/// Millimetres per inch, the conversion base for all pixel math
pub const MM_PER_INCH: f64 = 25.4;

/// Bleed added on every edge of the printable label area, in millimetres
pub const BLEED_MM: f64 = 5.0;

/// Convert millimetres to pixels at the given resolution, truncating toward zero
pub fn mm_to_px(mm: f64, dpi: u32) -> u32 {
    (mm * dpi as f64 / MM_PER_INCH) as u32
}

/// Convert millimetres to PostScript points (1/72 inch)
pub fn mm_to_pt(mm: f64) -> f32 {
    (mm * 72.0 / MM_PER_INCH) as f32
}

/// Supported label size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelSize {
    TwoByOne,
    ThreeByTwo,
    FourByTwo,
    FourByThree,
    FourByFour,
    FourBySix,
    A6,
    A5,
}

impl LabelSize {
    /// All presets, in ascending area order
    pub const ALL: [LabelSize; 8] = [
        LabelSize::TwoByOne,
        LabelSize::ThreeByTwo,
        LabelSize::FourByTwo,
        LabelSize::FourByThree,
        LabelSize::FourByFour,
        LabelSize::FourBySix,
        LabelSize::A6,
        LabelSize::A5,
    ];

    /// Look up a preset from a user-supplied key
    pub fn from_key(key: &str) -> Option<LabelSize> {
        let normalized = key.trim().to_lowercase();
        let normalized = normalized
            .replace("\u{00d7}", "x")
            .replace('"', "")
            .replace(' ', "");
        match normalized.as_str() {
            "2x1" => Some(LabelSize::TwoByOne),
            "3x2" => Some(LabelSize::ThreeByTwo),
            "4x2" => Some(LabelSize::FourByTwo),
            "4x3" => Some(LabelSize::FourByThree),
            "4x4" => Some(LabelSize::FourByFour),
            "4x6" => Some(LabelSize::FourBySix),
            "a6" => Some(LabelSize::A6),
            "a5" => Some(LabelSize::A5),
            _ => None,
        }
    }

    /// Stable key used in CLI arguments and file names
    pub fn as_key(&self) -> &'static str {
        match self {
            LabelSize::TwoByOne => "2x1",
            LabelSize::ThreeByTwo => "3x2",
            LabelSize::FourByTwo => "4x2",
            LabelSize::FourByThree => "4x3",
            LabelSize::FourByFour => "4x4",
            LabelSize::FourBySix => "4x6",
            LabelSize::A6 => "a6",
            LabelSize::A5 => "a5",
        }
    }

    /// Printable label dimensions (width, height) in millimetres, excluding bleed
    pub fn dimensions_mm(&self) -> (f64, f64) {
        match self {
            LabelSize::TwoByOne => (50.8, 25.4),
            LabelSize::ThreeByTwo => (76.2, 50.8),
            LabelSize::FourByTwo => (101.6, 50.8),
            LabelSize::FourByThree => (101.6, 76.2),
            LabelSize::FourByFour => (101.6, 101.6),
            LabelSize::FourBySix => (101.6, 152.4),
            LabelSize::A6 => (105.0, 148.0),
            LabelSize::A5 => (148.0, 210.0),
        }
    }
}

/// Pixel geometry of a render canvas: the label area plus bleed on every edge
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    pub size: LabelSize,
    pub dpi: u32,
    /// Printable label width in pixels
    pub label_w: u32,
    /// Printable label height in pixels
    pub label_h: u32,
    /// Bleed width on each edge in pixels
    pub bleed: u32,
    /// Full canvas width including bleed
    pub canvas_w: u32,
    /// Full canvas height including bleed
    pub canvas_h: u32,
}

impl Geometry {
    pub fn new(size: LabelSize, dpi: u32) -> Geometry {
        let (w_mm, h_mm) = size.dimensions_mm();
        let label_w = mm_to_px(w_mm, dpi);
        let label_h = mm_to_px(h_mm, dpi);
        let bleed = mm_to_px(BLEED_MM, dpi);
        Geometry {
            size,
            dpi,
            label_w,
            label_h,
            bleed,
            canvas_w: label_w + 2 * bleed,
            canvas_h: label_h + 2 * bleed,
        }
    }

    /// Convert a millimetre distance to pixels at this geometry's resolution
    pub fn px(&self, mm: f64) -> u32 {
        mm_to_px(mm, self.dpi)
    }

    /// Total canvas dimensions in millimetres (label plus bleed)
    pub fn canvas_mm(&self) -> (f64, f64) {
        let (w, h) = self.size.dimensions_mm();
        (w + 2.0 * BLEED_MM, h + 2.0 * BLEED_MM)
    }
}

/// Font pixel sizes for the label's text tiers
#[derive(Debug, Clone, Copy)]
pub struct FontSizes {
    pub large: f32,
    pub header: f32,
    pub body: f32,
    pub small: f32,
    pub data: f32,
    pub tiny: f32,
}

impl FontSizes {
    /// Derive tier sizes for a label area, scaled against the 4x6 reference
    /// dimensions and clamped so very small or very large labels stay legible
    pub fn for_label(width_mm: f64, height_mm: f64, dpi: u32) -> FontSizes {
        let scale = (width_mm / 101.6).min(height_mm / 152.4);
        let scale = scale.clamp(0.4, 1.5);
        let base = dpi as f64 / 72.0;

        let tier = |ref_pt: f64, min_pt: f64| ((ref_pt * scale).max(min_pt) * base).floor() as f32;

        FontSizes {
            large: tier(18.0, 8.0),
            header: tier(12.0, 6.0),
            body: tier(9.0, 5.0),
            small: tier(7.0, 4.0),
            data: tier(10.0, 5.0),
            tiny: tier(6.0, 4.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mm_to_px_truncates() {
        // 101.6 mm at 600 dpi is exactly 2400 px
        assert_eq!(mm_to_px(101.6, 600), 2400);
        // 1 mm at 300 dpi is 11.81, truncated
        assert_eq!(mm_to_px(1.0, 300), 11);
        assert_eq!(mm_to_px(0.0, 600), 0);
    }

    #[test]
    fn test_mm_to_pt() {
        assert!((mm_to_pt(25.4) - 72.0).abs() < 1e-4);
    }

    #[test]
    fn test_size_key_round_trip() {
        for size in LabelSize::ALL {
            assert_eq!(LabelSize::from_key(size.as_key()), Some(size));
        }
    }

    #[test]
    fn test_size_key_variants() {
        assert_eq!(LabelSize::from_key("4\" \u{00d7} 6\""), Some(LabelSize::FourBySix));
        assert_eq!(LabelSize::from_key("A5"), Some(LabelSize::A5));
        assert_eq!(LabelSize::from_key("9x9"), None);
    }

    #[test]
    fn test_geometry_invariant_all_sizes() {
        for size in LabelSize::ALL {
            for dpi in [203, 300, 600] {
                let g = Geometry::new(size, dpi);
                assert_eq!(g.canvas_w, g.label_w + 2 * g.bleed);
                assert_eq!(g.canvas_h, g.label_h + 2 * g.bleed);
                assert!(g.label_w > 0 && g.label_h > 0);
            }
        }
    }

    #[test]
    fn test_font_scale_monotonic() {
        let small = FontSizes::for_label(50.8, 25.4, 600);
        let full = FontSizes::for_label(101.6, 152.4, 600);
        let a5 = FontSizes::for_label(148.0, 210.0, 600);
        assert!(small.large < full.large);
        assert!(full.large <= a5.large);
        // 4x6 is the reference size: scale is exactly 1.0
        assert_eq!(full.large, (18.0 * 600.0 / 72.0) as f32);
    }

    #[test]
    fn test_font_scale_clamped() {
        // 2x1 hits the lower clamp of 0.4
        let tiny = FontSizes::for_label(50.8, 25.4, 600);
        let base = 600.0 / 72.0;
        assert_eq!(tiny.tiny, ((6.0f64 * 0.4).max(4.0) * base).floor() as f32);
        assert_eq!(tiny.large, ((18.0f64 * 0.4).max(8.0) * base).floor() as f32);
    }

    #[test]
    fn test_font_sizes_are_whole_pixels() {
        for &size in LabelSize::ALL.iter() {
            let (w, h) = size.dimensions_mm();
            let sizes = FontSizes::for_label(w, h, 300);
            for v in [sizes.large, sizes.header, sizes.body, sizes.small, sizes.data, sizes.tiny] {
                assert_eq!(v.fract(), 0.0, "{:?} tier {} not floored", size, v);
            }
        }
    }

    #[test]
    fn test_font_scale_deterministic() {
        let a = FontSizes::for_label(101.6, 152.4, 600);
        let b = FontSizes::for_label(101.6, 152.4, 600);
        assert_eq!(a.large, b.large);
        assert_eq!(a.data, b.data);
    }
}
