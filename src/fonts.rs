//! Font loading for label text
//!
//! Labels need a regular and a bold TrueType face. The loader walks a list
//! of common system font locations; when no bold face resolves it falls back
//! to the regular face with a warning, and when nothing resolves at all the
//! engine cannot be constructed.

use ab_glyph::FontVec;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{LabelError, Result};

const REGULAR_CANDIDATES: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BOLD_CANDIDATES: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// The pair of faces used across a label render
pub struct FontSet {
    pub regular: FontVec,
    pub bold: FontVec,
}

fn load_first(candidates: &[&str]) -> Option<(PathBuf, FontVec)> {
    for candidate in candidates {
        let path = Path::new(candidate);
        if let Ok(bytes) = std::fs::read(path) {
            if let Ok(font) = FontVec::try_from_vec(bytes) {
                debug!("Loaded font: {}", path.display());
                return Some((path.to_path_buf(), font));
            }
        }
    }
    None
}

impl FontSet {
    /// Load the regular and bold faces from the system, or from explicit
    /// override paths when provided
    pub fn load(regular_override: Option<&Path>, bold_override: Option<&Path>) -> Result<FontSet> {
        let regular = match regular_override {
            Some(path) => {
                let bytes = std::fs::read(path)?;
                FontVec::try_from_vec(bytes)
                    .map_err(|e| anyhow::anyhow!("Invalid font file {}: {}", path.display(), e))?
            }
            None => match load_first(&REGULAR_CANDIDATES) {
                Some((_, font)) => font,
                None => {
                    return Err(LabelError::FontUnavailable {
                        searched: REGULAR_CANDIDATES.len(),
                    }
                    .into())
                }
            },
        };

        let bold = match bold_override {
            Some(path) => {
                let bytes = std::fs::read(path)?;
                FontVec::try_from_vec(bytes)
                    .map_err(|e| anyhow::anyhow!("Invalid font file {}: {}", path.display(), e))?
            }
            None => match load_first(&BOLD_CANDIDATES) {
                Some((_, font)) => font,
                None => {
                    warn!("No bold face found, reusing the regular face");
                    match load_first(&REGULAR_CANDIDATES) {
                        Some((_, font)) => font,
                        None => {
                            return Err(LabelError::FontUnavailable {
                                searched: REGULAR_CANDIDATES.len(),
                            }
                            .into())
                        }
                    }
                }
            },
        };

        Ok(FontSet { regular, bold })
    }

    /// Whether any usable system font exists, used by tests to skip renders
    /// on hosts without fonts installed
    pub fn available() -> bool {
        load_first(&REGULAR_CANDIDATES).is_some()
    }
}
