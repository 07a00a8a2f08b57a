//! milspec-labels - Compliance label rendering
//!
//! Renders MIL-STD-129 DoD shipping labels and GHS chemical drum labels as
//! print-ready PNG or PDF files, encoding Code 39, Code 128, GS1 DataMatrix
//! and QR symbols at exact physical coordinates.

pub mod archive;
pub mod barcodes;
pub mod catalog;
pub mod config;
pub mod dates;
pub mod draw;
pub mod drum;
pub mod engine;
pub mod error;
pub mod fields;
pub mod fonts;
pub mod generator;
pub mod geometry;
pub mod ingest;
pub mod output;
pub mod progress;

pub use config::Config;
pub use engine::{LabelEngine, RenderProfile};
pub use error::{LabelError, Result};
pub use generator::Generator;
pub use geometry::LabelSize;
