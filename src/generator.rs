//! Batch label generation engine
//!
//! This module orchestrates a generation run: load and validate the batch
//! data, merge catalog entries, render each record independently, write the
//! output files and optionally bundle them into a ZIP. A failed row is
//! recorded and the run continues with the remaining rows.

use crate::{
    archive::ArchiveCreator,
    catalog::ProductCatalog,
    config::Config,
    drum::{DrumLabelEngine, DrumLabelFields, DrumProfile},
    engine::{LabelEngine, RenderProfile},
    error::{Result, ResultExt},
    fields::{DodLabelFields, LabelRecord},
    geometry::LabelSize,
    ingest,
    output::{self, OutputFormat},
    progress::ProgressTracker,
};
use anyhow::Context;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// One row that failed to render or write
#[derive(Debug)]
pub struct RowFailure {
    pub row: usize,
    pub description: String,
    pub message: String,
}

/// The batch generation engine
pub struct Generator {
    config: Config,
    progress_tracker: ProgressTracker,
    catalog: ProductCatalog,
    dod_engines: HashMap<LabelSize, LabelEngine>,
    generated_files: Vec<PathBuf>,
    failures: Vec<RowFailure>,
    warnings: Vec<String>,
}

impl Generator {
    /// Create a new generator with the given configuration
    pub fn new(config: Config) -> Self {
        let progress_enabled = !config.no_progress;

        Self {
            config,
            progress_tracker: ProgressTracker::new(progress_enabled),
            catalog: ProductCatalog::new(),
            dod_engines: HashMap::new(),
            generated_files: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Run the complete generation process
    pub fn run(&mut self) -> Result<()> {
        let start = std::time::Instant::now();
        info!("Starting label generation...");

        // Validate configuration
        self.config
            .validate()
            .context("Configuration validation failed")?;
        let format = OutputFormat::from_key(&self.config.format)?;

        // Load the product catalog when configured
        self.load_catalog().context("Failed to load catalog")?;

        // Load and validate batch data
        let records = self.load_records().context("Failed to load batch data")?;

        // Render every record
        self.render_records(&records, format)
            .context("Failed to render labels")?;

        // Bundle output when requested
        self.create_output().context("Failed to create output")?;

        info!("Generation completed in {} ms", start.elapsed().as_millis());
        Ok(())
    }

    fn load_catalog(&mut self) -> Result<()> {
        if let Some(path) = self.config.catalog.clone() {
            self.catalog = ProductCatalog::load(&path)?;
        }
        Ok(())
    }

    fn load_records(&self) -> Result<Vec<LabelRecord>> {
        let required: &[&str] = if self.config.label_type == "drum" {
            &ingest::DRUM_REQUIRED_COLUMNS
        } else {
            &ingest::DOD_REQUIRED_COLUMNS
        };
        ingest::load_records(&self.config.data, required)
    }

    /// Render all records, collecting per-row failures instead of aborting
    fn render_records(&mut self, records: &[LabelRecord], format: OutputFormat) -> Result<()> {
        let progress = self
            .progress_tracker
            .create_record_progress(records.len(), "Rendering labels");

        for (index, record) in records.iter().enumerate() {
            let result = if self.config.label_type == "drum" {
                self.render_drum_record(record, format)
            } else {
                self.render_dod_record(record, format)
            };

            if let Err(e) = result {
                let description = record.cleaned("product_description", "row");
                warn!("Row {} failed: {:#}", index + 1, e);
                self.failures.push(RowFailure {
                    row: index + 1,
                    description,
                    message: format!("{:#}", e),
                });
            }

            ProgressTracker::update_progress(&progress, 1, None);
        }

        ProgressTracker::finish_progress(progress, "Rendering completed");
        info!(
            "Rendered {} labels, {} rows failed",
            self.generated_files.len(),
            self.failures.len()
        );
        Ok(())
    }

    /// Size presets for one row: the per-row column wins over the default,
    /// and all-sizes mode sweeps every preset
    fn sizes_for_record(&self, record: &LabelRecord) -> Result<Vec<LabelSize>> {
        if self.config.all_sizes {
            return Ok(LabelSize::ALL.to_vec());
        }
        let default = self.config.default_size()?;
        let requested = record.cleaned("Label Size", "");
        if requested.is_empty() {
            return Ok(vec![default]);
        }
        match LabelSize::from_key(&requested) {
            Some(size) => Ok(vec![size]),
            None => {
                warn!("Unknown label size '{}', using default", requested);
                Ok(vec![default])
            }
        }
    }

    fn render_dod_record(&mut self, record: &LabelRecord, format: OutputFormat) -> Result<()> {
        let product_id = record.cleaned("product_id", "");
        let merged = if product_id.is_empty() {
            record.clone()
        } else {
            self.catalog.merge_batch(&product_id, record)
        };
        let fields = DodLabelFields::from_record(&merged);

        // A re-test override without a test report is a compliance gap
        if fields.retest_date != "-" && fields.test_report_no == "-" {
            let message = format!(
                "Re-test date supplied without a test report number for '{}' batch {}",
                fields.product_description, fields.batch_lot_no
            );
            warn!("{}", message);
            self.warnings.push(message);
        }

        for size in self.sizes_for_record(&merged)? {
            if !self.dod_engines.contains_key(&size) {
                let profile = RenderProfile::new(size, self.config.dpi);
                self.dod_engines.insert(size, LabelEngine::new(&profile)?);
            }
            let engine = &self.dod_engines[&size];

            let img = engine.render(&fields);
            let stem = sanitize_filename(&format!(
                "{}_{}_{}",
                fields.product_description,
                fields.batch_lot_no,
                size.as_key()
            ));
            let path = self
                .config
                .output_path
                .join(format!("{}.{}", stem, format.extension()));

            let bytes = match format {
                OutputFormat::Png => output::encode_png(&img, self.config.dpi)?,
                OutputFormat::Pdf => {
                    let (w_mm, h_mm) = engine.geometry().canvas_mm();
                    output::encode_pdf(&img, w_mm, h_mm, &fields.product_description)?
                }
            };
            output::write_output(&path, &bytes).with_path_context("write label", &path)?;
            debug!("Wrote {}", path.display());
            self.generated_files.push(path);
        }
        Ok(())
    }

    fn render_drum_record(&mut self, record: &LabelRecord, format: OutputFormat) -> Result<()> {
        let fields = DrumLabelFields::from_record(record);
        let mut profile = DrumProfile::new(self.config.dpi);
        profile.pictogram_dir = self.config.pictograms.clone();
        let engine = DrumLabelEngine::new(&profile)?;

        let img = engine.render(&fields);
        let stem = sanitize_filename(&format!(
            "{}_{}_drum",
            fields.product_code, fields.batch_number
        ));
        let path = self
            .config
            .output_path
            .join(format!("{}.{}", stem, format.extension()));

        let bytes = match format {
            OutputFormat::Png => output::encode_png(&img, self.config.dpi)?,
            OutputFormat::Pdf => {
                let (w_mm, h_mm) = engine.geometry().canvas_mm();
                output::encode_pdf(&img, w_mm, h_mm, &fields.product_name)?
            }
        };
        output::write_output(&path, &bytes).with_path_context("write label", &path)?;
        debug!("Wrote {}", path.display());
        self.generated_files.push(path);
        Ok(())
    }

    /// Bundle the generated files into a ZIP when requested
    fn create_output(&self) -> Result<()> {
        if !self.config.zip {
            return Ok(());
        }
        let zip_path = self
            .config
            .output_path
            .join(format!("{}.zip", self.config.zip_name));
        ArchiveCreator::create_zip(&self.generated_files, &zip_path, !self.config.no_progress)?;
        info!("Created ZIP archive: {}", zip_path.display());
        Ok(())
    }

    /// Get statistics about the generation run
    pub fn get_generation_stats(&self) -> GenerationStats {
        GenerationStats {
            labels_generated: self.generated_files.len(),
            rows_failed: self.failures.len(),
            compliance_warnings: self.warnings.clone(),
            output_format: if self.config.zip { "ZIP" } else { "Files" }.to_string(),
        }
    }

    pub fn failures(&self) -> &[RowFailure] {
        &self.failures
    }

    pub fn generated_files(&self) -> &[PathBuf] {
        &self.generated_files
    }
}

/// Sanitize a file stem: keep alphanumerics, dash, underscore and dot
fn sanitize_filename(stem: &str) -> String {
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Statistics about a generation run
#[derive(Debug)]
pub struct GenerationStats {
    pub labels_generated: usize,
    pub rows_failed: usize,
    pub compliance_warnings: Vec<String>,
    pub output_format: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontSet;
    use tempfile::tempdir;

    fn test_config(data: &Path, output: &Path) -> Config {
        Config {
            data: data.to_path_buf(),
            label_type: "dod".to_string(),
            size: "4x6".to_string(),
            dpi: 203,
            format: "png".to_string(),
            output_path: output.to_path_buf(),
            catalog: None,
            pictograms: None,
            all_sizes: false,
            zip: false,
            zip_name: "Labels".to_string(),
            verbose: false,
            no_progress: true,
        }
    }

    const SAMPLE_CSV: &str = "\
product_description,nato_stock_no,niin,batch_lot_no,date_of_manufacture,shelf_life_months,Label Size
Fuchs OM-11,9150-66-035-7879,,FM251115A,15/11/2025,36,4x6
OX-7 Hydraulic,9150-99-000-1234,990001234,HX240301B,01/03/2024,24,3x2
";

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Fuchs OM-11/B#1"), "Fuchs_OM-11_B_1");
        assert_eq!(sanitize_filename("plain_name.png"), "plain_name.png");
    }

    #[test]
    fn test_generator_creation() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir.path().join("in.csv"), &dir.path().join("out"));
        let generator = Generator::new(config);
        assert!(generator.generated_files.is_empty());
        assert!(generator.failures.is_empty());
    }

    #[test]
    fn test_run_generates_files() {
        if !FontSet::available() {
            return;
        }
        let dir = tempdir().unwrap();
        let data = dir.path().join("records.csv");
        std::fs::write(&data, SAMPLE_CSV).unwrap();

        let config = test_config(&data, &dir.path().join("out"));
        let mut generator = Generator::new(config);
        generator.run().unwrap();

        let stats = generator.get_generation_stats();
        assert_eq!(stats.labels_generated, 2);
        assert_eq!(stats.rows_failed, 0);
        for path in generator.generated_files() {
            assert!(path.exists());
        }
    }

    #[test]
    fn test_run_continues_past_bad_row() {
        if !FontSet::available() {
            return;
        }
        let dir = tempdir().unwrap();
        let data = dir.path().join("records.csv");
        // second row asks for an unknown size, which falls back; renders fine
        std::fs::write(&data, SAMPLE_CSV).unwrap();

        let config = test_config(&data, &dir.path().join("out"));
        let mut generator = Generator::new(config);
        generator.run().unwrap();
        assert!(generator.failures().is_empty());
    }

    #[test]
    fn test_compliance_warning_collected() {
        if !FontSet::available() {
            return;
        }
        let dir = tempdir().unwrap();
        let data = dir.path().join("records.csv");
        let csv = "\
product_description,nato_stock_no,niin,batch_lot_no,date_of_manufacture,retest_date,test_report_no
Fuchs OM-11,9150-66-035-7879,,FM251115A,15/11/2025,01/06/2027,-
";
        std::fs::write(&data, csv).unwrap();

        let config = test_config(&data, &dir.path().join("out"));
        let mut generator = Generator::new(config);
        generator.run().unwrap();

        let stats = generator.get_generation_stats();
        assert_eq!(stats.compliance_warnings.len(), 1);
        assert!(stats.compliance_warnings[0].contains("FM251115A"));
    }

    #[test]
    fn test_zip_bundling() {
        if !FontSet::available() {
            return;
        }
        let dir = tempdir().unwrap();
        let data = dir.path().join("records.csv");
        std::fs::write(&data, SAMPLE_CSV).unwrap();

        let mut config = test_config(&data, &dir.path().join("out"));
        config.zip = true;
        let mut generator = Generator::new(config);
        generator.run().unwrap();

        assert!(dir.path().join("out/Labels.zip").exists());
    }
}
