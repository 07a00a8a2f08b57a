//! Archive handling for ZIP file operations
//!
//! This module bundles generated label files into an output ZIP archive
//! with proper progress tracking.

use crate::error::{Result, ResultExt};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Archive creator for building output ZIP files
pub struct ArchiveCreator;

impl ArchiveCreator {
    /// Create a ZIP file from a collection of files
    pub fn create_zip<P: AsRef<Path>, I: IntoIterator<Item = P>>(
        files: I,
        output_path: P,
        show_progress: bool,
    ) -> Result<()> {
        let output_path = output_path.as_ref();
        let files: Vec<PathBuf> = files
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();

        info!("Creating archive: {}", output_path.display());

        // Create output directory if it doesn't exist
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).with_path_context("create output directory", parent)?;
        }

        let file =
            fs::File::create(output_path).with_path_context("create ZIP file", output_path)?;

        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .unix_permissions(0o755);

        let progress = if show_progress {
            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                    .progress_chars("#>-")
            );
            pb.set_message("Creating ZIP file...");
            Some(pb)
        } else {
            None
        };

        for file_path in files {
            let file_name = file_path
                .file_name()
                .and_then(|name| name.to_str())
                .context("Invalid filename")?;

            zip.start_file(file_name, options)
                .context("Failed to start ZIP file entry")?;

            let content =
                fs::read(&file_path).with_path_context("read file for ZIP", &file_path)?;

            use std::io::Write;
            zip.write_all(&content)
                .context("Failed to write file content to ZIP")?;

            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        }

        zip.finish().context("Failed to finalize ZIP file")?;

        if let Some(pb) = progress {
            pb.finish_with_message("ZIP file created successfully");
        }

        info!("ZIP file created successfully: {}", output_path.display());
        Ok(())
    }
}
