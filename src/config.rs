//! Configuration management for milspec-labels
//!
//! This module handles CLI argument parsing and application settings.

use anyhow::{anyhow, Context, Result};
use clap::builder::styling;
use clap::{value_parser, Arg, ColorChoice, Command};
use std::path::PathBuf;
use tracing::info;

use crate::geometry::LabelSize;

/// Build the CLI command
pub fn build_cli() -> Command {
    let styles = styling::Styles::styled()
        .header(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(styling::AnsiColor::Blue.on_default() | styling::Effects::BOLD)
        .placeholder(styling::AnsiColor::Cyan.on_default());

    Command::new("milspec-labels")
        .about("milspec-labels - Render MIL-STD-129 DoD and GHS drum labels from batch data")
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .help("Input CSV file with one label record per row")
                .value_parser(value_parser!(String))
                .required(true),
        )
        .arg(
            Arg::new("label_type")
                .short('t')
                .long("label-type")
                .help("Label layout to render (dod, drum)")
                .value_parser(["dod", "drum"])
                .default_value("dod"),
        )
        .arg(
            Arg::new("size")
                .short('s')
                .long("size")
                .help("Default label size preset (2x1, 3x2, 4x2, 4x3, 4x4, 4x6, a6, a5)")
                .value_parser(value_parser!(String))
                .default_value("4x6"),
        )
        .arg(
            Arg::new("dpi")
                .long("dpi")
                .help("Render resolution in dots per inch")
                .value_parser(value_parser!(u32))
                .default_value("600"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("Output file format (png, pdf)")
                .value_parser(["png", "pdf"])
                .default_value("png"),
        )
        .arg(
            Arg::new("output_path")
                .short('o')
                .long("output_path")
                .help("Output directory path")
                .value_parser(value_parser!(String))
                .default_value("./labels"),
        )
        .arg(
            Arg::new("catalog")
                .short('c')
                .long("catalog")
                .help("Optional product catalog JSON used to fill missing fields")
                .value_parser(value_parser!(String)),
        )
        .arg(
            Arg::new("pictograms")
                .long("pictograms")
                .help("Folder holding GHS pictogram PNGs for drum labels")
                .value_parser(value_parser!(String)),
        )
        .arg(
            Arg::new("all_sizes")
                .long("all-sizes")
                .help("Render every record in all size presets")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("zip")
                .short('z')
                .long("zip")
                .help("Compress generated labels into a ZIP archive")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("zip_name")
                .short('n')
                .long("zip_name")
                .help("Name for the output ZIP archive")
                .value_parser(value_parser!(String))
                .default_value("Labels"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no_progress")
                .long("no-progress")
                .help("Disable progress indicators")
                .action(clap::ArgAction::SetTrue),
        )
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Input CSV path
    pub data: PathBuf,

    /// Label layout type
    pub label_type: String,

    /// Default size preset key
    pub size: String,

    /// Render resolution
    pub dpi: u32,

    /// Output format (png or pdf)
    pub format: String,

    /// Output directory path
    pub output_path: PathBuf,

    /// Optional product catalog JSON path
    pub catalog: Option<PathBuf>,

    /// Folder holding GHS pictogram PNGs for drum labels
    pub pictograms: Option<PathBuf>,

    /// Render every record in all size presets
    pub all_sizes: bool,

    /// Create ZIP file for output
    pub zip: bool,

    /// Name for the output ZIP file
    pub zip_name: String,

    /// Enable verbose logging
    pub verbose: bool,

    /// Disable progress bars
    pub no_progress: bool,
}

impl Config {
    /// Parse arguments and apply initial configuration
    pub fn from_args() -> Result<Self> {
        let matches = build_cli().get_matches();

        let data = matches
            .get_one::<String>("data")
            .ok_or_else(|| anyhow!("Input data file is required"))?
            .to_string();
        let data = PathBuf::from(data);

        let output_path = matches
            .get_one::<String>("output_path")
            .cloned()
            .unwrap_or_else(|| "./labels".to_string());
        let output_path = PathBuf::from(output_path);

        let label_type = matches
            .get_one::<String>("label_type")
            .cloned()
            .unwrap_or_else(|| "dod".to_string());

        let size = matches
            .get_one::<String>("size")
            .cloned()
            .unwrap_or_else(|| "4x6".to_string());

        let dpi = matches.get_one::<u32>("dpi").copied().unwrap_or(600);

        let format = matches
            .get_one::<String>("format")
            .cloned()
            .unwrap_or_else(|| "png".to_string());

        let catalog = matches.get_one::<String>("catalog").map(PathBuf::from);
        let pictograms = matches.get_one::<String>("pictograms").map(PathBuf::from);

        let all_sizes = matches.get_flag("all_sizes");
        let zip = matches.get_flag("zip");

        let zip_name = matches
            .get_one::<String>("zip_name")
            .cloned()
            .unwrap_or_else(|| "Labels".to_string());

        let verbose = matches.get_flag("verbose");
        let no_progress = matches.get_flag("no_progress");

        let config = Config {
            data,
            label_type,
            size,
            dpi,
            format,
            output_path,
            catalog,
            pictograms,
            all_sizes,
            zip,
            zip_name,
            verbose,
            no_progress,
        };

        // Set up tracing with environment variable support
        // RUST_LOG takes precedence over verbose flag
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off"));

        tracing_subscriber::fmt().with_env_filter(env_filter).init();

        if config.verbose {
            info!("Configuration: {:?}", config);
        }

        Ok(config)
    }

    /// Resolve the configured default size preset
    pub fn default_size(&self) -> Result<LabelSize> {
        LabelSize::from_key(&self.size).ok_or_else(|| {
            crate::error::LabelError::UnknownSize {
                key: self.size.clone(),
            }
            .into()
        })
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        // Validate input path exists
        if !self.data.exists() {
            return Err(anyhow::anyhow!(
                "Input data file does not exist: {}",
                self.data.display()
            ));
        }

        if self.dpi < 72 || self.dpi > 1200 {
            return Err(anyhow::anyhow!(
                "DPI must be between 72 and 1200, got {}",
                self.dpi
            ));
        }

        self.default_size()?;

        // Create output directory if it doesn't exist
        if !self.output_path.exists() {
            std::fs::create_dir_all(&self.output_path).with_context(|| {
                format!(
                    "Failed to create output directory: {}",
                    self.output_path.display()
                )
            })?;
            info!("Created output directory: {}", self.output_path.display());
        }

        info!("Configuration validation completed successfully");
        Ok(())
    }
}
