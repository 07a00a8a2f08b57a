//! milspec-labels - Render compliance labels from batch data
//!
//! A command line tool that renders MIL-STD-129 DoD shipping labels and GHS
//! drum labels from CSV batch data as print-ready PNG or PDF files.

use milspec_labels::{config::Config, error::Result, generator::Generator};
use tracing::{error, info};

fn main() -> Result<()> {
    // Parse configuration and initialize logging
    let config = Config::from_args().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    info!("Starting label generation...");
    if config.verbose {
        info!("Configuration: {:?}", config);
    }

    // Create and run the generator
    let mut generator = Generator::new(config);

    match generator.run() {
        Ok(()) => {
            let stats = generator.get_generation_stats();
            info!("Generation completed successfully");
            info!("Generated {} labels", stats.labels_generated);

            println!("Generated {} labels", stats.labels_generated);
            if stats.rows_failed > 0 {
                println!("{} rows failed:", stats.rows_failed);
                for failure in generator.failures() {
                    println!("  row {} ({}): {}", failure.row, failure.description, failure.message);
                }
            }
            for warning in &stats.compliance_warnings {
                println!("Warning: {}", warning);
            }
            Ok(())
        }
        Err(e) => {
            error!("Generation failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
