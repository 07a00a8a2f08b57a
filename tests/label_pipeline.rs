//! Integration tests for milspec-labels
//!
//! This module exercises the whole generation pipeline from CSV batch data
//! to rendered label files, plus the catalog persistence path.

use milspec_labels::{
    catalog::{ProductCatalog, ProductCatalogEntry},
    config::Config,
    engine::{LabelEngine, RenderProfile},
    fields::{DodLabelFields, LabelRecord},
    fonts::FontSet,
    generator::Generator,
    geometry::{Geometry, LabelSize},
    ingest,
};
use std::{fs, path::PathBuf};
use tempfile::TempDir;

const BATCH_CSV: &str = "\
product_description,nato_stock_no,niin,batch_lot_no,date_of_manufacture,shelf_life_months,Label Size
Fuchs OM-11,9150-66-035-7879,,FM251115A,15/11/2025,36,4x6
OX-7 Hydraulic Fluid,9150-99-000-1234,990001234,HX240301B,01/03/2024,24,4x4
AL-11 Grease,6850-99-224-5252,,GR250601C,01/06/2025,48,3x2
";

/// Create a temporary directory holding a batch CSV
fn create_batch_file(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("batch.csv");
    fs::write(&path, content).expect("Failed to write batch file");
    (temp_dir, path)
}

/// Create a test configuration
fn create_test_config(data: PathBuf, output_path: PathBuf) -> Config {
    Config {
        data,
        label_type: "dod".to_string(),
        size: "4x6".to_string(),
        dpi: 203,
        format: "png".to_string(),
        output_path,
        catalog: None,
        pictograms: None,
        all_sizes: false,
        zip: false,
        zip_name: "Labels".to_string(),
        verbose: false,
        no_progress: true, // Disable progress bars in tests
    }
}

#[test]
fn test_sample_record_normalization() {
    let mut record = LabelRecord::new();
    record.set("product_description", "Fuchs OM-11");
    record.set("nato_stock_no", "9150-66-035-7879");
    record.set("batch_lot_no", "FM251115A");
    record.set("date_of_manufacture", "15/11/2025");
    record.set("shelf_life_months", "36");

    let fields = DodLabelFields::from_record(&record);
    assert_eq!(fields.niin, "660357879");
    assert_eq!(fields.nsn13(), "9150660357879");
    assert_eq!(fields.unit_of_issue, "DR");

    let (display, expiry) = milspec_labels::dates::compute_expiry(
        &fields.date_of_manufacture,
        fields.shelf_life_months,
    );
    assert_eq!(display, "15 NOV 2028");
    assert!(expiry.is_some());

    let payload = milspec_labels::barcodes::gs1_payload(&fields, expiry);
    assert!(payload.starts_with("70019150660357879"));
    assert!(payload.ends_with("17281115"));
    assert!(milspec_labels::barcodes::gs1_datamatrix(&payload, 6).is_encoded());
}

#[test]
fn test_geometry_invariant_holds_for_all_presets() {
    for size in LabelSize::ALL {
        let g = Geometry::new(size, 600);
        assert_eq!(g.canvas_w, g.label_w + 2 * g.bleed);
        assert_eq!(g.canvas_h, g.label_h + 2 * g.bleed);
    }
}

#[test]
fn test_ingest_rejects_missing_columns() {
    let (_dir, path) = create_batch_file(
        "product_description,batch_lot_no,date_of_manufacture\nFuchs OM-11,FM251115A,15/11/2025\n",
    );
    let err = ingest::load_records(&path, &ingest::DOD_REQUIRED_COLUMNS).unwrap_err();
    let message = format!("{}", err);
    assert!(message.contains("nato_stock_no"));
    assert!(message.contains("niin"));
}

#[test]
fn test_full_batch_run() {
    if !FontSet::available() {
        eprintln!("No system font available, skipping render test");
        return;
    }

    let (dir, data) = create_batch_file(BATCH_CSV);
    let output = dir.path().join("out");
    let config = create_test_config(data, output.clone());

    let mut generator = Generator::new(config);
    generator.run().expect("Batch run should succeed");

    let stats = generator.get_generation_stats();
    assert_eq!(stats.labels_generated, 3);
    assert_eq!(stats.rows_failed, 0);

    // Per-row size column drives the filename suffix
    let names: Vec<String> = fs::read_dir(&output)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    assert!(names.iter().any(|n| n.contains("4x6")));
    assert!(names.iter().any(|n| n.contains("4x4")));
    assert!(names.iter().any(|n| n.contains("3x2")));
}

#[test]
fn test_batch_continues_past_unreadable_row() {
    if !FontSet::available() {
        eprintln!("No system font available, skipping render test");
        return;
    }

    // Second row has a bad date; it renders with N/A expiry rather than failing,
    // and the run produces all labels
    let csv = "\
product_description,nato_stock_no,niin,batch_lot_no,date_of_manufacture
Fuchs OM-11,9150-66-035-7879,,FM251115A,15/11/2025
Mystery Product,9150-99-000-1234,,X1,someday
";
    let (dir, data) = create_batch_file(csv);
    let config = create_test_config(data, dir.path().join("out"));

    let mut generator = Generator::new(config);
    generator.run().expect("Batch run should succeed");
    assert_eq!(generator.get_generation_stats().labels_generated, 2);
}

#[test]
fn test_pdf_output() {
    if !FontSet::available() {
        eprintln!("No system font available, skipping render test");
        return;
    }

    let (dir, data) = create_batch_file(BATCH_CSV);
    let output = dir.path().join("out");
    let mut config = create_test_config(data, output.clone());
    config.format = "pdf".to_string();

    let mut generator = Generator::new(config);
    generator.run().expect("Batch run should succeed");

    for path in generator.generated_files() {
        assert_eq!(path.extension().unwrap(), "pdf");
        let bytes = fs::read(path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}

#[test]
fn test_catalog_fills_batch_blanks() {
    if !FontSet::available() {
        eprintln!("No system font available, skipping render test");
        return;
    }

    let dir = TempDir::new().unwrap();
    let catalog_path = dir.path().join("catalog.json");

    let mut catalog = ProductCatalog::new();
    catalog
        .add(ProductCatalogEntry {
            id: "OM-11".to_string(),
            product_description: "Fuchs OM-11".to_string(),
            nato_stock_no: "9150-66-035-7879".to_string(),
            specification: "DEF STAN 91-39".to_string(),
            shelf_life_months: 36,
            ..Default::default()
        })
        .unwrap();
    catalog.save(&catalog_path).unwrap();

    let data = dir.path().join("batch.csv");
    fs::write(
        &data,
        "\
product_id,product_description,nato_stock_no,niin,batch_lot_no,date_of_manufacture
OM-11,Fuchs OM-11,9150-66-035-7879,,FM251115A,15/11/2025
",
    )
    .unwrap();

    let mut config = create_test_config(data, dir.path().join("out"));
    config.catalog = Some(catalog_path);

    let mut generator = Generator::new(config);
    generator.run().expect("Batch run should succeed");
    assert_eq!(generator.get_generation_stats().labels_generated, 1);
}

#[test]
fn test_drum_batch_run() {
    if !FontSet::available() {
        eprintln!("No system font available, skipping render test");
        return;
    }

    let csv = "\
product_name,product_code,batch_number,manufacture_date,un_number,hazard_statements
Valorem Solvent 40,VAL-S40,B240815,15/08/2024,1263,H226 Flammable liquid
";
    let (dir, data) = create_batch_file(csv);
    let mut config = create_test_config(data, dir.path().join("out"));
    config.label_type = "drum".to_string();

    let mut generator = Generator::new(config);
    generator.run().expect("Drum batch run should succeed");

    let files = generator.generated_files();
    assert_eq!(files.len(), 1);
    assert!(files[0]
        .file_name()
        .unwrap()
        .to_string_lossy()
        .contains("drum"));
}

#[test]
fn test_all_sizes_sweep() {
    if !FontSet::available() {
        eprintln!("No system font available, skipping render test");
        return;
    }

    let csv = "\
product_description,nato_stock_no,niin,batch_lot_no,date_of_manufacture
Fuchs OM-11,9150-66-035-7879,,FM251115A,15/11/2025
";
    let (dir, data) = create_batch_file(csv);
    let mut config = create_test_config(data, dir.path().join("out"));
    config.all_sizes = true;

    let mut generator = Generator::new(config);
    generator.run().expect("All-sizes run should succeed");
    assert_eq!(
        generator.get_generation_stats().labels_generated,
        LabelSize::ALL.len()
    );
}

#[test]
fn test_engine_render_is_deterministic() {
    if !FontSet::available() {
        eprintln!("No system font available, skipping render test");
        return;
    }

    let profile = RenderProfile::new(LabelSize::FourByThree, 203);
    let engine = LabelEngine::new(&profile).unwrap();

    let mut record = LabelRecord::new();
    record.set("product_description", "Fuchs OM-11");
    record.set("nato_stock_no", "9150-66-035-7879");
    record.set("batch_lot_no", "FM251115A");
    record.set("date_of_manufacture", "15/11/2025");
    let fields = DodLabelFields::from_record(&record);

    let a = engine.render(&fields);
    let b = engine.render(&fields);
    assert_eq!(a.as_raw(), b.as_raw());
}
