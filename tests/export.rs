use std::fs;
use std::path::Path;

use image::RgbImage;
use lopdf::Document;
use vehicle_sheet::app::SheetApp;
use vehicle_sheet::capture::{ExportUnit, SheetCapture};
use vehicle_sheet::elements::WHITE;
use vehicle_sheet::error::{CaptureError, ExportError};
use vehicle_sheet::export::{ExportSettings, Exporter};
use vehicle_sheet::messages;
use vehicle_sheet::model::{VehicleField, VehicleRecord};
use vehicle_sheet::paginate::PageBoundary;

/// Capture stand-in producing a blank raster of fixed size.
struct FixedCapture {
    width: u32,
    height: u32,
}

impl SheetCapture for FixedCapture {
    fn capture(&self, _records: &[VehicleRecord]) -> Result<ExportUnit, CaptureError> {
        ExportUnit::new(RgbImage::from_pixel(self.width, self.height, WHITE))
    }
}

struct FailingCapture;

impl SheetCapture for FailingCapture {
    fn capture(&self, _records: &[VehicleRecord]) -> Result<ExportUnit, CaptureError> {
        Err(CaptureError::EmptyRegion {
            width: 0,
            height: 0,
        })
    }
}

fn records() -> Vec<VehicleRecord> {
    vec![
        VehicleRecord::new()
            .with(VehicleField::Model, "Corsa")
            .with(VehicleField::Vin, "W0V0XEP68R4000001"),
        VehicleRecord::new().with(VehicleField::Model, "Astra"),
    ]
}

fn pdf_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read output dir")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".pdf"))
        .collect();
    names.sort();
    names
}

fn page_count(path: &Path) -> usize {
    let bytes = fs::read(path).expect("read pdf");
    Document::load_mem(&bytes).expect("parse pdf").get_pages().len()
}

#[test]
fn export_writes_one_file_with_all_pages() {
    let dir = tempfile::tempdir().expect("tempdir");
    let exporter = Exporter::new(
        FixedCapture {
            width: 70,
            height: 300,
        },
        ExportSettings::new().with_output_dir(dir.path()),
    );

    let outcome = exporter.export(&records()).expect("export");

    let files = pdf_files(dir.path());
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("Liste_Autohaus_Radtke_"));
    assert_eq!(outcome.page_count(), 4);
    assert_eq!(page_count(outcome.path()), 4);
    assert_eq!(
        fs::metadata(outcome.path()).expect("metadata").len() as usize,
        outcome.byte_len()
    );
}

#[test]
fn single_page_sheet_stays_on_one_page() {
    let dir = tempfile::tempdir().expect("tempdir");
    let exporter = Exporter::new(
        FixedCapture {
            width: 1587,
            height: 2244,
        },
        ExportSettings::new().with_output_dir(dir.path()),
    );

    let outcome = exporter.export(&records()).expect("export");

    assert_eq!(page_count(outcome.path()), 1);
}

#[test]
fn exclusive_boundary_drops_the_trailing_page() {
    let dir = tempfile::tempdir().expect("tempdir");
    let capture = FixedCapture {
        width: 210,
        height: 594,
    };

    let inclusive = Exporter::new(&capture, ExportSettings::new().with_output_dir(dir.path()))
        .export(&records())
        .expect("inclusive export");
    let exclusive = Exporter::new(
        &capture,
        ExportSettings::new()
            .with_output_dir(dir.path())
            .with_file_prefix("exclusive")
            .with_boundary(PageBoundary::Exclusive),
    )
    .export(&records())
    .expect("exclusive export");

    assert_eq!(page_count(inclusive.path()), 3);
    assert_eq!(page_count(exclusive.path()), 2);
}

#[test]
fn empty_list_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let exporter = Exporter::new(
        FixedCapture {
            width: 10,
            height: 10,
        },
        ExportSettings::new().with_output_dir(dir.path()),
    );

    let result = exporter.export(&[]);

    let err = result.expect_err("empty list is refused");
    assert!(matches!(err, ExportError::EmptyList));
    assert_eq!(err.user_message(), messages::EMPTY_LIST);
    assert!(pdf_files(dir.path()).is_empty());
}

#[test]
fn capture_failure_writes_nothing_and_resets_the_flag() {
    let dir = tempfile::tempdir().expect("tempdir");
    let exporter = Exporter::new(
        FailingCapture,
        ExportSettings::new().with_output_dir(dir.path()),
    );
    let mut app = SheetApp::new();
    app.set_field(VehicleField::Vin, "W0V");
    app.add_to_list().expect("add");

    let err = app.export_with(&exporter).expect_err("capture fails");

    assert!(matches!(err, ExportError::Capture(_)));
    assert_eq!(err.user_message(), messages::EXPORT_FAILED);
    assert!(!app.is_exporting());
    assert!(app.can_export());
    assert!(pdf_files(dir.path()).is_empty());
}

#[test]
fn output_directory_is_created() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("exports").join("heute");
    let exporter = Exporter::new(
        FixedCapture {
            width: 100,
            height: 100,
        },
        ExportSettings::new().with_output_dir(&nested),
    );

    let outcome = exporter.export(&records()).expect("export");

    assert!(outcome.path().starts_with(&nested));
    assert_eq!(pdf_files(&nested).len(), 1);
}
