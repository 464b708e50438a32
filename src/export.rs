//! Export of the record list into a paged PDF file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, error, info, warn};

use crate::builder::PdfBuilder;
use crate::capture::{SheetCapture, DEFAULT_CAPTURE_SCALE};
use crate::error::ExportError;
use crate::model::VehicleRecord;
use crate::paginate::{PageBoundary, PageFormat};
use crate::sheet::Letterhead;

/// File name prefix used when none is configured.
pub const DEFAULT_FILE_PREFIX: &str = "Liste_Autohaus_Radtke";

const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Everything that influences an export apart from the records themselves.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportSettings {
    output_dir: PathBuf,
    file_prefix: String,
    page_format: PageFormat,
    boundary: PageBoundary,
    capture_scale: f64,
    fonts_dir: Option<PathBuf>,
    letterhead: Letterhead,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_prefix: DEFAULT_FILE_PREFIX.to_owned(),
            page_format: PageFormat::A4,
            boundary: PageBoundary::default(),
            capture_scale: DEFAULT_CAPTURE_SCALE,
            fonts_dir: None,
            letterhead: Letterhead::default(),
        }
    }
}

impl ExportSettings {
    /// Creates settings with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory the PDF files are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Prefix of every generated file name.
    pub fn file_prefix(&self) -> &str {
        &self.file_prefix
    }

    /// Page format of the generated document.
    pub fn page_format(&self) -> PageFormat {
        self.page_format
    }

    /// Continuation rule of the paginator.
    pub fn boundary(&self) -> PageBoundary {
        self.boundary
    }

    /// Capture magnification.
    pub fn capture_scale(&self) -> f64 {
        self.capture_scale
    }

    /// Explicit fonts directory, if any.
    pub fn fonts_dir(&self) -> Option<&Path> {
        self.fonts_dir.as_deref()
    }

    /// Texts printed on the sheet.
    pub fn letterhead(&self) -> &Letterhead {
        &self.letterhead
    }

    /// Sets the output directory and returns the updated settings.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Sets the file name prefix and returns the updated settings.
    pub fn with_file_prefix(mut self, file_prefix: impl Into<String>) -> Self {
        self.file_prefix = file_prefix.into();
        self
    }

    /// Sets the page format and returns the updated settings.
    pub fn with_page_format(mut self, page_format: PageFormat) -> Self {
        self.page_format = page_format;
        self
    }

    /// Sets the pagination rule and returns the updated settings.
    pub fn with_boundary(mut self, boundary: PageBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Sets the capture magnification and returns the updated settings.
    pub fn with_capture_scale(mut self, capture_scale: f64) -> Self {
        self.capture_scale = capture_scale;
        self
    }

    /// Sets the fonts directory and returns the updated settings.
    pub fn with_fonts_dir(mut self, fonts_dir: impl Into<Option<PathBuf>>) -> Self {
        self.fonts_dir = fonts_dir.into();
        self
    }

    /// Sets the letterhead and returns the updated settings.
    pub fn with_letterhead(mut self, letterhead: Letterhead) -> Self {
        self.letterhead = letterhead;
        self
    }

    /// File name for an export started at `timestamp_millis` (Unix epoch).
    pub fn file_name(&self, timestamp_millis: i64) -> String {
        format!("{}_{}.pdf", self.file_prefix, timestamp_millis)
    }

    fn numbered_file_name(&self, timestamp_millis: i64, number: u32) -> String {
        format!("{}_{}_{}.pdf", self.file_prefix, timestamp_millis, number)
    }
}

/// Summary of a finished export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOutcome {
    path: PathBuf,
    page_count: usize,
    byte_len: usize,
}

impl ExportOutcome {
    /// Location of the written file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Size of the written file.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

/// Runs the capture, pagination and file writing steps.
#[derive(Clone, Debug)]
pub struct Exporter<C> {
    capture: C,
    settings: ExportSettings,
}

impl<C: SheetCapture> Exporter<C> {
    /// Creates an exporter using `capture` to obtain the raster.
    pub fn new(capture: C, settings: ExportSettings) -> Self {
        Self { capture, settings }
    }

    /// Returns the settings.
    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Exports `records` into a new PDF file.
    ///
    /// Nothing is written unless every step succeeds.
    pub fn export(&self, records: &[VehicleRecord]) -> Result<ExportOutcome, ExportError> {
        self.export_at(records, Utc::now().timestamp_millis())
    }

    /// Exports `records` into a file named after `timestamp_millis`.
    ///
    /// An existing file is never replaced; a numeric suffix is appended
    /// until the name is free.
    pub fn export_at(
        &self,
        records: &[VehicleRecord],
        timestamp_millis: i64,
    ) -> Result<ExportOutcome, ExportError> {
        if records.is_empty() {
            return Err(ExportError::EmptyList);
        }

        let unit = self.capture.capture(records)?;
        let pdf = PdfBuilder::new()
            .with_title(self.settings.letterhead.title())
            .with_page_format(self.settings.page_format)
            .with_page_boundary(self.settings.boundary)
            .render(&unit)?;

        fs::create_dir_all(&self.settings.output_dir)?;
        let (path, mut file) = self.create_output(timestamp_millis)?;

        let written = file.write_all(&pdf.bytes).and_then(|()| file.sync_all());
        if let Err(err) = written {
            error!("failed to write {}: {}", path.display(), err);
            drop(file);
            match fs::remove_file(&path) {
                Err(cleanup) if cleanup.kind() != io::ErrorKind::NotFound => {
                    warn!("could not remove partial file {}: {}", path.display(), cleanup);
                }
                _ => {}
            }
            return Err(err.into());
        }

        info!(
            "Generated {} ({} bytes, {} page(s))",
            path.display(),
            pdf.bytes.len(),
            pdf.plan.page_count()
        );

        Ok(ExportOutcome {
            path,
            page_count: pdf.plan.page_count(),
            byte_len: pdf.bytes.len(),
        })
    }

    fn create_output(&self, timestamp_millis: i64) -> io::Result<(PathBuf, File)> {
        let mut attempt = 0;
        loop {
            let name = if attempt == 0 {
                self.settings.file_name(timestamp_millis)
            } else {
                self.settings.numbered_file_name(timestamp_millis, attempt)
            };
            let path = self.settings.output_dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(err)
                    if err.kind() == io::ErrorKind::AlreadyExists
                        && attempt < MAX_NAME_ATTEMPTS =>
                {
                    debug!("{} exists, trying next suffix", path.display());
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use image::RgbImage;

    use super::{ExportSettings, Exporter, DEFAULT_FILE_PREFIX};
    use crate::capture::{ExportUnit, SheetCapture, DEFAULT_CAPTURE_SCALE};
    use crate::elements::WHITE;
    use crate::error::CaptureError;
    use crate::model::{VehicleField, VehicleRecord};
    use crate::sheet::Letterhead;

    struct BlankCapture;

    impl SheetCapture for BlankCapture {
        fn capture(&self, _records: &[VehicleRecord]) -> Result<ExportUnit, CaptureError> {
            ExportUnit::new(RgbImage::from_pixel(21, 20, WHITE))
        }
    }

    fn records() -> Vec<VehicleRecord> {
        vec![VehicleRecord::new().with(VehicleField::Model, "Corsa")]
    }

    #[test]
    fn same_timestamp_never_overwrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exporter = Exporter::new(
            BlankCapture,
            ExportSettings::new()
                .with_output_dir(dir.path())
                .with_file_prefix("Liste"),
        );

        let first = exporter.export_at(&records(), 42).expect("first export");
        let second = exporter.export_at(&records(), 42).expect("second export");
        let third = exporter.export_at(&records(), 42).expect("third export");

        assert_eq!(first.path(), dir.path().join("Liste_42.pdf"));
        assert_eq!(second.path(), dir.path().join("Liste_42_1.pdf"));
        assert_eq!(third.path(), dir.path().join("Liste_42_2.pdf"));
        for outcome in [&first, &second, &third] {
            let len = std::fs::metadata(outcome.path()).expect("metadata").len();
            assert_eq!(len as usize, outcome.byte_len());
        }
    }

    #[test]
    fn settings_carry_letterhead_and_scale() {
        let letterhead = Letterhead::default()
            .with_company("Autohaus Nord")
            .with_signature("Erika Muster", "Leitung");
        let settings = ExportSettings::new()
            .with_letterhead(letterhead.clone())
            .with_capture_scale(1.5);

        assert_eq!(settings.letterhead(), &letterhead);
        assert_eq!(settings.capture_scale(), 1.5);
        assert_eq!(ExportSettings::new().capture_scale(), DEFAULT_CAPTURE_SCALE);
    }

    #[test]
    fn file_name_combines_prefix_and_timestamp() {
        let settings = ExportSettings::new();
        assert_eq!(
            settings.file_name(1_700_000_000_123),
            format!("{DEFAULT_FILE_PREFIX}_1700000000123.pdf")
        );
        let settings = settings.with_file_prefix("Bestand");
        assert_eq!(settings.file_name(5), "Bestand_5.pdf");
    }
}
