//! Construction of paged PDF documents from a captured sheet.

use std::collections::BTreeMap;
use std::io::{BufWriter, Cursor};

use image::DynamicImage;
use log::debug;
use lopdf::{Document, Object, ObjectId, Stream};
use printpdf::{Image, Mm, PdfDocument};

use crate::capture::ExportUnit;
use crate::elements::MM_PER_INCH;
use crate::error::ExportError;
use crate::paginate::{paginate, PageBoundary, PageFormat, PagePlan};

const LAYER_NAME: &str = "Sheet";

/// Rendered PDF bytes together with the page plan they were built from.
#[derive(Clone, Debug)]
pub struct PdfOutput {
    /// Complete PDF file contents.
    pub bytes: Vec<u8>,
    /// Placement used for every page.
    pub plan: PagePlan,
}

/// Builder for PDF documents that show one tall image across several pages.
#[derive(Clone, Debug)]
pub struct PdfBuilder {
    title: String,
    page_format: PageFormat,
    boundary: PageBoundary,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self {
            title: "Fahrzeugliste".to_owned(),
            page_format: PageFormat::A4,
            boundary: PageBoundary::default(),
        }
    }
}

impl PdfBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the page format used for every page.
    pub fn with_page_format(mut self, page_format: PageFormat) -> Self {
        self.page_format = page_format;
        self
    }

    /// Sets the rule deciding whether another page is added.
    pub fn with_page_boundary(mut self, boundary: PageBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Paginates `unit` and renders the document.
    ///
    /// Each page receives the complete image scaled to the page width and
    /// shifted up by the height already shown; the page edge clips the rest.
    pub fn render(&self, unit: &ExportUnit) -> Result<PdfOutput, ExportError> {
        let plan = paginate(
            unit.width(),
            unit.height(),
            self.page_format,
            self.boundary,
        );
        let page_width = self.page_format.width_mm();
        let page_height = self.page_format.height_mm();

        // printpdf sizes images by dpi; pick the one that maps the pixel width onto the page width
        let dpi = f64::from(unit.width()) * MM_PER_INCH / plan.image_width_mm();
        let dynamic = DynamicImage::ImageRgb8(unit.image().clone());

        let (document, first_page, first_layer) = PdfDocument::new(
            self.title.clone(),
            Mm(page_width),
            Mm(page_height),
            LAYER_NAME,
        );

        let mut pages = vec![(first_page, first_layer)];
        for _ in 1..plan.page_count() {
            pages.push(document.add_page(Mm(page_width), Mm(page_height), LAYER_NAME));
        }

        for ((page, layer), offset) in pages.into_iter().zip(plan.offsets_mm()) {
            let layer = document.get_page(page).get_layer(layer);

            // PDF origin is bottom-left; `offset` is the image top measured from the page top
            let bottom = page_height - (offset + plan.image_height_mm());
            Image::from_dynamic_image(&dynamic).add_to_layer(
                layer,
                Some(Mm(0.0)),
                Some(Mm(bottom)),
                None,
                None,
                None,
                Some(dpi),
            );
        }

        let mut writer = BufWriter::new(Cursor::new(Vec::new()));
        document
            .save(&mut writer)
            .map_err(|err| ExportError::Pdf(format!("{err:?}")))?;
        let raw = writer
            .into_inner()
            .map_err(|err| ExportError::Io(err.into_error()))?
            .into_inner();
        let bytes = compact(&raw)?;

        debug!(
            "rendered {} page(s), {} bytes ({} before compaction), image placed at {:.1} dpi",
            plan.page_count(),
            bytes.len(),
            raw.len(),
            dpi
        );

        Ok(PdfOutput { bytes, plan })
    }
}

/// Stores the page raster once and compresses every stream.
///
/// printpdf embeds a separate image object for each placement; all pages
/// are redirected to the first copy of identical images before saving.
fn compact(pdf_bytes: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut document = Document::load_mem(pdf_bytes).map_err(pdf_error)?;

    let removed = share_identical_images(&mut document);
    for object in document.objects.values_mut() {
        if let Object::Stream(stream) = object {
            // XMP metadata stays readable as plain text
            if has_name(stream, b"Type", b"Metadata") {
                stream.allows_compression = false;
            }
        }
    }
    document.compress();

    let mut buffer = Vec::new();
    document.save_to(&mut buffer).map_err(pdf_error)?;
    debug!("merged {} duplicate image object(s)", removed);
    Ok(buffer)
}

fn pdf_error(err: impl std::fmt::Debug) -> ExportError {
    ExportError::Pdf(format!("{err:?}"))
}

fn share_identical_images(document: &mut Document) -> usize {
    let mut kept: Vec<ObjectId> = Vec::new();
    let mut duplicates: BTreeMap<ObjectId, ObjectId> = BTreeMap::new();

    for (&id, object) in &document.objects {
        let Object::Stream(stream) = object else {
            continue;
        };
        if !is_image(stream) {
            continue;
        }
        let first = kept.iter().copied().find(|candidate| {
            matches!(
                document.objects.get(candidate),
                Some(Object::Stream(other)) if same_image(other, stream)
            )
        });
        match first {
            Some(first) => {
                duplicates.insert(id, first);
            }
            None => kept.push(id),
        }
    }

    if duplicates.is_empty() {
        return 0;
    }

    for object in document.objects.values_mut() {
        redirect(object, &duplicates);
    }
    for id in duplicates.keys() {
        document.objects.remove(id);
    }
    duplicates.len()
}

fn is_image(stream: &Stream) -> bool {
    has_name(stream, b"Subtype", b"Image")
}

fn has_name(stream: &Stream, key: &[u8], expected: &[u8]) -> bool {
    matches!(
        stream.dict.get(key).and_then(|value| value.as_name()),
        Ok(name) if name == expected
    )
}

fn same_image(a: &Stream, b: &Stream) -> bool {
    let dimension = |stream: &Stream, key: &[u8]| {
        stream.dict.get(key).and_then(|value| value.as_i64()).ok()
    };
    dimension(a, b"Width") == dimension(b, b"Width")
        && dimension(a, b"Height") == dimension(b, b"Height")
        && a.content == b.content
}

fn redirect(object: &mut Object, targets: &BTreeMap<ObjectId, ObjectId>) {
    match object {
        Object::Reference(id) => {
            if let Some(target) = targets.get(id) {
                *id = *target;
            }
        }
        Object::Array(items) => {
            for item in items {
                redirect(item, targets);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                redirect(value, targets);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                redirect(value, targets);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use image::RgbImage;
    use lopdf::{Document, Object};

    use super::PdfBuilder;
    use crate::capture::ExportUnit;
    use crate::elements::{BLACK, WHITE};

    fn image_objects(document: &Document) -> usize {
        document
            .objects
            .values()
            .filter(|object| match object {
                Object::Stream(stream) => super::is_image(stream),
                _ => false,
            })
            .count()
    }

    fn striped_unit(width: u32, height: u32) -> ExportUnit {
        let image =
            RgbImage::from_fn(width, height, |_, y| if y % 40 < 20 { WHITE } else { BLACK });
        ExportUnit::new(image).expect("non-empty raster")
    }

    #[test]
    fn raster_is_stored_once_for_all_pages() {
        let unit = striped_unit(200, 3000);
        let pdf = PdfBuilder::new().render(&unit).expect("render");

        let document = Document::load_mem(&pdf.bytes).expect("parse");
        assert_eq!(pdf.plan.page_count(), 11);
        assert_eq!(document.get_pages().len(), 11);
        assert_eq!(image_objects(&document), 1);
    }

    #[test]
    fn output_is_smaller_than_one_raw_raster() {
        let unit = striped_unit(400, 2000);
        let raw_len = (unit.width() * unit.height() * 3) as usize;

        let pdf = PdfBuilder::new().render(&unit).expect("render");

        assert!(pdf.plan.page_count() > 1);
        assert!(pdf.bytes.len() < raw_len, "{} >= {}", pdf.bytes.len(), raw_len);
    }

    #[test]
    fn single_page_keeps_its_image() {
        let unit = striped_unit(210, 200);
        let pdf = PdfBuilder::new().render(&unit).expect("render");

        let document = Document::load_mem(&pdf.bytes).expect("parse");
        assert_eq!(document.get_pages().len(), 1);
        assert_eq!(image_objects(&document), 1);
    }
}
