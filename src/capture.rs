//! Rasterization of the rendered sheet.

use chrono::{Local, NaiveDate};
use image::{Rgb, RgbImage};
use log::debug;
use rusttype::{point, Scale};

use crate::elements::{Element, MM_PER_INCH, WHITE};
use crate::error::CaptureError;
use crate::export::ExportSettings;
use crate::fonts::FontSet;
use crate::model::VehicleRecord;
use crate::sheet::{SheetLayout, SheetRenderer};

/// Magnification applied on top of 96 px per inch.
pub const DEFAULT_CAPTURE_SCALE: f64 = 2.0;

const CSS_PX_PER_INCH: f64 = 96.0;

/// A captured raster, ready for pagination.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportUnit {
    image: RgbImage,
}

impl ExportUnit {
    /// Wraps `image`; both dimensions must be non-zero.
    pub fn new(image: RgbImage) -> Result<Self, CaptureError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(CaptureError::EmptyRegion { width, height });
        }
        Ok(Self { image })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Returns the raster.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

/// Turns the record list into a raster of the sheet.
pub trait SheetCapture {
    /// Renders the sheet for `records` and captures it.
    fn capture(&self, records: &[VehicleRecord]) -> Result<ExportUnit, CaptureError>;
}

impl<T: SheetCapture + ?Sized> SheetCapture for &T {
    fn capture(&self, records: &[VehicleRecord]) -> Result<ExportUnit, CaptureError> {
        (**self).capture(records)
    }
}

/// Lays out the sheet and paints it into an RGB image on a white background.
#[derive(Clone, Debug)]
pub struct RasterCapture {
    renderer: SheetRenderer,
    scale: f64,
    date: Option<NaiveDate>,
}

impl RasterCapture {
    /// Creates a capture service around `renderer`.
    pub fn new(renderer: SheetRenderer) -> Self {
        Self {
            renderer,
            scale: DEFAULT_CAPTURE_SCALE,
            date: None,
        }
    }

    /// Loads the fonts named by `settings` and builds the capture service.
    pub fn from_settings(settings: &ExportSettings) -> Result<Self, CaptureError> {
        let fonts = FontSet::load(settings.fonts_dir())?;
        let renderer = SheetRenderer::new(fonts, settings.letterhead().clone());
        Ok(Self::new(renderer).with_scale(settings.capture_scale()))
    }

    /// Sets the magnification and returns the updated service.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Pins the date printed on the sheet instead of using today's date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Paints `layout` into a raster.
    ///
    /// The pixel width is the sheet width at the configured scale, rounded;
    /// the height follows from the same pixel density, rounded down so a sheet
    /// of exactly one page never spills onto a second one.
    pub fn rasterize(&self, layout: &SheetLayout) -> Result<ExportUnit, CaptureError> {
        let nominal = self.scale * CSS_PX_PER_INCH / MM_PER_INCH;
        let width = pixels(layout.width_mm() * nominal, f64::round);
        let px_per_mm = if layout.width_mm() > 0.0 {
            f64::from(width) / layout.width_mm()
        } else {
            0.0
        };
        let height = pixels(layout.height_mm() * px_per_mm, f64::floor);
        if width == 0 || height == 0 {
            return Err(CaptureError::EmptyRegion { width, height });
        }

        let mut image = RgbImage::from_pixel(width, height, WHITE);
        for element in layout.elements() {
            match element {
                Element::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => fill_rect(&mut image, px_per_mm, [*x, *y, *width, *height], *color),
                Element::Text {
                    x,
                    baseline,
                    style,
                    text,
                } => {
                    let font = self.renderer.fonts().face(style.face);
                    let scale = Scale::uniform((style.size_mm * px_per_mm) as f32);
                    let origin = point((x * px_per_mm) as f32, (baseline * px_per_mm) as f32);
                    for glyph in font.layout(text, scale, origin) {
                        let Some(bounds) = glyph.pixel_bounding_box() else {
                            continue;
                        };
                        glyph.draw(|gx, gy, coverage| {
                            let px = bounds.min.x + gx as i32;
                            let py = bounds.min.y + gy as i32;
                            blend(&mut image, px, py, style.color, coverage);
                        });
                    }
                }
            }
        }

        debug!("captured sheet as {}x{} px", width, height);
        ExportUnit::new(image)
    }
}

impl SheetCapture for RasterCapture {
    fn capture(&self, records: &[VehicleRecord]) -> Result<ExportUnit, CaptureError> {
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        let layout = self.renderer.render(records, date);
        self.rasterize(&layout)
    }
}

fn pixels(value: f64, round: fn(f64) -> f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        round(value).min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

fn fill_rect(image: &mut RgbImage, px_per_mm: f64, [x, y, w, h]: [f64; 4], color: Rgb<u8>) {
    let span = |start: f64, length: f64, limit: u32| {
        let from = (start * px_per_mm).round().max(0.0);
        let to = ((start + length) * px_per_mm).round().max(from + 1.0);
        let limit = f64::from(limit);
        (from.min(limit) as u32, to.min(limit) as u32)
    };

    let (x0, x1) = span(x, w, image.width());
    let (y0, y1) = span(y, h, image.height());
    for py in y0..y1 {
        for px in x0..x1 {
            image.put_pixel(px, py, color);
        }
    }
}

fn blend(image: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= image.width() || y as u32 >= image.height() {
        return;
    }

    let coverage = coverage.clamp(0.0, 1.0);
    let pixel = image.get_pixel_mut(x as u32, y as u32);
    for (channel, target) in pixel.0.iter_mut().zip(color.0) {
        let mixed = f32::from(*channel) * (1.0 - coverage) + f32::from(target) * coverage;
        *channel = mixed.round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::{blend, fill_rect, ExportUnit};
    use crate::elements::{BLACK, WHITE};
    use crate::error::CaptureError;

    #[test]
    fn empty_images_are_rejected() {
        let result = ExportUnit::new(RgbImage::new(0, 10));
        assert!(matches!(
            result,
            Err(CaptureError::EmptyRegion {
                width: 0,
                height: 10
            })
        ));
    }

    #[test]
    fn thin_rectangles_cover_at_least_one_pixel() {
        let mut image = RgbImage::from_pixel(20, 20, WHITE);
        fill_rect(&mut image, 1.0, [5.0, 5.0, 0.1, 0.1], BLACK);
        assert_eq!(*image.get_pixel(5, 5), BLACK);
        assert_eq!(*image.get_pixel(6, 5), WHITE);
    }

    #[test]
    fn rectangles_are_clipped_to_the_image() {
        let mut image = RgbImage::from_pixel(10, 10, WHITE);
        fill_rect(&mut image, 1.0, [-5.0, 8.0, 30.0, 30.0], BLACK);
        assert_eq!(*image.get_pixel(0, 9), BLACK);
        assert_eq!(*image.get_pixel(9, 7), WHITE);
    }

    #[test]
    fn blending_mixes_towards_the_text_color() {
        let mut image = RgbImage::from_pixel(2, 2, WHITE);
        blend(&mut image, 0, 0, BLACK, 0.5);
        blend(&mut image, -1, 0, BLACK, 1.0);
        assert_eq!(*image.get_pixel(0, 0), Rgb([128, 128, 128]));
    }
}
