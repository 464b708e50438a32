//! Placement of one tall raster onto a sequence of fixed-size pages.
//!
//! No slicing happens here. Every page receives the whole image, shifted
//! upward by the height already shown on previous pages, and the page boundary
//! clips everything outside the current viewport.

use log::debug;

/// Physical page dimensions in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageFormat {
    width_mm: f64,
    height_mm: f64,
}

impl PageFormat {
    /// ISO A4 in portrait orientation.
    pub const A4: PageFormat = PageFormat {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    /// Creates a page format; both dimensions must be finite and positive.
    pub fn new(width_mm: f64, height_mm: f64) -> Option<Self> {
        let valid = |value: f64| value.is_finite() && value > 0.0;
        if valid(width_mm) && valid(height_mm) {
            Some(Self {
                width_mm,
                height_mm,
            })
        } else {
            None
        }
    }

    /// Returns the page width.
    pub fn width_mm(&self) -> f64 {
        self.width_mm
    }

    /// Returns the page height.
    pub fn height_mm(&self) -> f64 {
        self.height_mm
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::A4
    }
}

/// Continuation rule applied to the remaining image height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageBoundary {
    /// Keep adding pages while the remaining height is `>= 0`.
    ///
    /// Content that is an exact multiple of the page height ends with a blank page.
    #[default]
    Inclusive,
    /// Keep adding pages while the remaining height is `> 0`.
    Exclusive,
}

impl PageBoundary {
    fn continues(self, height_left: f64) -> bool {
        match self {
            PageBoundary::Inclusive => height_left >= 0.0,
            PageBoundary::Exclusive => height_left > 0.0,
        }
    }
}

/// Result of paginating an image.
#[derive(Clone, Debug, PartialEq)]
pub struct PagePlan {
    image_width_mm: f64,
    image_height_mm: f64,
    offsets_mm: Vec<f64>,
}

impl PagePlan {
    /// Width of the placed image, equal to the page width.
    pub fn image_width_mm(&self) -> f64 {
        self.image_width_mm
    }

    /// Height of the placed image after scaling to the page width.
    pub fn image_height_mm(&self) -> f64 {
        self.image_height_mm
    }

    /// Vertical offset of the image top edge on each page, measured downward
    /// from the page top. The first entry is always `0`.
    pub fn offsets_mm(&self) -> &[f64] {
        &self.offsets_mm
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.offsets_mm.len()
    }
}

/// Computes the page placements for an image of `width_px` x `height_px`.
///
/// The image is scaled to the full page width, keeping its aspect ratio. A zero
/// width yields a single page with a zero-height image.
pub fn paginate(
    width_px: u32,
    height_px: u32,
    format: PageFormat,
    boundary: PageBoundary,
) -> PagePlan {
    let image_width_mm = format.width_mm;
    let image_height_mm = if width_px == 0 {
        0.0
    } else {
        f64::from(height_px) * image_width_mm / f64::from(width_px)
    };

    let mut offsets_mm = vec![0.0];
    let mut height_left = image_height_mm - format.height_mm;
    while boundary.continues(height_left) {
        offsets_mm.push(height_left - image_height_mm);
        height_left -= format.height_mm;
    }

    debug!(
        "paginated {}x{} px image to {:.2} mm over {} page(s)",
        width_px,
        height_px,
        image_height_mm,
        offsets_mm.len()
    );

    PagePlan {
        image_width_mm,
        image_height_mm,
        offsets_mm,
    }
}

#[cfg(test)]
mod tests {
    use super::{paginate, PageBoundary, PageFormat};

    #[test]
    fn square_image_fits_on_one_page() {
        let plan = paginate(1000, 1000, PageFormat::A4, PageBoundary::Inclusive);
        assert_eq!(plan.image_width_mm(), 210.0);
        assert_eq!(plan.image_height_mm(), 210.0);
        assert_eq!(plan.offsets_mm(), &[0.0]);
    }

    #[test]
    fn tall_image_spans_four_pages() {
        // 210 x 900 mm after scaling
        let plan = paginate(70, 300, PageFormat::A4, PageBoundary::Inclusive);
        assert_eq!(plan.image_height_mm(), 900.0);
        assert_eq!(plan.offsets_mm(), &[0.0, -297.0, -594.0, -891.0]);
    }

    #[test]
    fn exact_multiple_keeps_trailing_page_when_inclusive() {
        let plan = paginate(210, 594, PageFormat::A4, PageBoundary::Inclusive);
        assert_eq!(plan.image_height_mm(), 594.0);
        assert_eq!(plan.offsets_mm(), &[0.0, -297.0, -594.0]);
    }

    #[test]
    fn exact_multiple_drops_trailing_page_when_exclusive() {
        let plan = paginate(210, 594, PageFormat::A4, PageBoundary::Exclusive);
        assert_eq!(plan.offsets_mm(), &[0.0, -297.0]);
    }

    #[test]
    fn single_page_height_gets_blank_second_page_when_inclusive() {
        let plan = paginate(210, 297, PageFormat::A4, PageBoundary::Inclusive);
        assert_eq!(plan.page_count(), 2);
        let plan = paginate(210, 297, PageFormat::A4, PageBoundary::Exclusive);
        assert_eq!(plan.page_count(), 1);
    }

    #[test]
    fn capture_sized_sheet_paginates_by_height() {
        // minimum sheet height at 2x capture of a 210 mm wide region
        let plan = paginate(1587, 2244, PageFormat::A4, PageBoundary::Inclusive);
        assert_eq!(plan.page_count(), 1);
        let plan = paginate(1587, 4000, PageFormat::A4, PageBoundary::Inclusive);
        assert_eq!(plan.page_count(), 2);
    }

    #[test]
    fn zero_width_yields_single_page() {
        let plan = paginate(0, 500, PageFormat::A4, PageBoundary::Inclusive);
        assert_eq!(plan.page_count(), 1);
        assert_eq!(plan.image_height_mm(), 0.0);
    }

    #[test]
    fn invalid_formats_are_rejected() {
        assert!(PageFormat::new(0.0, 297.0).is_none());
        assert!(PageFormat::new(210.0, -1.0).is_none());
        assert!(PageFormat::new(f64::NAN, 297.0).is_none());
        assert_eq!(PageFormat::new(210.0, 297.0), Some(PageFormat::A4));
    }
}
