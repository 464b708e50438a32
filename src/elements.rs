//! Drawing primitives produced by the sheet renderer and consumed by the capture step.
//!
//! All coordinates are millimetres measured from the top-left corner of the
//! sheet. Text is stored per line with its baseline already resolved, so the
//! rasterizer never has to repeat the layout work.

use image::Rgb;
use rusttype::{point, Scale};

use crate::fonts::{Face, FontSet};

/// Millimetres per CSS pixel at 96 px per inch.
pub const MM_PER_CSS_PX: f64 = 25.4 / 96.0;

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Converts CSS pixels into millimetres.
pub fn css_px(value: f64) -> f64 {
    value * MM_PER_CSS_PX
}

/// Opaque black.
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
/// Opaque white.
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
/// Light grey used behind record headings.
pub const GREY_100: Rgb<u8> = Rgb([243, 244, 246]);
/// Lighter grey used behind table labels.
pub const GREY_50: Rgb<u8> = Rgb([249, 250, 251]);
/// Muted grey for secondary text.
pub const GREY_400: Rgb<u8> = Rgb([156, 163, 175]);
/// Dark grey for the signature role line.
pub const GREY_600: Rgb<u8> = Rgb([75, 85, 99]);

/// Font settings of a text run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Face used for the run.
    pub face: Face,
    /// Font size in millimetres.
    pub size_mm: f64,
    /// Distance between consecutive baselines in millimetres.
    pub line_height_mm: f64,
    /// Fill color.
    pub color: Rgb<u8>,
}

impl TextStyle {
    /// Creates a black style with the given face and CSS pixel metrics.
    pub fn css(face: Face, size_px: f64, line_height_px: f64) -> Self {
        Self {
            face,
            size_mm: css_px(size_px),
            line_height_mm: css_px(line_height_px),
            color: BLACK,
        }
    }

    /// Sets the color and returns the updated style.
    pub fn colored(mut self, color: Rgb<u8>) -> Self {
        self.color = color;
        self
    }
}

/// A single primitive on the sheet.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    /// Filled axis-aligned rectangle.
    Rect {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
        /// Fill color.
        color: Rgb<u8>,
    },
    /// One line of text.
    Text {
        /// Left edge of the first glyph.
        x: f64,
        /// Baseline position.
        baseline: f64,
        /// Font settings.
        style: TextStyle,
        /// Text without line breaks.
        text: String,
    },
}

/// Horizontal placement of a line inside a box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Horizontal extent of a text box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Column {
    /// Left edge.
    pub left: f64,
    /// Available width.
    pub width: f64,
}

impl Column {
    /// Creates a column from its left edge and width.
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    /// Shrinks the column by `padding` on both sides.
    pub fn inset(self, padding: f64) -> Self {
        Self {
            left: self.left + padding,
            width: (self.width - 2.0 * padding).max(0.0),
        }
    }
}

/// Measures text with the loaded fonts.
#[derive(Clone, Copy)]
pub struct TextMetrics<'a> {
    fonts: &'a FontSet,
}

impl<'a> TextMetrics<'a> {
    /// Creates a measuring helper over `fonts`.
    pub fn new(fonts: &'a FontSet) -> Self {
        Self { fonts }
    }

    /// Width of `text` set in `style`, in millimetres.
    pub fn width(&self, text: &str, style: &TextStyle) -> f64 {
        let font = self.fonts.face(style.face);
        let scale = Scale::uniform(style.size_mm as f32);
        font.layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|glyph| {
                let advance = glyph.unpositioned().h_metrics().advance_width;
                f64::from(glyph.position().x + advance)
            })
            .unwrap_or(0.0)
    }

    /// Baseline offset from the top of a line box of `style`.
    ///
    /// The glyph box is centered vertically inside the line height.
    pub fn baseline_offset(&self, style: &TextStyle) -> f64 {
        let font = self.fonts.face(style.face);
        let v_metrics = font.v_metrics(Scale::uniform(style.size_mm as f32));
        let ascent = f64::from(v_metrics.ascent);
        let glyph_height = ascent - f64::from(v_metrics.descent);
        (style.line_height_mm - glyph_height) / 2.0 + ascent
    }

    /// Breaks `text` into lines no wider than `max_width`.
    ///
    /// Explicit line breaks are kept, words are never reordered and a single
    /// word wider than the box is split between characters.
    pub fn wrap(&self, text: &str, style: &TextStyle, max_width: f64) -> Vec<String> {
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
            let mut current = String::new();

            for word in paragraph.split(' ') {
                let candidate = if current.is_empty() {
                    word.to_owned()
                } else {
                    format!("{current} {word}")
                };

                if self.width(&candidate, style) <= max_width {
                    current = candidate;
                    continue;
                }

                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }

                if self.width(word, style) <= max_width {
                    current = word.to_owned();
                } else {
                    let mut pieces = self.split_word(word, style, max_width);
                    current = pieces.pop().unwrap_or_default();
                    lines.extend(pieces);
                }
            }

            lines.push(current);
        }

        lines
    }

    fn split_word(&self, word: &str, style: &TextStyle, max_width: f64) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut current = String::new();

        for ch in word.chars() {
            current.push(ch);
            if current.chars().count() > 1 && self.width(&current, style) > max_width {
                current.pop();
                pieces.push(std::mem::take(&mut current));
                current.push(ch);
            }
        }

        pieces.push(current);
        pieces
    }
}

/// Accumulates elements in drawing order.
#[derive(Debug, Default)]
pub struct Canvas {
    elements: Vec<Element>,
}

impl Canvas {
    /// Creates an empty canvas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filled rectangle.
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb<u8>) {
        if width > 0.0 && height > 0.0 {
            self.elements.push(Element::Rect {
                x,
                y,
                width,
                height,
                color,
            });
        }
    }

    /// Draws the four edges of a box as rectangles of `thickness` inside its bounds.
    pub fn frame(&mut self, x: f64, y: f64, width: f64, height: f64, thickness: f64) {
        self.rect(x, y, width, thickness, BLACK);
        self.rect(x, y + height - thickness, width, thickness, BLACK);
        self.rect(x, y, thickness, height, BLACK);
        self.rect(x + width - thickness, y, thickness, height, BLACK);
    }

    /// Places `lines` inside `column` starting at `top`, one line box each.
    ///
    /// Returns the total height consumed.
    pub fn lines(
        &mut self,
        metrics: &TextMetrics<'_>,
        lines: &[String],
        style: TextStyle,
        column: Column,
        top: f64,
        align: Align,
    ) -> f64 {
        let Column { left, width } = column;
        let baseline_offset = metrics.baseline_offset(&style);

        for (index, line) in lines.iter().enumerate() {
            let line_top = top + style.line_height_mm * index as f64;
            let x = match align {
                Align::Left => left,
                Align::Center => left + (width - metrics.width(line, &style)) / 2.0,
                Align::Right => left + width - metrics.width(line, &style),
            };
            if !line.is_empty() {
                self.elements.push(Element::Text {
                    x,
                    baseline: line_top + baseline_offset,
                    style,
                    text: line.clone(),
                });
            }
        }

        style.line_height_mm * lines.len() as f64
    }

    /// Returns the collected elements.
    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }
}

#[cfg(test)]
mod tests {
    use super::{css_px, Canvas, BLACK};
    use crate::elements::Element;

    #[test]
    fn css_pixels_convert_to_millimetres() {
        assert!((css_px(96.0) - 25.4).abs() < 1e-9);
    }

    #[test]
    fn frame_emits_four_edges() {
        let mut canvas = Canvas::new();
        canvas.frame(10.0, 10.0, 50.0, 20.0, 0.5);
        let elements = canvas.into_elements();
        assert_eq!(elements.len(), 4);
        assert!(elements
            .iter()
            .all(|element| matches!(element, Element::Rect { color, .. } if *color == BLACK)));
    }

    #[test]
    fn degenerate_rectangles_are_skipped() {
        let mut canvas = Canvas::new();
        canvas.rect(0.0, 0.0, 0.0, 10.0, BLACK);
        canvas.rect(0.0, 0.0, 10.0, -1.0, BLACK);
        assert!(canvas.into_elements().is_empty());
    }
}
