//! Layout of the printable vehicle sheet.
//!
//! The sheet is a fixed 210 mm wide column with a letterhead, a title row
//! carrying the date, one bordered table per record and a signature block. It
//! is at least one A4 page tall and grows with the number of records; cutting
//! it into pages is left to [`crate::paginate`].

use chrono::NaiveDate;
use log::debug;

use crate::elements::{
    css_px, Align, Canvas, Column, Element, TextMetrics, TextStyle, BLACK, GREY_100, GREY_400,
    GREY_50, GREY_600,
};
use crate::fonts::{Face, FontSet};
use crate::messages;
use crate::model::{VehicleField, VehicleRecord};

/// Sheet width in millimetres.
pub const SHEET_WIDTH_MM: f64 = 210.0;

/// Minimum sheet height in millimetres.
pub const SHEET_MIN_HEIGHT_MM: f64 = 297.0;

/// Padding on all four sides in millimetres.
pub const SHEET_PADDING_MM: f64 = 25.0;

/// Fixed texts printed on every sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Letterhead {
    company: String,
    tagline: String,
    title: String,
    signer: String,
    role: String,
}

impl Default for Letterhead {
    fn default() -> Self {
        Self {
            company: "Autohaus Radtke GmbH".to_owned(),
            tagline: "Ihr Opel Partner".to_owned(),
            title: "Fahrzeugliste".to_owned(),
            signer: "Jan Radtke".to_owned(),
            role: "Geschäftsführer".to_owned(),
        }
    }
}

impl Letterhead {
    /// Returns the company name.
    pub fn company(&self) -> &str {
        &self.company
    }

    /// Returns the tagline printed under the company name.
    pub fn tagline(&self) -> &str {
        &self.tagline
    }

    /// Returns the sheet title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the name printed under the signature rule.
    pub fn signer(&self) -> &str {
        &self.signer
    }

    /// Returns the signer's role.
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Sets the company name and returns the updated letterhead.
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    /// Sets the tagline and returns the updated letterhead.
    pub fn with_tagline(mut self, tagline: impl Into<String>) -> Self {
        self.tagline = tagline.into();
        self
    }

    /// Sets the signer and role and returns the updated letterhead.
    pub fn with_signature(mut self, signer: impl Into<String>, role: impl Into<String>) -> Self {
        self.signer = signer.into();
        self.role = role.into();
        self
    }
}

/// A fully laid out sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetLayout {
    width_mm: f64,
    height_mm: f64,
    elements: Vec<Element>,
}

impl SheetLayout {
    /// Sheet width.
    pub fn width_mm(&self) -> f64 {
        self.width_mm
    }

    /// Sheet height, never below [`SHEET_MIN_HEIGHT_MM`].
    pub fn height_mm(&self) -> f64 {
        self.height_mm
    }

    /// Primitives in drawing order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Iterates over the text of every line on the sheet.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|element| match element {
            Element::Text { text, .. } => Some(text.as_str()),
            Element::Rect { .. } => None,
        })
    }
}

struct Styles {
    company: TextStyle,
    tagline: TextStyle,
    title: TextStyle,
    date: TextStyle,
    heading: TextStyle,
    label: TextStyle,
    empty: TextStyle,
    signer: TextStyle,
    role: TextStyle,
}

impl Styles {
    fn new() -> Self {
        Self {
            company: TextStyle::css(Face::Bold, 36.0, 40.0),
            tagline: TextStyle::css(Face::BoldItalic, 20.0, 28.0),
            title: TextStyle::css(Face::Bold, 30.0, 36.0),
            date: TextStyle::css(Face::Bold, 18.67, 28.0),
            heading: TextStyle::css(Face::Bold, 20.0, 28.0),
            label: TextStyle::css(Face::Bold, 14.0, 20.0),
            empty: TextStyle::css(Face::Italic, 18.67, 28.0).colored(GREY_400),
            signer: TextStyle::css(Face::Bold, 20.0, 28.0),
            role: TextStyle::css(Face::Bold, 14.0, 20.0).colored(GREY_600),
        }
    }

    fn value(field: VehicleField) -> TextStyle {
        match field {
            VehicleField::Model | VehicleField::Vin => TextStyle::css(Face::Regular, 20.0, 28.0),
            VehicleField::EquipmentLine | VehicleField::Engine => {
                TextStyle::css(Face::Regular, 18.0, 28.0)
            }
            VehicleField::SpecialEquipment => TextStyle::css(Face::Regular, 18.0, 29.25),
        }
    }
}

/// Lays out the record list as a sheet.
#[derive(Clone, Debug)]
pub struct SheetRenderer {
    fonts: FontSet,
    letterhead: Letterhead,
}

impl SheetRenderer {
    /// Creates a renderer using `fonts` for measuring text.
    pub fn new(fonts: FontSet, letterhead: Letterhead) -> Self {
        Self { fonts, letterhead }
    }

    /// Returns the fonts used for measuring, which the rasterizer must reuse.
    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    /// Returns the letterhead.
    pub fn letterhead(&self) -> &Letterhead {
        &self.letterhead
    }

    /// Produces the sheet for `records`, dated `date`.
    ///
    /// Returns only once every element is placed, so the result can be
    /// captured right away.
    pub fn render(&self, records: &[VehicleRecord], date: NaiveDate) -> SheetLayout {
        let pass = Pass {
            metrics: TextMetrics::new(&self.fonts),
            styles: Styles::new(),
            letterhead: &self.letterhead,
            content: Column::new(SHEET_PADDING_MM, SHEET_WIDTH_MM - 2.0 * SHEET_PADDING_MM),
        };
        let mut canvas = Canvas::new();

        let mut y = pass.header(&mut canvas, SHEET_PADDING_MM);
        y = pass.title_row(&mut canvas, y, date);

        if records.is_empty() {
            y = pass.empty_notice(&mut canvas, y);
        } else {
            for (index, record) in records.iter().enumerate() {
                if index > 0 {
                    y += css_px(48.0);
                }
                y = pass.record_block(&mut canvas, y, index, record);
            }
        }

        let signature = pass.signature_lines();
        let signature_height = signature.height(&pass.styles);
        let lowest_top = SHEET_MIN_HEIGHT_MM - SHEET_PADDING_MM - signature_height;
        let signature_top = (y + css_px(96.0)).max(lowest_top);
        pass.signature(&mut canvas, signature_top, &signature);

        let height_mm =
            (signature_top + signature_height + SHEET_PADDING_MM).max(SHEET_MIN_HEIGHT_MM);
        debug!(
            "laid out sheet for {} record(s): {:.1} mm tall",
            records.len(),
            height_mm
        );

        SheetLayout {
            width_mm: SHEET_WIDTH_MM,
            height_mm,
            elements: canvas.into_elements(),
        }
    }
}

struct Pass<'a> {
    metrics: TextMetrics<'a>,
    styles: Styles,
    letterhead: &'a Letterhead,
    content: Column,
}

struct SignatureLines {
    signer: Vec<String>,
    role: Vec<String>,
}

impl SignatureLines {
    fn height(&self, styles: &Styles) -> f64 {
        css_px(1.0)
            + css_px(8.0)
            + styles.signer.line_height_mm * self.signer.len() as f64
            + styles.role.line_height_mm * self.role.len() as f64
    }
}

impl Pass<'_> {
    fn text(
        &self,
        canvas: &mut Canvas,
        text: &str,
        style: TextStyle,
        column: Column,
        top: f64,
        align: Align,
    ) -> f64 {
        let lines = self.metrics.wrap(text, &style, column.width);
        canvas.lines(&self.metrics, &lines, style, column, top, align)
    }

    fn header(&self, canvas: &mut Canvas, top: f64) -> f64 {
        let company = self.letterhead.company.to_uppercase();
        let mut y = top;
        y += self.text(
            canvas,
            &company,
            self.styles.company,
            self.content,
            y,
            Align::Center,
        );
        y += css_px(8.0);
        canvas.rect(self.content.left, y, self.content.width, css_px(4.0), BLACK);
        y += css_px(4.0) + css_px(8.0);
        y += self.text(
            canvas,
            &self.letterhead.tagline,
            self.styles.tagline,
            self.content,
            y,
            Align::Center,
        );
        y + css_px(64.0)
    }

    fn title_row(&self, canvas: &mut Canvas, top: f64, date: NaiveDate) -> f64 {
        let title = self.letterhead.title.to_uppercase();
        let style = self.styles.title;
        canvas.lines(
            &self.metrics,
            &[title.clone()],
            style,
            self.content,
            top,
            Align::Left,
        );

        let underline_y = top + self.metrics.baseline_offset(&style) + css_px(8.0);
        let underline_width = self.metrics.width(&title, &style);
        canvas.rect(
            self.content.left,
            underline_y,
            underline_width,
            css_px(2.0),
            BLACK,
        );

        let row_height = style.line_height_mm.max(underline_y + css_px(2.0) - top);
        let date_text = format!("Datum: {}", date.format("%-d.%-m.%Y"));
        let date_style = self.styles.date;
        let date_top = top + row_height - date_style.line_height_mm;
        canvas.lines(
            &self.metrics,
            &[date_text],
            date_style,
            self.content,
            date_top,
            Align::Right,
        );

        top + row_height + css_px(48.0)
    }

    fn empty_notice(&self, canvas: &mut Canvas, top: f64) -> f64 {
        let y = top + css_px(80.0);
        y + self.text(
            canvas,
            messages::EMPTY_SHEET,
            self.styles.empty,
            self.content,
            y,
            Align::Center,
        )
    }

    fn record_block(
        &self,
        canvas: &mut Canvas,
        top: f64,
        index: usize,
        record: &VehicleRecord,
    ) -> f64 {
        let padding = css_px(8.0);
        let heading_style = self.styles.heading;
        let heading_height = heading_style.line_height_mm + 2.0 * padding;
        canvas.rect(
            self.content.left,
            top,
            self.content.width,
            heading_height,
            GREY_100,
        );
        canvas.rect(self.content.left, top, css_px(8.0), heading_height, BLACK);
        let heading_column = Column::new(
            self.content.left + css_px(8.0) + padding,
            self.content.width - css_px(8.0) - 2.0 * padding,
        );
        self.text(
            canvas,
            &format!("Fahrzeug #{}", index + 1),
            heading_style,
            heading_column,
            top + padding,
            Align::Left,
        );

        let mut y = top + heading_height + css_px(8.0);
        let border = css_px(2.0);
        for field in VehicleField::ALL {
            y += self.table_row(canvas, y, field, record.get(field)) - border;
        }
        y + border
    }

    /// Draws one label/value row and returns its height including both borders.
    fn table_row(&self, canvas: &mut Canvas, top: f64, field: VehicleField, value: &str) -> f64 {
        let border = css_px(2.0);
        let padding = css_px(16.0);
        let label_cell = Column::new(self.content.left, self.content.width / 3.0);
        let value_cell = Column::new(
            label_cell.left + label_cell.width - border,
            self.content.width - label_cell.width + border,
        );

        let label_style = self.styles.label;
        let value_style = Styles::value(field);
        let value = if value.is_empty() {
            messages::EMPTY_VALUE
        } else {
            value
        };

        let label_lines = self.metrics.wrap(
            &field.sheet_label().to_uppercase(),
            &label_style,
            label_cell.inset(border + padding).width,
        );
        let value_lines = self
            .metrics
            .wrap(value, &value_style, value_cell.inset(border + padding).width);

        let label_height = label_style.line_height_mm * label_lines.len() as f64;
        let value_height = value_style.line_height_mm * value_lines.len() as f64;
        let row_height = label_height.max(value_height) + 2.0 * (padding + border);

        canvas.rect(label_cell.left, top, label_cell.width, row_height, GREY_50);

        let label_top = if field.is_multiline() {
            top + border + padding
        } else {
            top + (row_height - label_height) / 2.0
        };
        canvas.lines(
            &self.metrics,
            &label_lines,
            label_style,
            label_cell.inset(border + padding),
            label_top,
            Align::Left,
        );
        canvas.lines(
            &self.metrics,
            &value_lines,
            value_style,
            value_cell.inset(border + padding),
            top + (row_height - value_height) / 2.0,
            Align::Left,
        );

        canvas.frame(label_cell.left, top, label_cell.width, row_height, border);
        canvas.frame(value_cell.left, top, value_cell.width, row_height, border);

        row_height
    }

    fn signature_lines(&self) -> SignatureLines {
        let width = self.content.width;
        let role =
            format!("{} | {}", self.letterhead.role, self.letterhead.company).to_uppercase();
        SignatureLines {
            signer: self
                .metrics
                .wrap(&self.letterhead.signer, &self.styles.signer, width),
            role: self.metrics.wrap(&role, &self.styles.role, width),
        }
    }

    fn signature(&self, canvas: &mut Canvas, top: f64, lines: &SignatureLines) {
        canvas.rect(self.content.left, top, css_px(320.0), css_px(1.0), BLACK);
        let mut y = top + css_px(1.0) + css_px(8.0);
        y += canvas.lines(
            &self.metrics,
            &lines.signer,
            self.styles.signer,
            self.content,
            y,
            Align::Left,
        );
        canvas.lines(
            &self.metrics,
            &lines.role,
            self.styles.role,
            self.content,
            y,
            Align::Left,
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{Letterhead, SheetRenderer, SHEET_MIN_HEIGHT_MM, SHEET_WIDTH_MM};
    use crate::elements::{Element, TextMetrics};
    use crate::fonts::FontSet;
    use crate::model::{VehicleField, VehicleRecord};

    fn renderer() -> Option<SheetRenderer> {
        match FontSet::load(None) {
            Ok(fonts) => Some(SheetRenderer::new(fonts, Letterhead::default())),
            Err(err) => {
                eprintln!("Skipping sheet layout test: {err}");
                None
            }
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).expect("valid date")
    }

    fn corsa() -> VehicleRecord {
        VehicleRecord::new()
            .with(VehicleField::Model, "Corsa")
            .with(VehicleField::Vin, "W0VZZZ12345678901")
    }

    #[test]
    fn short_list_fills_exactly_one_page() {
        let Some(renderer) = renderer() else { return };
        let layout = renderer.render(&[corsa()], date());

        assert_eq!(layout.width_mm(), SHEET_WIDTH_MM);
        assert_eq!(layout.height_mm(), SHEET_MIN_HEIGHT_MM);
    }

    #[test]
    fn sheet_grows_with_records() {
        let Some(renderer) = renderer() else { return };
        let records = vec![corsa(); 6];
        let layout = renderer.render(&records, date());

        assert!(layout.height_mm() > SHEET_MIN_HEIGHT_MM);
        assert!(layout.texts().any(|text| text == "Fahrzeug #6"));
    }

    #[test]
    fn empty_values_print_a_dash_and_date_is_unpadded() {
        let Some(renderer) = renderer() else { return };
        let record = VehicleRecord::new().with(VehicleField::Model, "Astra");
        let layout = renderer.render(&[record], date());
        let texts: Vec<_> = layout.texts().collect();

        assert_eq!(texts.iter().filter(|text| **text == "-").count(), 4);
        assert!(texts.contains(&"Datum: 7.3.2024"));
        assert!(texts.contains(&"AUTOHAUS RADTKE GMBH"));
        assert!(texts.iter().any(|text| text.starts_with("SONDER")));
    }

    #[test]
    fn special_equipment_keeps_line_breaks() {
        let Some(renderer) = renderer() else { return };
        let record = corsa().with(
            VehicleField::SpecialEquipment,
            "Sitzheizung\nAnhängerkupplung",
        );
        let layout = renderer.render(&[record], date());
        let texts: Vec<_> = layout.texts().collect();

        assert!(texts.contains(&"Sitzheizung"));
        assert!(texts.contains(&"Anhängerkupplung"));
    }

    #[test]
    fn empty_list_prints_notice() {
        let Some(renderer) = renderer() else { return };
        let layout = renderer.render(&[], date());
        assert!(layout.texts().any(|text| text == "Keine Fahrzeuge auf der Liste."));
    }

    #[test]
    fn wrapped_lines_fit_the_column() {
        let Some(renderer) = renderer() else { return };
        let metrics = TextMetrics::new(renderer.fonts());
        let style = crate::elements::TextStyle::css(crate::fonts::Face::Regular, 18.0, 28.0);
        let text = concat!(
            "Klimaautomatik Sitzheizung Lenkradheizung Rückfahrkamera ",
            "Einparkhilfe vorne und hinten Navigationssystem"
        );

        let lines = metrics.wrap(text, &style, 60.0);

        assert!(lines.len() > 1);
        assert!(lines.iter().all(|line| metrics.width(line, &style) <= 60.0));
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn all_elements_stay_inside_the_sheet_width() {
        let Some(renderer) = renderer() else { return };
        let record = corsa().with(VehicleField::SpecialEquipment, "X".repeat(400));
        let layout = renderer.render(&[record], date());

        for element in layout.elements() {
            if let Element::Rect { x, width, .. } = element {
                assert!(*x >= 0.0 && x + width <= SHEET_WIDTH_MM + 1e-9);
            }
        }
    }
}
