//! Vehicle list sheet with paged PDF export.
//!
//! Records are collected through [`app::SheetApp`], laid out as a printable
//! sheet by [`sheet::SheetRenderer`], rasterized by [`capture::RasterCapture`]
//! and sliced onto A4 pages by [`builder::PdfBuilder`].

pub mod app;
pub mod builder;
pub mod capture;
pub mod elements;
pub mod error;
pub mod export;
pub mod fonts;
pub mod messages;
pub mod model;
pub mod paginate;
pub mod sheet;
pub mod store;
