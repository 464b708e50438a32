//! Error types for the vehicle sheet crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::messages;

/// Rejection of a draft commit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// Both model and VIN are empty.
    #[error("draft has neither a model nor a VIN")]
    MissingIdentity,
}

impl DraftError {
    /// Text shown to the user in the blocking alert.
    pub fn user_message(&self) -> &'static str {
        match self {
            DraftError::MissingIdentity => messages::MISSING_IDENTITY,
        }
    }
}

/// Failures while locating or parsing the sheet fonts.
#[derive(Debug, Error)]
pub enum FontError {
    /// No candidate directory held a complete font family.
    #[error("unable to locate sheet fonts; checked: {attempts}")]
    NotFound {
        /// Human readable summary of every location that was tried.
        attempts: String,
    },

    /// A font file could not be read.
    #[error("failed to read font file {path}")]
    Io {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A font file was read but is not a usable TrueType font.
    #[error("font file {path} is not a valid TrueType font")]
    Parse {
        /// Path of the rejected file.
        path: PathBuf,
    },
}

/// Failures of the capture step.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Fonts needed to lay out and rasterize the sheet are unavailable.
    #[error("sheet fonts unavailable")]
    Fonts(#[from] FontError),

    /// The rendered region has no area.
    #[error("captured region is empty ({width}x{height} px)")]
    EmptyRegion {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
}

/// Failures of the export flow.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The record list is empty.
    #[error("record list is empty")]
    EmptyList,

    /// Another export is still running.
    #[error("an export is already in progress")]
    InProgress,

    /// The sheet could not be captured.
    #[error("capture failed")]
    Capture(#[from] CaptureError),

    /// The PDF document could not be produced.
    #[error("failed to write PDF document: {0}")]
    Pdf(String),

    /// The output file could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The worker running the export went away without reporting a result.
    #[error("export worker stopped without a result")]
    WorkerLost,
}

impl ExportError {
    /// Text shown to the user in the blocking alert.
    ///
    /// Everything except the empty list collapses into the generic failure text.
    pub fn user_message(&self) -> &'static str {
        match self {
            ExportError::EmptyList => messages::EMPTY_LIST,
            _ => messages::EXPORT_FAILED,
        }
    }
}
