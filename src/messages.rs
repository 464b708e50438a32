//! User-facing prompt and alert texts.

/// Alert shown when a draft without model and VIN is added.
pub const MISSING_IDENTITY: &str = "Bitte geben Sie mindestens ein Modell oder eine VIN an.";

/// Alert shown when an export is requested for an empty list.
pub const EMPTY_LIST: &str = "Die Liste ist leer. Bitte fügen Sie zuerst Fahrzeuge hinzu.";

/// Generic alert for every other export failure.
pub const EXPORT_FAILED: &str = "Fehler beim Erstellen der PDF.";

/// Confirmation prompt shown before the list and the draft are cleared.
pub const CONFIRM_CLEAR: &str = "Komplette Liste und aktuelle Eingaben löschen?";

/// Placeholder printed for empty field values on the sheet.
pub const EMPTY_VALUE: &str = "-";

/// Text printed on the sheet when there are no records.
pub const EMPTY_SHEET: &str = "Keine Fahrzeuge auf der Liste.";

/// List entry title for records without a model.
pub const UNKNOWN_MODEL: &str = "Unbekanntes Modell";

/// List entry subtitle for records without a VIN.
pub const MISSING_VIN: &str = "KEINE VIN";
