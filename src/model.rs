//! Data structures describing the vehicle records collected by the application.
//!
//! A [`VehicleRecord`] has no identity of its own; its position in the record
//! list is the only thing that distinguishes two otherwise equal entries.

use std::fmt;

/// The five attributes captured for every vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VehicleField {
    /// Model name, e.g. "Corsa".
    Model,
    /// Vehicle identification number.
    Vin,
    /// Equipment line, e.g. "GS Line".
    EquipmentLine,
    /// Engine description.
    Engine,
    /// Free text, line breaks are preserved.
    SpecialEquipment,
}

impl VehicleField {
    /// All fields in form and sheet order.
    pub const ALL: [VehicleField; 5] = [
        VehicleField::Model,
        VehicleField::Vin,
        VehicleField::EquipmentLine,
        VehicleField::Engine,
        VehicleField::SpecialEquipment,
    ];

    /// Label shown next to the input in the form.
    pub fn form_label(self) -> &'static str {
        match self {
            VehicleField::Model => "Modell",
            VehicleField::Vin => "VIN Nummer",
            VehicleField::EquipmentLine => "Ausstattungslinie",
            VehicleField::Engine => "Motor",
            VehicleField::SpecialEquipment => "Sonderausstattung (Freitext)",
        }
    }

    /// Label printed in the first column of the sheet table.
    pub fn sheet_label(self) -> &'static str {
        match self {
            VehicleField::Model => "Modell",
            VehicleField::Vin => "VIN Nummer",
            VehicleField::EquipmentLine => "Ausstattung",
            VehicleField::Engine => "Motorisierung",
            VehicleField::SpecialEquipment => "Sonderausstattung",
        }
    }

    /// Hint text for an empty input.
    pub fn placeholder(self) -> &'static str {
        match self {
            VehicleField::Model => "z.B. Corsa",
            VehicleField::Vin => "W0V...",
            VehicleField::EquipmentLine => "z.B. GS Line",
            VehicleField::Engine => "z.B. 1.2 Turbo",
            VehicleField::SpecialEquipment => "Klimaautomatik, Sitzheizung, etc...",
        }
    }

    /// Returns whether the field is edited with a multi-line input.
    pub fn is_multiline(self) -> bool {
        matches!(self, VehicleField::SpecialEquipment)
    }
}

impl fmt::Display for VehicleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_label())
    }
}

/// A single vehicle entry.
///
/// Committed records are only handed out by shared reference, so they cannot
/// change after being added to the list. The same type doubles as the draft
/// buffer edited through [`VehicleRecord::set`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VehicleRecord {
    model: String,
    vin: String,
    equipment_line: String,
    engine: String,
    special_equipment: String,
}

impl VehicleRecord {
    /// Creates a record with all fields empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored for `field`.
    pub fn get(&self, field: VehicleField) -> &str {
        match field {
            VehicleField::Model => &self.model,
            VehicleField::Vin => &self.vin,
            VehicleField::EquipmentLine => &self.equipment_line,
            VehicleField::Engine => &self.engine,
            VehicleField::SpecialEquipment => &self.special_equipment,
        }
    }

    /// Replaces the value stored for `field`, leaving all other fields untouched.
    pub fn set(&mut self, field: VehicleField, value: impl Into<String>) {
        let slot = match field {
            VehicleField::Model => &mut self.model,
            VehicleField::Vin => &mut self.vin,
            VehicleField::EquipmentLine => &mut self.equipment_line,
            VehicleField::Engine => &mut self.engine,
            VehicleField::SpecialEquipment => &mut self.special_equipment,
        };
        *slot = value.into();
    }

    /// Sets `field` and returns the updated record.
    pub fn with(mut self, field: VehicleField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Returns the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the VIN.
    pub fn vin(&self) -> &str {
        &self.vin
    }

    /// Returns the equipment line.
    pub fn equipment_line(&self) -> &str {
        &self.equipment_line
    }

    /// Returns the engine description.
    pub fn engine(&self) -> &str {
        &self.engine
    }

    /// Returns the special equipment text.
    pub fn special_equipment(&self) -> &str {
        &self.special_equipment
    }

    /// Returns whether at least one of model or VIN is present.
    ///
    /// Whitespace counts as content.
    pub fn has_identity(&self) -> bool {
        !self.model.is_empty() || !self.vin.is_empty()
    }

    /// Returns whether every field is empty.
    pub fn is_blank(&self) -> bool {
        VehicleField::ALL
            .iter()
            .all(|field| self.get(*field).is_empty())
    }
}
