//! Wire types for the hospital resources.
//!
//! Field names follow the backend's JSON. Optional fields the backend may
//! omit deserialize to `None`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// PATIENTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(alias = "patient_id")]
    pub id: i64,
    pub full_name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub presenting_complaint: Option<String>,
    #[serde(default)]
    pub triage_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewPatient {
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presenting_complaint: Option<String>,
}

/// Patient summary embedded in other records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRef {
    #[serde(alias = "id")]
    pub patient_id: i64,
    pub full_name: String,
}

// =============================================================================
// BEDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bed {
    pub bed_id: i64,
    pub bed_number: String,
    pub is_occupied: bool,
    #[serde(default)]
    pub patient_id: Option<i64>,
}

/// Body of a bed allocation update. `patient_id` is sent as `null` on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BedAllocation {
    pub is_occupied: bool,
    pub patient_id: Option<i64>,
}

impl BedAllocation {
    #[must_use]
    pub fn assign(patient_id: i64) -> Self {
        Self { is_occupied: true, patient_id: Some(patient_id) }
    }

    #[must_use]
    pub fn release() -> Self {
        Self { is_occupied: false, patient_id: None }
    }
}

// =============================================================================
// APPOINTMENTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown appointment status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: i64,
    pub appointment_date: String,
    #[serde(default)]
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub patient: Option<PatientRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAppointment {
    pub patient_id: i64,
    /// ISO-8601 date-time.
    pub appointment_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// =============================================================================
// PRESCRIPTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    pub prescription_id: i64,
    pub medication: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPrescription {
    pub patient_id: i64,
    pub medication: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

// =============================================================================
// DOCUMENTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub document_id: i64,
    pub document_name: String,
    pub document_type: String,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

/// File to attach to a patient record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub patient_id: i64,
    pub document_type: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
