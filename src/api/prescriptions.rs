//! Prescriptions written against a patient.

use crate::error::ApiError;
use crate::gateway::{ApiRequest, Gateway};

use super::types::{NewPrescription, Prescription};

pub const PRESCRIPTIONS_PATH: &str = "/prescriptions/";

fn patient_prescriptions_endpoint(patient_id: i64) -> String {
    format!("/prescriptions/patient/{patient_id}")
}

/// # Errors
///
/// Returns an [`ApiError`] if the request fails.
pub async fn create(gateway: &Gateway, prescription: &NewPrescription) -> Result<Prescription, ApiError> {
    gateway.send_json(ApiRequest::post(PRESCRIPTIONS_PATH).json(prescription)?).await
}

/// # Errors
///
/// Returns an [`ApiError`] if the request fails.
pub async fn for_patient(gateway: &Gateway, patient_id: i64) -> Result<Vec<Prescription>, ApiError> {
    gateway.send_json(ApiRequest::get(patient_prescriptions_endpoint(patient_id))).await
}
