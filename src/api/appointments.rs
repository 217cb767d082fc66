//! Appointment requests and their confirmation workflow.

use crate::error::ApiError;
use crate::gateway::{ApiRequest, Gateway};

use super::Page;
use super::types::{Appointment, AppointmentStatus, NewAppointment};

pub const APPOINTMENTS_PATH: &str = "/appointments/";

fn status_endpoint(appointment_id: i64) -> String {
    format!("/appointments/{appointment_id}/status")
}

/// # Errors
///
/// Returns an [`ApiError`] if the request fails.
pub async fn request(gateway: &Gateway, appointment: &NewAppointment) -> Result<Appointment, ApiError> {
    gateway.send_json(ApiRequest::post(APPOINTMENTS_PATH).json(appointment)?).await
}

/// # Errors
///
/// Returns an [`ApiError`] if the request fails.
pub async fn list(gateway: &Gateway, page: Page) -> Result<Vec<Appointment>, ApiError> {
    gateway.send_json(page.apply(ApiRequest::get(APPOINTMENTS_PATH))).await
}

/// # Errors
///
/// Returns an [`ApiError`] if the request fails.
pub async fn set_status(
    gateway: &Gateway,
    appointment_id: i64,
    status: AppointmentStatus,
) -> Result<Appointment, ApiError> {
    let body = serde_json::json!({ "status": status });
    gateway.send_json(ApiRequest::put(status_endpoint(appointment_id)).json_value(body)).await
}
