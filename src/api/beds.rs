//! Bed occupancy.

use crate::error::ApiError;
use crate::gateway::{ApiRequest, Gateway};

use super::Page;
use super::types::{Bed, BedAllocation};

pub const BEDS_PATH: &str = "/beds/";

fn bed_endpoint(bed_id: i64) -> String {
    format!("/beds/{bed_id}")
}

/// # Errors
///
/// Returns an [`ApiError`] if the request fails.
pub async fn list(gateway: &Gateway, page: Page) -> Result<Vec<Bed>, ApiError> {
    gateway.send_json(page.apply(ApiRequest::get(BEDS_PATH))).await
}

/// Assign or release a bed.
///
/// # Errors
///
/// Returns an [`ApiError`]; an unknown bed or patient is a 404.
pub async fn update(gateway: &Gateway, bed_id: i64, allocation: BedAllocation) -> Result<Bed, ApiError> {
    gateway.send_json(ApiRequest::put(bed_endpoint(bed_id)).json(&allocation)?).await
}
