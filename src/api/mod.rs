//! Typed data-access calls for the hospital backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each function takes the [`Gateway`](crate::gateway::Gateway) and issues
//! exactly one request through it, so every call carries the session's
//! current token. Callers that see a 401 hand the error to
//! [`SessionStore::invalidate_if_unauthorized`](crate::session::SessionStore::invalidate_if_unauthorized).

pub mod appointments;
pub mod beds;
pub mod documents;
pub mod patients;
pub mod prescriptions;
pub mod types;

pub use types::{
    Appointment, AppointmentStatus, Bed, BedAllocation, Document, DocumentUpload, NewAppointment, NewPatient,
    NewPrescription, Patient, PatientRef, Prescription,
};

use crate::gateway::ApiRequest;

pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// `skip`/`limit` pagination for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, limit: DEFAULT_PAGE_LIMIT }
    }
}

impl Page {
    #[must_use]
    pub fn new(skip: u32, limit: u32) -> Self {
        Self { skip, limit }
    }

    pub(crate) fn apply(self, request: ApiRequest) -> ApiRequest {
        request.query("skip", self.skip).query("limit", self.limit)
    }
}
