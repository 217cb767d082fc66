use super::*;
use serde_json::json;

#[test]
fn patient_accepts_either_id_field() {
    let a: Patient = serde_json::from_value(json!({ "id": 1, "full_name": "P One" })).unwrap();
    let b: Patient = serde_json::from_value(json!({ "patient_id": 2, "full_name": "P Two", "triage_level": "red" })).unwrap();
    assert_eq!(a.id, 1);
    assert_eq!(a.triage_level, None);
    assert_eq!(b.id, 2);
    assert_eq!(b.triage_level.as_deref(), Some("red"));
}

#[test]
fn new_patient_omits_unset_fields() {
    let patient = NewPatient { full_name: "P".to_owned(), gender: Some("F".to_owned()), ..NewPatient::default() };
    assert_eq!(serde_json::to_value(&patient).unwrap(), json!({ "full_name": "P", "gender": "F" }));
}

#[test]
fn bed_release_sends_null_patient() {
    assert_eq!(
        serde_json::to_value(BedAllocation::release()).unwrap(),
        json!({ "is_occupied": false, "patient_id": null })
    );
    assert_eq!(
        serde_json::to_value(BedAllocation::assign(4)).unwrap(),
        json!({ "is_occupied": true, "patient_id": 4 })
    );
}

#[test]
fn appointment_status_parses_and_displays() {
    assert_eq!("Confirmed".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Confirmed);
    assert_eq!("canceled".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Cancelled);
    assert!("maybe".parse::<AppointmentStatus>().is_err());
    assert_eq!(AppointmentStatus::Pending.to_string(), "pending");
}

#[test]
fn appointment_decodes_embedded_patient() {
    let appointment: Appointment = serde_json::from_value(json!({
        "appointment_id": 5,
        "appointment_date": "2024-05-01T10:00:00",
        "reason": null,
        "status": "pending",
        "patient": { "patient_id": 3, "full_name": "P Three" }
    }))
    .unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.patient.unwrap().patient_id, 3);
}
