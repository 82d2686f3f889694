mod common;

use assert_matches::assert_matches;
use uuid::Uuid;

use appointment_cell::models::{AppointmentStatus, EntityKind};
use appointment_cell::services::AppointmentBookingService;
use report_cell::models::{CreateReportRequest, ReportError, ReportFilter};
use report_cell::services::ReportService;
use shared_models::auth::Role;

use common::Ward;

fn request(appointment_id: Uuid, nurse_id: Option<Uuid>) -> CreateReportRequest {
    CreateReportRequest {
        appointment_id,
        diagnosis: "Acute bronchitis".to_string(),
        nurse_id,
    }
}

#[tokio::test]
async fn test_report_completes_appointment() {
    let ward = Ward::new().await;
    let appointment = ward.book("2024-06-01T09:00").await;

    let report = ReportService::new(&ward.reports)
        .create_report(&ward.doctor.to_user(), request(appointment.id, Some(ward.nurse.id)))
        .await
        .unwrap();

    assert_eq!(report.appointment_id, appointment.id);
    assert_eq!(report.doctor_id, appointment.doctor_id);
    assert_eq!(report.patient_id, appointment.patient_id);
    assert_eq!(report.nurse_id, Some(ward.nurse.id));
    assert_eq!(report.diagnosis, "Acute bronchitis");

    let stored = AppointmentBookingService::new(&ward.appointments)
        .get_appointment(appointment.id)
        .await
        .unwrap();
    assert_eq!(stored.status, AppointmentStatus::Completed);
}

#[tokio::test]
async fn test_second_report_is_duplicate() {
    let ward = Ward::new().await;
    let appointment = ward.book("2024-06-01T09:00").await;
    let service = ReportService::new(&ward.reports);

    service.create_report(&ward.doctor.to_user(), request(appointment.id, None)).await.unwrap();
    let second = service.create_report(&ward.doctor.to_user(), request(appointment.id, None)).await;

    assert_eq!(second, Err(ReportError::DuplicateReport(appointment.id)));
}

#[tokio::test]
async fn test_completed_slot_can_be_booked_again() {
    let ward = Ward::new().await;
    let appointment = ward.book("2024-06-01T09:00").await;

    ReportService::new(&ward.reports)
        .create_report(&ward.doctor.to_user(), request(appointment.id, None))
        .await
        .unwrap();

    let rebooked = ward.book("2024-06-01T09:00").await;
    assert_ne!(rebooked.id, appointment.id);
}

#[tokio::test]
async fn test_nurse_cannot_write_report() {
    let ward = Ward::new().await;
    let appointment = ward.book("2024-06-01T09:00").await;

    let result = ReportService::new(&ward.reports)
        .create_report(&ward.nurse.to_user(), request(appointment.id, None))
        .await;

    assert_matches!(result, Err(ReportError::Permission(msg)) if msg.contains("Only doctors"));
}

#[tokio::test]
async fn test_unassigned_doctor_cannot_write_report() {
    let ward = Ward::new().await;
    let appointment = ward.book("2024-06-01T09:00").await;

    let result = ReportService::new(&ward.reports)
        .create_report(&ward.other_doctor.to_user(), request(appointment.id, None))
        .await;

    assert_matches!(result, Err(ReportError::Permission(_)));

    let stored = AppointmentBookingService::new(&ward.appointments)
        .get_appointment(appointment.id)
        .await
        .unwrap();
    assert_eq!(stored.status, AppointmentStatus::Scheduled);
}

#[tokio::test]
async fn test_nurse_reference_must_hold_nurse_role() {
    let ward = Ward::new().await;
    let appointment = ward.book("2024-06-01T09:00").await;
    let service = ReportService::new(&ward.reports);

    let wrong_role = service
        .create_report(&ward.doctor.to_user(), request(appointment.id, Some(ward.other_doctor.id)))
        .await;
    assert_eq!(
        wrong_role,
        Err(ReportError::RoleMismatch { user_id: ward.other_doctor.id, expected: Role::Nurse })
    );

    let unknown = Uuid::new_v4();
    let missing = service
        .create_report(&ward.doctor.to_user(), request(appointment.id, Some(unknown)))
        .await;
    assert_eq!(missing, Err(ReportError::NotFound(EntityKind::Nurse, unknown)));
}

#[tokio::test]
async fn test_unknown_appointment_is_not_found() {
    let ward = Ward::new().await;
    let unknown = Uuid::new_v4();

    let result = ReportService::new(&ward.reports)
        .create_report(&ward.doctor.to_user(), request(unknown, None))
        .await;

    assert_eq!(result, Err(ReportError::NotFound(EntityKind::Appointment, unknown)));
}

#[tokio::test]
async fn test_cancelled_appointment_cannot_be_reported() {
    let ward = Ward::new().await;
    let appointment = ward.book("2024-06-01T09:00").await;

    AppointmentBookingService::new(&ward.appointments)
        .cancel_appointment(&ward.admin.to_user(), appointment.id)
        .await
        .unwrap();

    let result = ReportService::new(&ward.reports)
        .create_report(&ward.doctor.to_user(), request(appointment.id, None))
        .await;

    assert_eq!(result, Err(ReportError::InvalidAppointmentStatus(AppointmentStatus::Cancelled)));
}

#[tokio::test]
async fn test_blank_diagnosis_is_rejected() {
    let ward = Ward::new().await;
    let appointment = ward.book("2024-06-01T09:00").await;

    let result = ReportService::new(&ward.reports)
        .create_report(
            &ward.doctor.to_user(),
            CreateReportRequest { appointment_id: appointment.id, diagnosis: "   ".to_string(), nurse_id: None },
        )
        .await;

    assert_matches!(result, Err(ReportError::Validation(_)));
}

#[tokio::test]
async fn test_reports_are_listed_by_patient_and_appointment() {
    let ward = Ward::new().await;
    let morning = ward.book("2024-06-01T09:00").await;
    let afternoon = ward.book("2024-06-01T15:30").await;
    let service = ReportService::new(&ward.reports);

    let first = service.create_report(&ward.doctor.to_user(), request(morning.id, None)).await.unwrap();
    service.create_report(&ward.doctor.to_user(), request(afternoon.id, None)).await.unwrap();

    let by_patient = service
        .list_reports(ReportFilter { patient_id: Some(ward.patient.id), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(by_patient.len(), 2);

    let by_appointment = service
        .list_reports(ReportFilter { appointment_id: Some(morning.id), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(by_appointment, vec![first.clone()]);

    assert_eq!(service.get_report(first.id).await.unwrap(), first);
    let unknown = Uuid::new_v4();
    assert_eq!(service.get_report(unknown).await, Err(ReportError::NotFound(EntityKind::Report, unknown)));
}
