#![allow(dead_code)]

use std::sync::Arc;

use appointment_cell::models::{Appointment, CreateAppointmentRequest};
use appointment_cell::services::{AppointmentBookingService, InMemoryAppointmentStore};
use appointment_cell::AppointmentState;
use report_cell::services::InMemoryReportStore;
use report_cell::ReportState;
use shared_database::InMemoryDirectory;
use shared_models::auth::PatientRecord;
use shared_utils::test_utils::{test_patient, TestUser};

/// One doctor's day with a booked visit, sharing the appointment store
/// between the booking and report flows.
pub struct Ward {
    pub appointments: AppointmentState,
    pub reports: ReportState,
    pub doctor: TestUser,
    pub other_doctor: TestUser,
    pub nurse: TestUser,
    pub admin: TestUser,
    pub patient: PatientRecord,
}

impl Ward {
    pub async fn new() -> Self {
        let directory = Arc::new(InMemoryDirectory::new());
        let appointment_store = Arc::new(InMemoryAppointmentStore::new());

        let doctor = TestUser::doctor("grey@clinic.test");
        let other_doctor = TestUser::doctor("shepherd@clinic.test");
        let nurse = TestUser::nurse("olivia@clinic.test");
        let admin = TestUser::admin("webber@clinic.test");
        let patient = test_patient("Jane", "Roe");

        directory.insert_user(doctor.to_staff_member("Meredith", "Grey")).await;
        directory.insert_user(other_doctor.to_staff_member("Derek", "Shepherd")).await;
        directory.insert_user(nurse.to_staff_member("Olivia", "Harper")).await;
        directory.insert_user(admin.to_staff_member("Richard", "Webber")).await;
        directory.insert_patient(patient.clone()).await;

        let appointments = AppointmentState::new(appointment_store.clone(), directory.clone());
        let reports = ReportState::new(appointment_store, Arc::new(InMemoryReportStore::new()), directory);

        Self { appointments, reports, doctor, other_doctor, nurse, admin, patient }
    }

    /// Books the doctor for the patient at `date_time`.
    pub async fn book(&self, date_time: &str) -> Appointment {
        AppointmentBookingService::new(&self.appointments)
            .book_appointment(
                &self.admin.to_user(),
                CreateAppointmentRequest {
                    doctor_id: self.doctor.id,
                    nurse_id: Some(self.nurse.id),
                    patient_id: self.patient.id,
                    date_time: date_time.to_string(),
                },
            )
            .await
            .unwrap()
    }
}
