#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use appointment_cell::models::CreateAppointmentRequest;
use appointment_cell::services::InMemoryAppointmentStore;
use appointment_cell::AppointmentState;
use shared_database::InMemoryDirectory;
use shared_models::auth::{PatientRecord, StaffMember, User};
use shared_utils::test_utils::{test_patient, TestUser};

/// A small clinic: two doctors, one nurse, one admin and one patient.
pub struct Clinic {
    pub state: AppointmentState,
    pub store: Arc<InMemoryAppointmentStore>,
    pub doctor: TestUser,
    pub second_doctor: TestUser,
    pub nurse: TestUser,
    pub admin: TestUser,
    pub patient: PatientRecord,
    pub doctor_record: StaffMember,
    pub second_doctor_record: StaffMember,
}

impl Clinic {
    pub async fn new() -> Self {
        let directory = Arc::new(InMemoryDirectory::new());
        let store = Arc::new(InMemoryAppointmentStore::new());

        let doctor = TestUser::doctor("house@clinic.test");
        let second_doctor = TestUser::doctor("wilson@clinic.test");
        let nurse = TestUser::nurse("jackie@clinic.test");
        let admin = TestUser::admin("cuddy@clinic.test");
        let patient = test_patient("John", "Doe");

        let mut doctor_record = doctor.to_staff_member("Gregory", "House");
        doctor_record.specialization = Some("Diagnostics".to_string());
        let second_doctor_record = second_doctor.to_staff_member("James", "Wilson");

        directory.insert_user(doctor_record.clone()).await;
        directory.insert_user(second_doctor_record.clone()).await;
        directory.insert_user(nurse.to_staff_member("Jackie", "Peyton")).await;
        directory.insert_user(admin.to_staff_member("Lisa", "Cuddy")).await;
        directory.insert_patient(patient.clone()).await;

        let state = AppointmentState::new(store.clone(), directory);

        Self {
            state,
            store,
            doctor,
            second_doctor,
            nurse,
            admin,
            patient,
            doctor_record,
            second_doctor_record,
        }
    }

    pub fn request(&self, doctor_id: Uuid, date_time: &str) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            doctor_id,
            nurse_id: Some(self.nurse.id),
            patient_id: self.patient.id,
            date_time: date_time.to_string(),
        }
    }

    pub fn admin_principal(&self) -> User {
        self.admin.to_user()
    }
}

pub fn at(date: &str, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}
