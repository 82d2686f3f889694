use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use reqwest::Method;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::{DatabaseError, SupabaseClient};

use crate::models::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment};

/// Persistence of appointment records.
///
/// `insert_scheduled` is the only write that can create a scheduled appointment and
/// must reject, atomically, a second scheduled appointment for the same doctor and
/// `date_time` with [`DatabaseError::Conflict`].
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError>;

    async fn find_scheduled_at(
        &self,
        doctor_id: Uuid,
        date_time: NaiveDateTime,
    ) -> Result<Option<Appointment>, DatabaseError>;

    /// Scheduled appointments of `doctor_id` whose date component is `date`.
    async fn list_scheduled_on(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>, DatabaseError>;

    /// Doctors holding a scheduled appointment at exactly `date_time`.
    async fn busy_doctors_at(&self, date_time: NaiveDateTime) -> Result<HashSet<Uuid>, DatabaseError>;

    /// Appointments matching `filter`, ordered by `date_time`.
    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, DatabaseError>;

    async fn insert_scheduled(&self, appointment: NewAppointment) -> Result<Appointment, DatabaseError>;

    /// Writes only the status column.
    async fn update_status(&self, id: Uuid, status: AppointmentStatus) -> Result<Appointment, DatabaseError>;
}

fn format_timestamp(date_time: &NaiveDateTime) -> String {
    urlencoding::encode(&date_time.format("%Y-%m-%dT%H:%M:%S%.f").to_string()).into_owned()
}

fn day_bounds(date: NaiveDate) -> Result<(NaiveDateTime, NaiveDateTime), DatabaseError> {
    let next = date
        .succ_opt()
        .ok_or_else(|| DatabaseError::Query(format!("no day follows {}", date)))?;
    Ok((date.and_time(NaiveTime::MIN), next.and_time(NaiveTime::MIN)))
}

// ==============================================================================
// SUPABASE BACKEND
// ==============================================================================

/// PostgREST-backed store.
///
/// Double booking is closed by the partial unique index
/// `appointments_doctor_slot_scheduled_key (doctor_id, date_time) WHERE status = 'scheduled'`;
/// PostgREST reports its violation as 409, surfaced as [`DatabaseError::Conflict`].
pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn select(&self, query: &str) -> Result<Vec<Appointment>, DatabaseError> {
        let path = format!("/rest/v1/appointments?{}", query);
        self.supabase.request(Method::GET, &path, None).await
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
        debug!("Fetching appointment {}", id);
        let rows = self.select(&format!("id=eq.{}&limit=1", id)).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_scheduled_at(
        &self,
        doctor_id: Uuid,
        date_time: NaiveDateTime,
    ) -> Result<Option<Appointment>, DatabaseError> {
        let rows = self.select(&format!(
            "doctor_id=eq.{}&date_time=eq.{}&status=eq.{}&limit=1",
            doctor_id,
            format_timestamp(&date_time),
            AppointmentStatus::Scheduled,
        )).await?;
        Ok(rows.into_iter().next())
    }

    async fn list_scheduled_on(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>, DatabaseError> {
        let (start, end) = day_bounds(date)?;
        self.select(&format!(
            "doctor_id=eq.{}&status=eq.{}&date_time=gte.{}&date_time=lt.{}&order=date_time.asc",
            doctor_id,
            AppointmentStatus::Scheduled,
            format_timestamp(&start),
            format_timestamp(&end),
        )).await
    }

    async fn busy_doctors_at(&self, date_time: NaiveDateTime) -> Result<HashSet<Uuid>, DatabaseError> {
        let rows = self.select(&format!(
            "date_time=eq.{}&status=eq.{}",
            format_timestamp(&date_time),
            AppointmentStatus::Scheduled,
        )).await?;
        Ok(rows.into_iter().map(|appointment| appointment.doctor_id).collect())
    }

    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, DatabaseError> {
        let mut conditions = Vec::new();

        if let Some(doctor_id) = filter.doctor_id {
            conditions.push(format!("doctor_id=eq.{}", doctor_id));
        }
        if let Some(patient_id) = filter.patient_id {
            conditions.push(format!("patient_id=eq.{}", patient_id));
        }
        if let Some(status) = filter.status {
            conditions.push(format!("status=eq.{}", status));
        }
        if let Some(date) = filter.date {
            let (start, end) = day_bounds(date)?;
            conditions.push(format!("date_time=gte.{}", format_timestamp(&start)));
            conditions.push(format!("date_time=lt.{}", format_timestamp(&end)));
        }
        conditions.push("order=date_time.asc".to_string());

        self.select(&conditions.join("&")).await
    }

    async fn insert_scheduled(&self, appointment: NewAppointment) -> Result<Appointment, DatabaseError> {
        debug!("Inserting appointment for doctor {} at {}", appointment.doctor_id, appointment.date_time);

        let body = json!({
            "doctor_id": appointment.doctor_id,
            "nurse_id": appointment.nurse_id,
            "patient_id": appointment.patient_id,
            "date_time": appointment.date_time,
            "status": AppointmentStatus::Scheduled,
        });

        let rows: Vec<Appointment> = self.supabase
            .write_returning(Method::POST, "/rest/v1/appointments", body)
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| DatabaseError::Empty("Failed to create appointment".to_string()))
    }

    async fn update_status(&self, id: Uuid, status: AppointmentStatus) -> Result<Appointment, DatabaseError> {
        debug!("Setting appointment {} status to {}", id, status);

        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let rows: Vec<Appointment> = self.supabase
            .write_returning(Method::PATCH, &path, json!({ "status": status }))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| DatabaseError::NotFound(format!("Appointment {} not found", id)))
    }
}

// ==============================================================================
// IN-MEMORY BACKEND
// ==============================================================================

/// Process-local store; the scheduled-slot check and the insert share one lock.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: Mutex<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
        Ok(self.appointments.lock().await.get(&id).cloned())
    }

    async fn find_scheduled_at(
        &self,
        doctor_id: Uuid,
        date_time: NaiveDateTime,
    ) -> Result<Option<Appointment>, DatabaseError> {
        Ok(self.appointments.lock().await
            .values()
            .find(|a| a.is_scheduled() && a.doctor_id == doctor_id && a.date_time == date_time)
            .cloned())
    }

    async fn list_scheduled_on(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>, DatabaseError> {
        let filter = AppointmentFilter {
            doctor_id: Some(doctor_id),
            status: Some(AppointmentStatus::Scheduled),
            date: Some(date),
            ..AppointmentFilter::default()
        };
        self.list(&filter).await
    }

    async fn busy_doctors_at(&self, date_time: NaiveDateTime) -> Result<HashSet<Uuid>, DatabaseError> {
        Ok(self.appointments.lock().await
            .values()
            .filter(|a| a.is_scheduled() && a.date_time == date_time)
            .map(|a| a.doctor_id)
            .collect())
    }

    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, DatabaseError> {
        let mut matching: Vec<Appointment> = self.appointments.lock().await
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();

        matching.sort_by(|a, b| a.date_time.cmp(&b.date_time).then_with(|| a.created_at.cmp(&b.created_at)));
        Ok(matching)
    }

    async fn insert_scheduled(&self, appointment: NewAppointment) -> Result<Appointment, DatabaseError> {
        let mut appointments = self.appointments.lock().await;

        let taken = appointments.values().any(|a| {
            a.is_scheduled() && a.doctor_id == appointment.doctor_id && a.date_time == appointment.date_time
        });
        if taken {
            warn!("Rejected second scheduled appointment for doctor {} at {}",
                  appointment.doctor_id, appointment.date_time);
            return Err(DatabaseError::Conflict(format!(
                "doctor {} already booked at {}", appointment.doctor_id, appointment.date_time
            )));
        }

        let created = Appointment {
            id: Uuid::new_v4(),
            doctor_id: appointment.doctor_id,
            nurse_id: appointment.nurse_id,
            patient_id: appointment.patient_id,
            date_time: appointment.date_time,
            status: AppointmentStatus::Scheduled,
            created_at: Utc::now(),
        };
        appointments.insert(created.id, created.clone());

        Ok(created)
    }

    async fn update_status(&self, id: Uuid, status: AppointmentStatus) -> Result<Appointment, DatabaseError> {
        let mut appointments = self.appointments.lock().await;

        let appointment = appointments
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Appointment {} not found", id)))?;
        appointment.status = status;

        Ok(appointment.clone())
    }
}
