use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::AppointmentError;
use crate::services::slots::is_within_business_hours;
use crate::services::store::AppointmentStore;

/// Business-hours and double-booking checks run before an appointment is persisted.
///
/// Bookings collide only on an identical `date_time`; appointments carry no duration.
pub struct BookingValidator {
    store: Arc<dyn AppointmentStore>,
}

impl BookingValidator {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    pub fn check_business_hours(date_time: &NaiveDateTime) -> Result<(), AppointmentError> {
        if is_within_business_hours(date_time) {
            Ok(())
        } else {
            Err(AppointmentError::OutOfHours(*date_time))
        }
    }

    pub async fn validate(&self, doctor_id: Uuid, date_time: NaiveDateTime) -> Result<(), AppointmentError> {
        debug!("Validating booking for doctor {} at {}", doctor_id, date_time);

        Self::check_business_hours(&date_time)?;

        if let Some(existing) = self.store.find_scheduled_at(doctor_id, date_time).await? {
            warn!("Doctor {} already booked at {} (appointment {})", doctor_id, date_time, existing.id);
            return Err(AppointmentError::DoubleBooking { doctor_id, date_time });
        }

        Ok(())
    }
}
