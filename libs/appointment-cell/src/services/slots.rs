use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::debug;
use uuid::Uuid;

use crate::models::AppointmentError;
use crate::services::store::AppointmentStore;

/// First bookable hour of the day.
pub const OPENING_HOUR: u32 = 8;
/// Bookings must start before this hour.
pub const CLOSING_HOUR: u32 = 20;
pub const SLOT_MINUTES: u32 = 30;

/// Only the hour is inspected: 19:59 is inside business hours, 20:00 is not.
pub fn is_within_business_hours(date_time: &NaiveDateTime) -> bool {
    (OPENING_HOUR..CLOSING_HOUR).contains(&date_time.hour())
}

/// Every slot start from opening up to, but excluding, closing.
pub fn candidate_slots() -> impl Iterator<Item = NaiveTime> + Clone {
    let first_minute = i64::from(OPENING_HOUR * 60);
    let closing_minute = i64::from(CLOSING_HOUR * 60);

    (first_minute..closing_minute)
        .step_by(SLOT_MINUTES as usize)
        .map(|minute| NaiveTime::MIN + Duration::minutes(minute))
}

/// Candidate slots not present in `taken`, ascending.
pub fn free_slots(taken: &HashSet<NaiveTime>) -> Vec<NaiveTime> {
    candidate_slots()
        .filter(|slot| !taken.contains(slot))
        .collect()
}

pub struct SlotCalculator {
    store: Arc<dyn AppointmentStore>,
}

impl SlotCalculator {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    pub async fn compute_free_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, AppointmentError> {
        let scheduled = self.store.list_scheduled_on(doctor_id, date).await?;

        let taken: HashSet<NaiveTime> = scheduled
            .iter()
            .map(|appointment| appointment.date_time.time())
            .collect();

        let slots = free_slots(&taken);
        debug!("Doctor {} has {} free slots on {} ({} taken)",
               doctor_id, slots.len(), date, taken.len());

        Ok(slots)
    }
}
