use std::sync::Arc;

use shared_database::Directory;

use crate::services::store::AppointmentStore;

/// Backends shared by the appointment handlers.
#[derive(Clone)]
pub struct AppointmentState {
    pub appointments: Arc<dyn AppointmentStore>,
    pub directory: Arc<dyn Directory>,
}

impl AppointmentState {
    pub fn new(appointments: Arc<dyn AppointmentStore>, directory: Arc<dyn Directory>) -> Self {
        Self { appointments, directory }
    }
}
