use std::sync::Arc;

use appointment_cell::services::AppointmentStore;
use shared_database::Directory;

use crate::services::store::ReportStore;

/// Backends shared by the report handlers. The appointment store is the same
/// instance the appointment cell books into.
#[derive(Clone)]
pub struct ReportState {
    pub appointments: Arc<dyn AppointmentStore>,
    pub reports: Arc<dyn ReportStore>,
    pub directory: Arc<dyn Directory>,
}

impl ReportState {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        reports: Arc<dyn ReportStore>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self { appointments, reports, directory }
    }
}
