use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use appointment_cell::services::{AppointmentStore, InMemoryAppointmentStore, SupabaseAppointmentStore};
use appointment_cell::AppointmentState;
use report_cell::services::{InMemoryReportStore, ReportStore, SupabaseReportStore};
use report_cell::ReportState;
use shared_config::{AppConfig, StorageBackend};
use shared_database::{Directory, DirectorySeed, InMemoryDirectory, SupabaseClient, SupabaseDirectory};

/// Persistence handles for both cells. Both cells share one appointment store.
pub struct Backends {
    pub appointments: Arc<dyn AppointmentStore>,
    pub reports: Arc<dyn ReportStore>,
    pub directory: Arc<dyn Directory>,
}

impl Backends {
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        match config.storage_backend {
            StorageBackend::Supabase => {
                info!("Using Supabase storage at {}", config.supabase_url);
                let client = Arc::new(SupabaseClient::new(config));
                Ok(Self {
                    appointments: Arc::new(SupabaseAppointmentStore::new(Arc::clone(&client))),
                    reports: Arc::new(SupabaseReportStore::new(Arc::clone(&client))),
                    directory: Arc::new(SupabaseDirectory::new(client)),
                })
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage; data is lost on restart");
                let seed = match &config.directory_seed_file {
                    Some(path) => load_seed(path).await?,
                    None => DirectorySeed::default(),
                };
                Ok(Self::in_memory(InMemoryDirectory::with_seed(seed)).await)
            }
        }
    }

    pub async fn in_memory(directory: InMemoryDirectory) -> Self {
        let staff = directory.user_count().await;
        if staff == 0 {
            warn!("In-memory directory has no staff; set DIRECTORY_SEED_FILE or bookings will fail with unknown doctor");
        } else {
            info!("In-memory directory seeded with {} staff members", staff);
        }

        Self {
            appointments: Arc::new(InMemoryAppointmentStore::new()),
            reports: Arc::new(InMemoryReportStore::new()),
            directory: Arc::new(directory),
        }
    }

    pub fn appointment_state(&self) -> AppointmentState {
        AppointmentState::new(Arc::clone(&self.appointments), Arc::clone(&self.directory))
    }

    pub fn report_state(&self) -> ReportState {
        ReportState::new(
            Arc::clone(&self.appointments),
            Arc::clone(&self.reports),
            Arc::clone(&self.directory),
        )
    }
}

async fn load_seed(path: &str) -> anyhow::Result<DirectorySeed> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read directory seed {}", path))?;

    DirectorySeed::from_json(&raw)
        .with_context(|| format!("invalid directory seed {}", path))
}
