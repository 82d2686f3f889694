use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::{PatientRecord, Role, StaffMember};

use crate::error::DatabaseError;
use crate::supabase::SupabaseClient;

/// Lookups against the user and patient records owned by the admin side of the clinic.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Result<Option<StaffMember>, DatabaseError>;

    /// Users holding `role`, ordered by last name then first name.
    async fn list_users_by_role(&self, role: Role) -> Result<Vec<StaffMember>, DatabaseError>;

    async fn get_patient(&self, id: Uuid) -> Result<Option<PatientRecord>, DatabaseError>;
}

pub struct SupabaseDirectory {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseDirectory {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl Directory for SupabaseDirectory {
    async fn get_user(&self, id: Uuid) -> Result<Option<StaffMember>, DatabaseError> {
        debug!("Fetching user {}", id);

        let path = format!("/rest/v1/users?id=eq.{}&limit=1", id);
        let users: Vec<StaffMember> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(users.into_iter().next())
    }

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<StaffMember>, DatabaseError> {
        debug!("Listing users with role {}", role);

        let path = format!("/rest/v1/users?role=eq.{}&order=last_name.asc,first_name.asc", role);
        self.supabase.request(Method::GET, &path, None).await
    }

    async fn get_patient(&self, id: Uuid) -> Result<Option<PatientRecord>, DatabaseError> {
        debug!("Fetching patient {}", id);

        let path = format!("/rest/v1/patients?id=eq.{}&limit=1", id);
        let patients: Vec<PatientRecord> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(patients.into_iter().next())
    }
}

/// Staff and patient records loaded into an [`InMemoryDirectory`] at startup.
#[derive(Debug, Default, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub users: Vec<StaffMember>,
    #[serde(default)]
    pub patients: Vec<PatientRecord>,
}

impl DirectorySeed {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Process-local directory, used for development and tests.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<Uuid, StaffMember>>,
    patients: RwLock<HashMap<Uuid, PatientRecord>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: DirectorySeed) -> Self {
        Self {
            users: RwLock::new(seed.users.into_iter().map(|user| (user.id, user)).collect()),
            patients: RwLock::new(seed.patients.into_iter().map(|patient| (patient.id, patient)).collect()),
        }
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn insert_user(&self, user: StaffMember) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn insert_patient(&self, patient: PatientRecord) {
        self.patients.write().await.insert(patient.id, patient);
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn get_user(&self, id: Uuid) -> Result<Option<StaffMember>, DatabaseError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<StaffMember>, DatabaseError> {
        let mut users: Vec<StaffMember> = self.users.read().await
            .values()
            .filter(|user| user.role == role)
            .cloned()
            .collect();

        users.sort_by(|a, b| {
            a.last_name.cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });

        Ok(users)
    }

    async fn get_patient(&self, id: Uuid) -> Result<Option<PatientRecord>, DatabaseError> {
        Ok(self.patients.read().await.get(&id).cloned())
    }
}
