use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::{DatabaseError, SupabaseClient};

use crate::models::{NewReport, Report, ReportFilter};

/// Persistence of diagnostic reports.
///
/// `insert` must reject a second report for the same appointment with
/// [`DatabaseError::Conflict`].
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Report>, DatabaseError>;

    async fn find_by_appointment(&self, appointment_id: Uuid) -> Result<Option<Report>, DatabaseError>;

    /// Reports matching `filter`, newest first.
    async fn list(&self, filter: &ReportFilter) -> Result<Vec<Report>, DatabaseError>;

    async fn insert(&self, report: NewReport) -> Result<Report, DatabaseError>;
}

// ==============================================================================
// SUPABASE BACKEND
// ==============================================================================

/// PostgREST-backed store; `reports.appointment_id` carries a unique index.
pub struct SupabaseReportStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseReportStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn select(&self, query: &str) -> Result<Vec<Report>, DatabaseError> {
        let path = format!("/rest/v1/reports?{}", query);
        self.supabase.request(Method::GET, &path, None).await
    }
}

#[async_trait]
impl ReportStore for SupabaseReportStore {
    async fn get(&self, id: Uuid) -> Result<Option<Report>, DatabaseError> {
        debug!("Fetching report {}", id);
        let rows = self.select(&format!("id=eq.{}&limit=1", id)).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_by_appointment(&self, appointment_id: Uuid) -> Result<Option<Report>, DatabaseError> {
        let rows = self.select(&format!("appointment_id=eq.{}&limit=1", appointment_id)).await?;
        Ok(rows.into_iter().next())
    }

    async fn list(&self, filter: &ReportFilter) -> Result<Vec<Report>, DatabaseError> {
        let mut conditions = Vec::new();

        if let Some(appointment_id) = filter.appointment_id {
            conditions.push(format!("appointment_id=eq.{}", appointment_id));
        }
        if let Some(patient_id) = filter.patient_id {
            conditions.push(format!("patient_id=eq.{}", patient_id));
        }
        conditions.push("order=created_at.desc".to_string());

        self.select(&conditions.join("&")).await
    }

    async fn insert(&self, report: NewReport) -> Result<Report, DatabaseError> {
        debug!("Inserting report for appointment {}", report.appointment_id);

        let body = json!({
            "appointment_id": report.appointment_id,
            "doctor_id": report.doctor_id,
            "patient_id": report.patient_id,
            "nurse_id": report.nurse_id,
            "diagnosis": report.diagnosis,
        });

        let rows: Vec<Report> = self.supabase
            .write_returning(Method::POST, "/rest/v1/reports", body)
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| DatabaseError::Empty("Failed to create report".to_string()))
    }
}

// ==============================================================================
// IN-MEMORY BACKEND
// ==============================================================================

#[derive(Default)]
pub struct InMemoryReportStore {
    reports: Mutex<HashMap<Uuid, Report>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn get(&self, id: Uuid) -> Result<Option<Report>, DatabaseError> {
        Ok(self.reports.lock().await.get(&id).cloned())
    }

    async fn find_by_appointment(&self, appointment_id: Uuid) -> Result<Option<Report>, DatabaseError> {
        Ok(self.reports.lock().await
            .values()
            .find(|r| r.appointment_id == appointment_id)
            .cloned())
    }

    async fn list(&self, filter: &ReportFilter) -> Result<Vec<Report>, DatabaseError> {
        let mut matching: Vec<Report> = self.reports.lock().await
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn insert(&self, report: NewReport) -> Result<Report, DatabaseError> {
        let mut reports = self.reports.lock().await;

        if reports.values().any(|r| r.appointment_id == report.appointment_id) {
            warn!("Rejected second report for appointment {}", report.appointment_id);
            return Err(DatabaseError::Conflict(format!(
                "appointment {} already has a report", report.appointment_id
            )));
        }

        let created = Report {
            id: Uuid::new_v4(),
            appointment_id: report.appointment_id,
            doctor_id: report.doctor_id,
            patient_id: report.patient_id,
            nurse_id: report.nurse_id,
            diagnosis: report.diagnosis,
            created_at: Utc::now(),
        };
        reports.insert(created.id, created.clone());

        Ok(created)
    }
}
