pub mod report;
pub mod store;

pub use report::ReportService;
pub use store::{InMemoryReportStore, ReportStore, SupabaseReportStore};
