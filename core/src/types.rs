//! Shared primitive types used across the pipeline.

/// First day of a calendar month. Every month-grained result uses this.
pub type Month = chrono::NaiveDate;

/// Short, stable name of a catalog query ("mau", "churn_rate", ...).
pub type QueryLabel = &'static str;

/// Schema name the warehouse dataset is attached under.
pub const DATASET_SCHEMA: &str = "analytics";
