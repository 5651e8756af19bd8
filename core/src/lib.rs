//! Transaction insights: a fixed set of analytical queries against the
//! transactions warehouse, rendered as a three-chart dashboard.
//!
//! Pipeline, in the only order it runs:
//!   credentials → warehouse → fetch loop → typed series → dashboard page

pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod rng;
pub mod seed;
pub mod table;
pub mod types;
pub mod warehouse;
