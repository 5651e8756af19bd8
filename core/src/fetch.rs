//! The fetch loop.
//!
//! Runs every catalog entry in catalog order, one blocking call at a time.
//! The first failing query aborts the whole run; no partial results escape.

use crate::{
    catalog::{QueryCatalog, CHURN_RATE, MAU, TOP_MERCHANTS},
    error::{InsightsError, InsightsResult},
    metrics::{
        merchant_volumes_from_table, monthly_active_from_table, monthly_churn_from_table,
        MerchantVolume, MonthlyActive, MonthlyChurn,
    },
    table::ResultTable,
    warehouse::Warehouse,
};

/// Every catalog result of one run, in fetch order.
#[derive(Debug, Clone, Default)]
pub struct FetchedResults {
    tables: Vec<ResultTable>,
}

impl FetchedResults {
    pub fn table(&self, label: &str) -> InsightsResult<&ResultTable> {
        self.tables
            .iter()
            .find(|t| t.label == label)
            .ok_or_else(|| InsightsError::UnknownQuery {
                label: label.to_string(),
            })
    }

    pub fn tables(&self) -> &[ResultTable] {
        &self.tables
    }

    pub fn monthly_active(&self) -> InsightsResult<Vec<MonthlyActive>> {
        monthly_active_from_table(self.table(MAU)?)
    }

    pub fn monthly_churn(&self) -> InsightsResult<Vec<MonthlyChurn>> {
        monthly_churn_from_table(self.table(CHURN_RATE)?)
    }

    pub fn top_merchants(&self) -> InsightsResult<Vec<MerchantVolume>> {
        merchant_volumes_from_table(self.table(TOP_MERCHANTS)?)
    }

    pub fn from_tables(tables: Vec<ResultTable>) -> Self {
        Self { tables }
    }
}

pub fn fetch_all(warehouse: &Warehouse, catalog: &QueryCatalog) -> InsightsResult<FetchedResults> {
    let mut tables = Vec::with_capacity(catalog.len());
    for entry in catalog.iter() {
        println!("Fetching {}...", entry.label);
        log::info!("running query '{}'", entry.label);
        tables.push(warehouse.run_query(entry.label, entry.sql)?);
    }
    Ok(FetchedResults::from_tables(tables))
}
