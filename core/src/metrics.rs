//! Typed, chart-ready views over the catalog results.
//!
//! Each view reshapes one `ResultTable` by column name. A missing column or
//! an unexpected cell type is an error, never a silent default.

use crate::{
    catalog::{CHURN_RATE, MAU, TOP_MERCHANTS},
    error::{InsightsError, InsightsResult},
    table::ResultTable,
    types::Month,
};
use serde::Serialize;
use std::fmt;

/// Maximum merchants listed per age bracket.
pub const TOP_MERCHANTS_PER_BRACKET: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyActive {
    pub month: Month,
    pub mau: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyChurn {
    pub month: Month,
    pub churners: i64,
    /// Percentage of the prior month's actives. `None` when the prior month
    /// had no active accounts.
    pub churn_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AgeBracket {
    #[serde(rename = "18-25")]
    From18To25,
    #[serde(rename = "26-35")]
    From26To35,
    #[serde(rename = "36-50")]
    From36To50,
    #[serde(rename = "50+")]
    Over50,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 4] = [
        AgeBracket::From18To25,
        AgeBracket::From26To35,
        AgeBracket::From36To50,
        AgeBracket::Over50,
    ];

    /// Step function over whole years of age. Anything outside 18..=50,
    /// including under-18s, falls into `Over50`, matching the SQL CASE.
    pub fn from_age(age: i64) -> Self {
        match age {
            18..=25 => AgeBracket::From18To25,
            26..=35 => AgeBracket::From26To35,
            36..=50 => AgeBracket::From36To50,
            _ => AgeBracket::Over50,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::From18To25 => "18-25",
            AgeBracket::From26To35 => "26-35",
            AgeBracket::From36To50 => "36-50",
            AgeBracket::Over50 => "50+",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.label() == label)
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantVolume {
    pub bracket: AgeBracket,
    pub merchant: String,
    pub total_volume: f64,
}

fn expect_label(table: &ResultTable, label: &str) -> InsightsResult<()> {
    if table.label != label {
        return Err(InsightsError::Other(anyhow::anyhow!(
            "expected result '{label}', got '{}'",
            table.label
        )));
    }
    Ok(())
}

pub fn monthly_active_from_table(table: &ResultTable) -> InsightsResult<Vec<MonthlyActive>> {
    expect_label(table, MAU)?;
    (0..table.len())
        .map(|row| {
            Ok(MonthlyActive {
                month: table.get_month(row, "month")?,
                mau: table.get_i64(row, "mau")?,
            })
        })
        .collect()
}

pub fn monthly_churn_from_table(table: &ResultTable) -> InsightsResult<Vec<MonthlyChurn>> {
    expect_label(table, CHURN_RATE)?;
    (0..table.len())
        .map(|row| {
            Ok(MonthlyChurn {
                month: table.get_month(row, "current_month")?,
                churners: table.get_i64(row, "churners")?,
                churn_rate: table.get_opt_f64(row, "churn_rate")?,
            })
        })
        .collect()
}

pub fn merchant_volumes_from_table(table: &ResultTable) -> InsightsResult<Vec<MerchantVolume>> {
    expect_label(table, TOP_MERCHANTS)?;
    (0..table.len())
        .map(|row| {
            let label = table.get_str(row, "age_bracket")?;
            let bracket =
                AgeBracket::from_label(label).ok_or_else(|| InsightsError::ColumnType {
                    label: table.label.clone(),
                    row,
                    column: "age_bracket".into(),
                    expected: "age bracket",
                    actual: format!("'{label}'"),
                })?;
            Ok(MerchantVolume {
                bracket,
                merchant: table.get_str(row, "merchantname")?.to_string(),
                total_volume: table.get_f64(row, "total_volume")?,
            })
        })
        .collect()
}

/// Brackets in the order they first appear in the result.
pub fn brackets_in_order(volumes: &[MerchantVolume]) -> Vec<AgeBracket> {
    let mut seen = Vec::new();
    for v in volumes {
        if !seen.contains(&v.bracket) {
            seen.push(v.bracket);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_boundaries_have_no_gap_or_overlap() {
        assert_eq!(AgeBracket::from_age(17), AgeBracket::Over50);
        assert_eq!(AgeBracket::from_age(18), AgeBracket::From18To25);
        assert_eq!(AgeBracket::from_age(25), AgeBracket::From18To25);
        assert_eq!(AgeBracket::from_age(26), AgeBracket::From26To35);
        assert_eq!(AgeBracket::from_age(35), AgeBracket::From26To35);
        assert_eq!(AgeBracket::from_age(36), AgeBracket::From36To50);
        assert_eq!(AgeBracket::from_age(50), AgeBracket::From36To50);
        assert_eq!(AgeBracket::from_age(51), AgeBracket::Over50);
    }

    #[test]
    fn labels_round_trip() {
        for b in AgeBracket::ALL {
            assert_eq!(AgeBracket::from_label(b.label()), Some(b));
        }
        assert_eq!(AgeBracket::from_label("60-70"), None);
    }
}
