//! Synthetic demo dataset.
//!
//! Populates an empty warehouse with profiles, clients, accounts and card
//! transactions over `months` consecutive calendar months ending with the
//! month of `as_of`. Output is fully determined by the seed, except
//! transaction ids.

use crate::{
    error::{InsightsError, InsightsResult},
    rng::{DemoRng, DemoStream},
    warehouse::{AccountRecord, ClientRecord, ProfileRecord, TransactionRecord, Warehouse},
};
use chrono::{Datelike, Months, NaiveDate};
use uuid::Uuid;

const MERCHANTS: [&str; 12] = [
    "Amazon", "Walmart", "Uber", "Netflix", "Spotify", "Starbucks",
    "Shell", "Target", "Apple", "Airbnb", "Steam", "IKEA",
];

const BIRTHPLACES: [&str; 6] = [
    "Mexico City", "Guadalajara", "Monterrey", "Puebla", "Madrid", "Bogotá",
];

/// Probability an enrolled account transacts in a given month.
const MONTHLY_ACTIVITY: f64 = 0.8;

#[derive(Debug, Clone)]
pub struct DemoSpec {
    pub seed: u64,
    pub months: u32,
    pub clients: usize,
    pub as_of: NaiveDate,
}

impl DemoSpec {
    pub fn new(seed: u64, months: u32, clients: usize) -> Self {
        Self {
            seed,
            months,
            clients,
            as_of: chrono::Utc::now().date_naive(),
        }
    }

    /// First day of the first generated month.
    pub fn first_month(&self) -> InsightsResult<NaiveDate> {
        let this_month = self.as_of.with_day(1).ok_or_else(|| bad_date(self.as_of))?;
        this_month
            .checked_sub_months(Months::new(self.months.saturating_sub(1)))
            .ok_or_else(|| bad_date(this_month))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoSummary {
    pub profiles: usize,
    pub clients: usize,
    pub accounts: usize,
    pub transactions: usize,
}

fn bad_date(date: NaiveDate) -> InsightsError {
    InsightsError::Other(anyhow::anyhow!("date arithmetic out of range at {date}"))
}

pub fn seed_demo(warehouse: &Warehouse, spec: &DemoSpec) -> InsightsResult<DemoSummary> {
    if spec.months == 0 || spec.clients == 0 {
        return Err(InsightsError::Other(anyhow::anyhow!(
            "demo dataset needs at least one month and one client"
        )));
    }
    let first_month = spec.first_month()?;
    let mut profile_rng = DemoRng::new(spec.seed, DemoStream::Profiles);
    let mut account_rng = DemoRng::new(spec.seed, DemoStream::Accounts);
    let mut txn_rng = DemoRng::new(spec.seed, DemoStream::Transactions);
    let mut summary = DemoSummary::default();

    warehouse.load_batch(|wh| {
        for i in 0..spec.clients {
            let profile = ProfileRecord {
                id: format!("p-{i:06}"),
                placeofbirth: Some(
                    BIRTHPLACES[profile_rng.next_u64_below(BIRTHPLACES.len() as u64) as usize]
                        .to_string(),
                ),
                birthdate: birthdate_for(&mut profile_rng, spec.as_of)?.to_string(),
            };
            wh.insert_profile(&profile)?;
            summary.profiles += 1;

            let client = ClientRecord {
                id: format!("c-{i:06}"),
                profileid: profile.id.clone(),
                createdat: format!("{first_month} 09:00:00"),
            };
            wh.insert_client(&client)?;
            summary.clients += 1;

            let account_count = account_rng.range_inclusive(1, 2);
            for a in 0..account_count {
                let account = AccountRecord {
                    id: format!("a-{i:06}-{a}"),
                    clientid: client.id.clone(),
                };
                wh.insert_account(&account)?;
                summary.accounts += 1;

                let joined = account_rng.next_u64_below(spec.months as u64) as u32;
                for m in joined..spec.months {
                    if !account_rng.chance(MONTHLY_ACTIVITY) {
                        continue;
                    }
                    let month = first_month
                        .checked_add_months(Months::new(m))
                        .ok_or_else(|| bad_date(first_month))?;
                    let count = txn_rng.range_inclusive(1, 6);
                    for _ in 0..count {
                        wh.insert_transaction(&transaction_in(&mut txn_rng, &account.id, month))?;
                        summary.transactions += 1;
                    }
                }
            }
        }
        Ok(())
    })?;

    log::info!(
        "seeded demo dataset: {} clients, {} accounts, {} transactions over {} months from {first_month}",
        summary.clients,
        summary.accounts,
        summary.transactions,
        spec.months
    );
    Ok(summary)
}

/// Birthdate giving an age in 18..=75 on `as_of`.
fn birthdate_for(rng: &mut DemoRng, as_of: NaiveDate) -> InsightsResult<NaiveDate> {
    let age = rng.range_inclusive(18, 75) as u32;
    let anniversary = as_of
        .checked_sub_months(Months::new(age * 12))
        .ok_or_else(|| bad_date(as_of))?;
    // Back off less than a year so the age stays put.
    let back = rng.range_inclusive(0, 364) as u64;
    anniversary
        .checked_sub_days(chrono::Days::new(back))
        .ok_or_else(|| bad_date(anniversary))
}

fn transaction_in(rng: &mut DemoRng, account_id: &str, month: NaiveDate) -> TransactionRecord {
    let day = rng.range_inclusive(1, 28);
    let hour = rng.range_inclusive(0, 23);
    let minute = rng.range_inclusive(0, 59);

    // Popular merchants dominate: Pareto-ranked index into the list.
    let rank = rng.pareto(1.0, 1.2).min(MERCHANTS.len() as f64) as usize;
    let merchant = MERCHANTS[rank.saturating_sub(1)];

    let status_roll = rng.next_f64();
    let status = if status_roll < 0.90 {
        "completed"
    } else if status_roll < 0.95 {
        "pending"
    } else if status_roll < 0.98 {
        "declined"
    } else {
        "reversed"
    };

    let amount = (rng.pareto(5.0, 1.5).min(1500.0) * 100.0).round() / 100.0;

    TransactionRecord {
        id: Uuid::new_v4().to_string(),
        accountid: account_id.to_string(),
        issueddate: format!(
            "{}-{:02}-{day:02} {hour:02}:{minute:02}:00",
            month.year(),
            month.month()
        ),
        status: status.into(),
        isactive: rng.chance(0.97),
        merchantname: merchant.into(),
        chargedamount: amount,
    }
}
