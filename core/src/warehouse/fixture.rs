use super::Warehouse;
use crate::error::{InsightsError, InsightsResult};
use rusqlite::params;
use serde::{Deserialize, Serialize};

pub const DATASET_TABLES: [&str; 4] = ["profiles", "clients", "accounts", "transactions"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    pub placeofbirth: Option<String>,
    pub birthdate: String, // YYYY-MM-DD
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: String,
    pub profileid: String,
    pub createdat: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: String,
    pub clientid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub accountid: String,
    pub issueddate: String,
    pub status: String, // completed | pending | declined | reversed
    pub isactive: bool,
    pub merchantname: String,
    pub chargedamount: f64,
}

impl Warehouse {
    // ── Dataset loading ────────────────────────────────────────

    pub fn insert_profile(&self, p: &ProfileRecord) -> InsightsResult<()> {
        self.conn.execute(
            "INSERT INTO analytics.profiles (id, placeofbirth, birthdate) VALUES (?1, ?2, ?3)",
            params![p.id, p.placeofbirth, p.birthdate],
        )?;
        Ok(())
    }

    pub fn insert_client(&self, c: &ClientRecord) -> InsightsResult<()> {
        self.conn.execute(
            "INSERT INTO analytics.clients (id, profileid, createdat) VALUES (?1, ?2, ?3)",
            params![c.id, c.profileid, c.createdat],
        )?;
        Ok(())
    }

    pub fn insert_account(&self, a: &AccountRecord) -> InsightsResult<()> {
        self.conn.execute(
            "INSERT INTO analytics.accounts (id, clientid) VALUES (?1, ?2)",
            params![a.id, a.clientid],
        )?;
        Ok(())
    }

    pub fn insert_transaction(&self, t: &TransactionRecord) -> InsightsResult<()> {
        self.conn.execute(
            "INSERT INTO analytics.transactions (
                id, accountid, issueddate, status, isactive, merchantname, chargedamount
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                t.id,
                t.accountid,
                t.issueddate,
                t.status,
                t.isactive,
                t.merchantname,
                t.chargedamount,
            ],
        )?;
        Ok(())
    }

    /// Wrap a bulk load in one transaction.
    pub fn load_batch<F>(&self, load: F) -> InsightsResult<()>
    where
        F: FnOnce(&Warehouse) -> InsightsResult<()>,
    {
        self.conn.execute_batch("BEGIN;")?;
        match load(self) {
            Ok(()) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(())
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(e)
            }
        }
    }

    pub fn row_count(&self, table: &str) -> InsightsResult<i64> {
        if !DATASET_TABLES.contains(&table) {
            return Err(InsightsError::Other(anyhow::anyhow!(
                "'{table}' is not a dataset table"
            )));
        }
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM analytics.{table}"),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
