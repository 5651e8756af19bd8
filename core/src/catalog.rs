//! The fixed query catalog.
//!
//! RULE: the catalog is static. Labels, SQL text and order never change at
//! runtime; the fetch loop runs the entries in the order listed here.
//!
//! Every query addresses the dataset through the `analytics` schema and is
//! parameterless. Months are rendered as `YYYY-MM-01` text.

use crate::{
    error::{InsightsError, InsightsResult},
    types::QueryLabel,
};

pub const MAU: QueryLabel = "mau";
pub const CHURN_RATE: QueryLabel = "churn_rate";
pub const TOP_MERCHANTS: QueryLabel = "top_merchants";

/// Distinct accounts with at least one completed, active transaction, per month.
pub const MAU_SQL: &str = "
WITH monthly_transactions AS (
    SELECT
        date(issueddate, 'start of month') AS month,
        accountid
    FROM analytics.transactions
    WHERE status = 'completed' AND isactive = 1
    GROUP BY 1, 2
)
SELECT
    month,
    COUNT(DISTINCT accountid) AS mau
FROM monthly_transactions
GROUP BY month
ORDER BY month
";

/// Churners and churn percentage for every month after the first observed one.
///
/// A churner for month M transacted in M-1 and not in M. The rate divides by
/// the active count of M-1 and is NULL when that month had nobody active.
pub const CHURN_RATE_SQL: &str = "
WITH RECURSIVE monthly_transactions AS (
    SELECT
        date(issueddate, 'start of month') AS month,
        accountid
    FROM analytics.transactions
    WHERE status = 'completed' AND isactive = 1
    GROUP BY 1, 2
),
bounds AS (
    SELECT MIN(month) AS first_month, MAX(month) AS last_month
    FROM monthly_transactions
),
months(month) AS (
    SELECT date(first_month, '+1 month')
    FROM bounds
    WHERE first_month < last_month
    UNION ALL
    SELECT date(months.month, '+1 month')
    FROM months, bounds
    WHERE months.month < bounds.last_month
),
churned_clients AS (
    SELECT
        months.month AS current_month,
        COUNT(prev.accountid) AS churners
    FROM months
    LEFT JOIN monthly_transactions prev
        ON prev.month = date(months.month, '-1 month')
        AND NOT EXISTS (
            SELECT 1
            FROM monthly_transactions curr
            WHERE curr.accountid = prev.accountid
              AND curr.month = months.month
        )
    GROUP BY months.month
),
monthly_active AS (
    SELECT month, COUNT(DISTINCT accountid) AS mau
    FROM monthly_transactions
    GROUP BY month
)
SELECT
    churned_clients.current_month AS current_month,
    churned_clients.churners AS churners,
    CAST(churned_clients.churners AS REAL) * 100.0 / NULLIF(prev_mau.mau, 0) AS churn_rate
FROM churned_clients
LEFT JOIN monthly_active AS prev_mau
    ON prev_mau.month = date(churned_clients.current_month, '-1 month')
ORDER BY churned_clients.current_month
";

/// Top five merchants by charged volume within each age bracket.
///
/// Age is whole years between the holder's profile birthdate and today.
/// Ties on volume rank alphabetically by merchant.
pub const TOP_MERCHANTS_SQL: &str = "
WITH client_age AS (
    SELECT
        clients.id AS client_id,
        CAST(strftime('%Y', 'now') AS INTEGER)
            - CAST(strftime('%Y', profiles.birthdate) AS INTEGER)
            - (strftime('%m-%d', 'now') < strftime('%m-%d', profiles.birthdate)) AS age
    FROM analytics.clients AS clients
    JOIN analytics.profiles AS profiles
        ON clients.profileid = profiles.id
),
age_brackets AS (
    SELECT
        client_id,
        CASE
            WHEN age BETWEEN 18 AND 25 THEN '18-25'
            WHEN age BETWEEN 26 AND 35 THEN '26-35'
            WHEN age BETWEEN 36 AND 50 THEN '36-50'
            ELSE '50+'
        END AS age_bracket
    FROM client_age
),
merchant_volume AS (
    SELECT
        transactions.merchantname,
        age_brackets.age_bracket,
        SUM(transactions.chargedamount) AS total_volume
    FROM analytics.transactions AS transactions
    JOIN analytics.accounts AS accounts
        ON transactions.accountid = accounts.id
    JOIN age_brackets
        ON accounts.clientid = age_brackets.client_id
    GROUP BY transactions.merchantname, age_brackets.age_bracket
),
ranked_merchants AS (
    SELECT
        age_bracket,
        merchantname,
        total_volume,
        ROW_NUMBER() OVER (
            PARTITION BY age_bracket
            ORDER BY total_volume DESC, merchantname ASC
        ) AS merchant_rank
    FROM merchant_volume
)
SELECT
    age_bracket,
    merchantname,
    total_volume
FROM ranked_merchants
WHERE merchant_rank <= 5
ORDER BY age_bracket, merchant_rank
";

#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub label: QueryLabel,
    pub sql: &'static str,
}

static STANDARD: [CatalogEntry; 3] = [
    CatalogEntry { label: MAU, sql: MAU_SQL },
    CatalogEntry { label: CHURN_RATE, sql: CHURN_RATE_SQL },
    CatalogEntry { label: TOP_MERCHANTS, sql: TOP_MERCHANTS_SQL },
];

#[derive(Debug, Clone, Copy)]
pub struct QueryCatalog {
    entries: &'static [CatalogEntry],
}

impl QueryCatalog {
    /// The three dashboard queries, in fetch order.
    pub fn standard() -> Self {
        Self { entries: &STANDARD }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static CatalogEntry> {
        self.entries.iter()
    }

    pub fn labels(&self) -> Vec<QueryLabel> {
        self.entries.iter().map(|e| e.label).collect()
    }

    pub fn get(&self, label: &str) -> InsightsResult<&'static CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .ok_or_else(|| InsightsError::UnknownQuery {
                label: label.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_order_is_fixed() {
        let catalog = QueryCatalog::standard();
        assert_eq!(catalog.labels(), vec![MAU, CHURN_RATE, TOP_MERCHANTS]);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let catalog = QueryCatalog::standard();
        assert!(catalog.get(CHURN_RATE).is_ok());
        assert!(matches!(
            catalog.get("ltv"),
            Err(InsightsError::UnknownQuery { .. })
        ));
    }
}
