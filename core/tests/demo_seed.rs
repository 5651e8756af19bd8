//! Demo dataset generation and the read-only connect path.

use chrono::NaiveDate;
use std::path::PathBuf;
use txn_insights_core::{
    catalog::QueryCatalog,
    config::WarehouseCredentials,
    fetch::fetch_all,
    metrics::{brackets_in_order, TOP_MERCHANTS_PER_BRACKET},
    seed::{seed_demo, DemoSpec},
    warehouse::{ProfileRecord, Warehouse},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn spec(seed: u64) -> DemoSpec {
    DemoSpec {
        seed,
        months: 3,
        clients: 60,
        as_of: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
    }
}

fn seeded(seed: u64) -> Warehouse {
    let wh = Warehouse::in_memory().unwrap();
    wh.migrate().unwrap();
    seed_demo(&wh, &spec(seed)).unwrap();
    wh
}

fn temp_db() -> PathBuf {
    std::env::temp_dir().join(format!("insights-{}.db", uuid::Uuid::new_v4()))
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn demo_covers_the_requested_months() {
    let _ = env_logger::builder().is_test(true).try_init();
    let wh = seeded(42);

    let results = fetch_all(&wh, &QueryCatalog::standard()).unwrap();
    let mau = results.monthly_active().unwrap();
    let months: Vec<String> = mau.iter().map(|m| m.month.to_string()).collect();
    assert_eq!(months, vec!["2024-01-01", "2024-02-01", "2024-03-01"]);
    assert!(mau.iter().all(|m| m.mau > 0));

    let churn = results.monthly_churn().unwrap();
    assert_eq!(churn.len(), 2);
    for c in &churn {
        let rate = c.churn_rate.expect("every prior month has active accounts");
        assert!((0.0..=100.0).contains(&rate), "rate {rate}");
    }
}

#[test]
fn demo_top_merchants_respect_the_cap() {
    let wh = seeded(7);
    let results = fetch_all(&wh, &QueryCatalog::standard()).unwrap();
    let volumes = results.top_merchants().unwrap();
    assert!(!volumes.is_empty());

    for bracket in brackets_in_order(&volumes) {
        let rows: Vec<_> = volumes.iter().filter(|v| v.bracket == bracket).collect();
        assert!(rows.len() <= TOP_MERCHANTS_PER_BRACKET, "{bracket}: {}", rows.len());
        assert!(rows.windows(2).all(|w| w[0].total_volume >= w[1].total_volume));
    }
}

#[test]
fn same_seed_same_dataset() {
    let a = seeded(0xDA5B);
    let b = seeded(0xDA5B);
    for table in ["profiles", "clients", "accounts", "transactions"] {
        assert_eq!(a.row_count(table).unwrap(), b.row_count(table).unwrap(), "{table}");
    }

    let ra = fetch_all(&a, &QueryCatalog::standard()).unwrap();
    let rb = fetch_all(&b, &QueryCatalog::standard()).unwrap();
    assert_eq!(ra.monthly_active().unwrap(), rb.monthly_active().unwrap());
    assert_eq!(ra.monthly_churn().unwrap(), rb.monthly_churn().unwrap());
    assert_eq!(ra.top_merchants().unwrap(), rb.top_merchants().unwrap());
}

#[test]
fn empty_spec_is_rejected() {
    let wh = Warehouse::in_memory().unwrap();
    wh.migrate().unwrap();
    let mut empty = spec(1);
    empty.clients = 0;
    assert!(seed_demo(&wh, &empty).is_err());
    assert_eq!(wh.row_count("profiles").unwrap(), 0);
}

#[test]
fn connect_reads_a_seeded_file_without_writing() {
    let path = temp_db();
    {
        let wh = Warehouse::create(&path).unwrap();
        wh.migrate().unwrap();
        seed_demo(&wh, &spec(99)).unwrap();
    }

    let creds = WarehouseCredentials {
        project_id: "demo".into(),
        client_email: None,
        warehouse_path: path.clone(),
    };
    let wh = Warehouse::connect(&creds).unwrap();
    let results = fetch_all(&wh, &QueryCatalog::standard()).unwrap();
    assert_eq!(results.tables().len(), 3);

    let write = wh.insert_profile(&ProfileRecord {
        id: "p-intruder".into(),
        placeofbirth: None,
        birthdate: "2000-01-01".into(),
    });
    assert!(write.is_err(), "read-only warehouse accepted a write");

    drop(wh);
    let _ = std::fs::remove_file(&path);
}
