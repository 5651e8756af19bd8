//! insights-runner: fetch the dashboard queries and serve the page.
//!
//! Usage:
//!   WAREHOUSE_CREDENTIALS=service-account.json insights-runner [--config dashboard.json]
//!       [--host 127.0.0.1] [--port 8050] [--output dashboard.html]
//!   insights-runner seed --db demo.db [--seed 42] [--months 3] [--clients 200]

mod server;

use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};
use txn_insights_core::{
    catalog::QueryCatalog,
    config::{DashboardConfig, WarehouseCredentials, CREDENTIALS_ENV},
    dashboard::Dashboard,
    fetch::{fetch_all, FetchedResults},
    seed::{seed_demo, DemoSpec},
    warehouse::Warehouse,
};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.get(1).map(String::as_str) == Some("seed") {
        return run_seed(&args);
    }
    run_dashboard(&args)
}

fn run_dashboard(args: &[String]) -> Result<()> {
    let mut config = match find_arg(args, "--config") {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(host) = find_arg(args, "--host") {
        config.host = host.to_string();
    }
    config.port = parse_arg(args, "--port", config.port);

    let creds = WarehouseCredentials::from_env()?;
    let results = {
        let warehouse = Warehouse::connect(&creds)?;
        fetch_all(&warehouse, &QueryCatalog::standard())?
    };
    print_summary(&results);

    let page = Dashboard::from_results(&config.title, &results)?.render_html()?;

    if let Some(output) = find_arg(args, "--output") {
        std::fs::write(output, &page)
            .map_err(|e| anyhow::anyhow!("Cannot write {output}: {e}"))?;
        println!("Dashboard written to {output}");
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(page, &config.bind_addr()))
}

fn run_seed(args: &[String]) -> Result<()> {
    let db = find_arg(args, "--db")
        .ok_or_else(|| anyhow::anyhow!("seed requires --db <path>"))?;
    let spec = DemoSpec::new(
        parse_arg(args, "--seed", 42u64),
        parse_arg(args, "--months", 3u32),
        parse_arg(args, "--clients", 200usize),
    );

    println!("Seeding demo warehouse");
    println!("  db:       {db}");
    println!("  seed:     {}", spec.seed);
    println!("  months:   {}", spec.months);
    println!("  clients:  {}", spec.clients);
    println!();

    let db_path = Path::new(db);
    let warehouse = Warehouse::create(db_path)?;
    warehouse.migrate()?;
    let summary = seed_demo(&warehouse, &spec)?;

    // Credentials sit next to the dataset and point at it by file name.
    let creds_path = PathBuf::from(format!("{db}.credentials.json"));
    let creds = WarehouseCredentials {
        project_id: "demo".into(),
        client_email: None,
        warehouse_path: db_path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| db_path.to_path_buf()),
    };
    creds.save(&creds_path)?;

    println!("=== SEED SUMMARY ===");
    println!("  profiles:      {}", summary.profiles);
    println!("  clients:       {}", summary.clients);
    println!("  accounts:      {}", summary.accounts);
    println!("  transactions:  {}", summary.transactions);
    println!();
    println!("Run the dashboard with:");
    println!("  {CREDENTIALS_ENV}={} insights-runner", creds_path.display());
    Ok(())
}

fn print_summary(results: &FetchedResults) {
    println!();
    println!("=== FETCH SUMMARY ===");
    for table in results.tables() {
        println!("  {:<15} {} rows", table.label, table.len());
    }
    println!();
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
