pub mod aggregate;
pub mod canonical;
pub mod cli;
pub mod db;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod reconcile;
pub mod settings;
mod utils;

use chrono::{Local, NaiveDate, Utc};
use clap::Parser;
use log::{error, info};

use cli::{Cli, Command, IngestArgs, SummaryArgs};
use db::models::RunSummary;
use db::Database;
use error::IngestError;
use pipeline::{IngestRequest, RunReport};
use settings::IngestSettings;

fn parse_run_date(value: Option<&str>) -> Result<NaiveDate, IngestError> {
    match value {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|err| {
            IngestError::Config(format!("invalid --run-date '{raw}' (expected YYYY-MM-DD): {err}"))
        }),
        None => Ok(Local::now().date_naive()),
    }
}

fn print_summary(summary: &RunSummary) {
    println!(
        "{}: {} devices, {} active, {:.2}% compliant ({} non-compliant, {} grace), \
         {} workstations, {} servers, {} EOL, missing CS/Tanium/Jamf {}/{}/{}",
        summary.run_date,
        summary.total_devices,
        summary.active_devices,
        summary.compliance_pct,
        summary.noncompliant_devices,
        summary.grace_devices,
        summary.workstations,
        summary.servers,
        summary.eol_devices,
        summary.cs_missing,
        summary.tanium_missing,
        summary.jamf_missing
    );
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), IngestError> {
    let rendered = serde_json::to_string_pretty(value).map_err(anyhow::Error::from)?;
    println!("{rendered}");
    Ok(())
}

async fn run_ingest(args: IngestArgs) -> Result<RunReport, IngestError> {
    let input_dirs = args.directories();
    if input_dirs.is_empty() {
        return Err(IngestError::Config(
            "missing --in \"dirA;dirB\" input directories".into(),
        ));
    }
    let run_date = parse_run_date(args.run_date.as_deref())?;
    let settings = IngestSettings::load_or_default(args.config.as_deref())
        .map_err(|err| IngestError::Config(format!("{err:#}")))?;

    let request = IngestRequest {
        input_dirs,
        run_date,
        as_of: Utc::now(),
        settings,
    };
    // Settings and discovery failures must not leave a store behind.
    let plan = pipeline::plan(&request)?;
    let db = Database::new(args.out.clone()).map_err(|cause| IngestError::Persistence {
        run_date: pipeline::format_run_date(run_date),
        cause,
    })?;

    let report = pipeline::ingest_planned(&db, &request, plan).await?;
    if args.json {
        print_json(&report)?;
    } else {
        println!("Built {}", report.store.display());
        println!("Devices this run: {}", report.devices);
        println!("Compliance (active): {}%", report.summary.compliance_pct);
        for skipped in &report.skipped_files {
            println!("Skipped unreadable file: {}", skipped.display());
        }
    }
    Ok(report)
}

async fn run_summary(args: SummaryArgs) -> Result<(), IngestError> {
    if !args.out.exists() {
        return Err(IngestError::Config(format!(
            "store {} does not exist",
            args.out.display()
        )));
    }
    let db = Database::open_read_only(args.out.clone())?;

    let summaries = match args.run_date.as_deref() {
        Some(raw) => {
            let run_date = pipeline::format_run_date(parse_run_date(Some(raw))?);
            db.get_summary(&run_date).await?.into_iter().collect()
        }
        None => db.list_summaries().await?,
    };

    if args.json {
        print_json(&summaries)?;
    } else if summaries.is_empty() {
        println!("No summaries stored in {}", args.out.display());
    } else {
        summaries.iter().for_each(print_summary);
    }
    Ok(())
}

/// CLI entry point. Returns the process exit status.
pub fn run() -> i32 {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() { 1 } else { 0 };
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("Failed to start async runtime: {err}");
            return 4;
        }
    };

    let result = runtime.block_on(async move {
        match cli.command {
            Command::Ingest(args) => run_ingest(args).await.map(|report| {
                info!(
                    "Run {} for {} stored {} device(s)",
                    report.run_id, report.run_date, report.devices
                );
            }),
            Command::Summary(args) => run_summary(args).await,
        }
    });

    match result {
        Ok(()) => 0,
        Err(err) => {
            error!("{err}");
            err.exit_code()
        }
    }
}
