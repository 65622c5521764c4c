//! CLI entry point for the RKI/NDR district table job.
//!
//! Without a subcommand the corrected table is printed to stdout. `publish`
//! stores it locally or in S3 when it changed since the last run.

use anyhow::{Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use rki_ndr_districts::config::{AggregateRule, SOURCE_URL};
use rki_ndr_districts::fetch::{BasicClient, CachedFetch, HttpSource};
use rki_ndr_districts::output::{render_table, to_json, write_csv};
use rki_ndr_districts::pipeline::{build_table, write_districts};
use rki_ndr_districts::publish::{LocalStore, PublishOutcome, S3Store, Store};
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "rki_ndr_districts")]
#[command(about = "Builds the corrected RKI/NDR district case table", long_about = None)]
struct Cli {
    /// URL of the source CSV
    #[arg(long, global = true, default_value = SOURCE_URL)]
    url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, correct and print the table (default)
    Show {
        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Fetch, correct and store the table if it materially changed
    Publish {
        /// Directory to write rki_ndr_districts.csv into
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// S3 bucket to upload to (used when --out-dir is not given)
        #[arg(long, env = "S3_BUCKET")]
        s3_bucket: Option<String>,

        /// Optional key prefix inside the bucket
        #[arg(long)]
        s3_prefix: Option<String>,

        /// Gzip the object before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _file_guard = init_logging()?;

    let cli = Cli::parse();

    let source = CachedFetch::new(HttpSource::new(BasicClient::new()?, cli.url));
    let rule = AggregateRule::default();

    match cli.command.unwrap_or(Commands::Show {
        format: Format::Table,
    }) {
        Commands::Show { format } => {
            let table = build_table(&source, &rule, Utc::now).await?;
            let mut stdout = std::io::stdout().lock();
            match format {
                Format::Table => write!(stdout, "{}", render_table(&table))?,
                Format::Csv => write_csv(&table, &mut stdout)?,
                Format::Json => writeln!(stdout, "{}", to_json(&table)?)?,
            }
        }
        Commands::Publish {
            out_dir,
            s3_bucket,
            s3_prefix,
            gzip,
        } => {
            let store: Box<dyn Store> = match (out_dir, s3_bucket) {
                (Some(dir), _) => Box::new(LocalStore::new(dir)),
                (None, Some(bucket)) if !bucket.is_empty() => Box::new(
                    S3Store::from_env(bucket)
                        .await
                        .with_prefix(s3_prefix)
                        .with_gzip(gzip),
                ),
                _ => bail!("publish needs --out-dir or --s3-bucket (or S3_BUCKET)"),
            };

            info!(store = %store.describe(), "Publishing district table");
            match write_districts(&source, store.as_ref(), &rule, Utc::now).await? {
                PublishOutcome::Unchanged => info!("No material change, nothing uploaded"),
                PublishOutcome::Written { bytes } => info!(bytes, "District table uploaded"),
            }
        }
    }

    Ok(())
}

/// Coloured stderr output plus a JSON log file rolled daily.
fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/rki_ndr_districts.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("rki_ndr_districts.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(guard)
}
