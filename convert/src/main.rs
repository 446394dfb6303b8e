use anyhow::{Context, Result};
use authconv_core::MigrationPaths;
use clap::{Parser, Subcommand, ValueEnum};
use records_sqlite::{Db, DbOptions, DestinationSummary, MigrationEngine, MigrationReport, RunMode};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat { Text, Json }

#[derive(Debug, Parser)]
#[command(name = "authdb-convert", version, about = "Convert a legacy authorization database to the token daemon schema")]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./authdb-convert.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version information
    Version,
    /// Migrate users and given flags from a legacy database into a new one
    Convert {
        /// Legacy database (must exist, opened read-only)
        source: PathBuf,
        /// New database (created if absent)
        destination: PathBuf,
        /// Run the full migration, then roll it back
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// Output format for the report
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// How long to wait on a locked database, in milliseconds
        #[arg(long)]
        busy_timeout_ms: Option<u64>,
    },
    /// Show which destination tables exist and how many rows they hold
    Inspect {
        database: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

struct Settings {
    mode: RunMode,
    format: OutputFormat,
    opts: DbOptions,
}

// flags beat config, config beats defaults
fn resolve(cfg: Option<&config::ConvertConfig>, dry_run: bool, format: Option<OutputFormat>, busy_timeout_ms: Option<u64>) -> Settings {
    let cfg = cfg.cloned().unwrap_or_default();
    let dry_run = dry_run || cfg.dry_run.unwrap_or(false);
    let format = format
        .or_else(|| cfg.format.as_deref().and_then(|s| OutputFormat::from_str(s, true).ok()))
        .unwrap_or(OutputFormat::Text);
    let mut opts = DbOptions::default();
    if let Some(ms) = busy_timeout_ms.or(cfg.busy_timeout_ms) {
        opts.busy_timeout_ms = ms;
    }
    Settings { mode: if dry_run { RunMode::DryRun } else { RunMode::Commit }, format, opts }
}

fn print_report(report: &MigrationReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(report)?),
        OutputFormat::Text => {
            if report.dry_run {
                println!("Dry run completed, nothing committed to '{}'.", report.destination.display());
            } else {
                println!("Database conversion completed successfully! New database saved at '{}'.", report.destination.display());
            }
            println!("  authorized_records: {} inserted ({} read)", report.records_inserted, report.users_read);
            println!(
                "  records_extra:      {} inserted, {} unmatched ({} read)",
                report.extras_inserted, report.extras_unmatched, report.given_read
            );
        }
    }
    Ok(())
}

fn print_summary(database: &std::path::Path, summary: &DestinationSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let obj = serde_json::json!({ "database": database, "tables": summary.tables });
            println!("{}", serde_json::to_string(&obj)?);
        }
        OutputFormat::Text => {
            println!("{}", database.display());
            for t in &summary.tables {
                match t.rows {
                    Some(n) => println!("  {:<20} {} rows", t.name, n),
                    None => println!("  {:<20} missing", t.name),
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)))
        .init();
    let loaded_cfg = config::load_config(cli.config.as_deref());
    match cli.command {
        Commands::Version => {
            println!("authdb-convert {} (core {})", env!("CARGO_PKG_VERSION"), authconv_core::version());
        }
        Commands::Convert { source, destination, dry_run, format, busy_timeout_ms } => {
            let settings = resolve(loaded_cfg.as_ref().and_then(|c| c.convert.as_ref()), dry_run, format, busy_timeout_ms);
            let paths = MigrationPaths::new(&source, &destination)?;
            let report = MigrationEngine::open(&paths, &settings.opts)
                .and_then(|engine| engine.run(settings.mode))
                .map_err(|e| {
                    error!(error = %e, "database conversion failed");
                    e
                })
                .with_context(|| format!("converting '{}' into '{}'", source.display(), destination.display()))?;
            print_report(&report, settings.format)?;
        }
        Commands::Inspect { database, format } => {
            let db = Db::open_read_only(&database, &DbOptions::default())
                .with_context(|| format!("opening '{}'", database.display()))?;
            print_summary(&database, &db.summary()?, format)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let cfg = config::ConvertConfig { dry_run: Some(false), busy_timeout_ms: Some(100), format: Some("json".into()) };
        let s = resolve(Some(&cfg), true, Some(OutputFormat::Text), Some(900));
        assert_eq!(s.mode, RunMode::DryRun);
        assert_eq!(s.format, OutputFormat::Text);
        assert_eq!(s.opts.busy_timeout_ms, 900);
    }

    #[test]
    fn config_fills_missing_flags() {
        let cfg = config::ConvertConfig { dry_run: Some(true), busy_timeout_ms: Some(100), format: Some("JSON".into()) };
        let s = resolve(Some(&cfg), false, None, None);
        assert_eq!(s.mode, RunMode::DryRun);
        assert_eq!(s.format, OutputFormat::Json);
        assert_eq!(s.opts.busy_timeout_ms, 100);
    }

    #[test]
    fn defaults_without_config() {
        let s = resolve(None, false, None, None);
        assert_eq!(s.mode, RunMode::Commit);
        assert_eq!(s.format, OutputFormat::Text);
        assert_eq!(s.opts, DbOptions::default());
    }

    #[test]
    fn convert_args_parse() {
        let cli = Cli::try_parse_from(["authdb-convert", "convert", "old.db", "new.db", "--dry-run", "--format", "json"]).unwrap();
        match cli.command {
            Commands::Convert { source, destination, dry_run, format, .. } => {
                assert_eq!(source, PathBuf::from("old.db"));
                assert_eq!(destination, PathBuf::from("new.db"));
                assert!(dry_run);
                assert_eq!(format, Some(OutputFormat::Json));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
