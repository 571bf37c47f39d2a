//! CLI entry point for the kinship-audit daemon.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::RwLock;
use tracing_subscriber::{fmt, EnvFilter};

use kinship_store::FamilyTree;

use kinship_audit::config::AuditConfig;
use kinship_audit::scheduler::{load_snapshot, sweep_snapshot_file, AuditScheduler};

#[derive(Parser)]
#[command(name = "kinship-audit")]
#[command(about = "Consistency auditor for the Kinship family graph")]
struct Cli {
    /// Snapshot file to audit (overrides audit.snapshot_path).
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Run a single sweep and exit.
    #[arg(long)]
    once: bool,

    /// Run as daemon with scheduled sweeps.
    #[arg(long)]
    daemon: bool,

    /// Write the cleaned snapshot back to the file after a sweep.
    #[arg(long)]
    write: bool,

    /// Config file prefix (default: kinship).
    #[arg(short, long, default_value = "kinship")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let audit_config = load_audit_config(&cli.config)?;
    let path = resolve_snapshot_path(&cli, &audit_config)?;

    if cli.once {
        let report = sweep_snapshot_file(&path, &audit_config, cli.write)?;
        tracing::info!(
            examined = report.examined,
            removed = report.removed.len(),
            "audit sweep complete"
        );
        println!("{}", serde_json::to_string(&report)?);
    } else if cli.daemon {
        let tree = FamilyTree::from_snapshot(load_snapshot(&path)?);
        tracing::info!(
            persons = tree.len(),
            path = %path.display(),
            interval_secs = audit_config.interval_secs,
            "Snapshot loaded, starting scheduler"
        );

        let tree = Arc::new(RwLock::new(tree));
        let mut sched = AuditScheduler::new(audit_config, tree);
        if cli.write {
            sched = sched.with_write_back(path);
        }
        sched.run().await?;
    } else {
        anyhow::bail!("Specify --once (one-shot sweep) or --daemon (scheduled sweeps)");
    }

    Ok(())
}

fn resolve_snapshot_path(cli: &Cli, config: &AuditConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = &cli.snapshot {
        return Ok(path.clone());
    }
    match &config.snapshot_path {
        Some(path) => Ok(PathBuf::from(path)),
        None => anyhow::bail!("Snapshot required: set --snapshot or audit.snapshot_path in config"),
    }
}

fn load_audit_config(file_prefix: &str) -> anyhow::Result<AuditConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("KINSHIP_AUDIT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    match cfg.get::<AuditConfig>("audit") {
        Ok(c) => Ok(c),
        Err(_) => Ok(AuditConfig::default()),
    }
}
