mod destination;
mod diagnose;
mod export;
mod sync;

use std::path::PathBuf;

use clap::Parser;
use pimsync_core::AppConfig;
use pimsync_source::PimClient;
use pimsync_storefront::StorefrontClient;
use tracing_subscriber::EnvFilter;

use destination::{Destination, Mode};
use diagnose::DiagnoseTarget;
use export::{export_file_name, ExportSchema, TsvExport};
use sync::SyncOptions;

#[derive(Debug, Parser)]
#[command(name = "pimsync")]
#[command(about = "Sync PIM product records to the storefront or a TSV export")]
struct Cli {
    /// Value matched against the PIM filter field (e.g. a part prefix)
    #[arg(long, required_unless_present = "diagnose")]
    prefix: Option<String>,
    /// Maximum number of records to fetch and sync
    #[arg(long, default_value_t = 5)]
    max: usize,
    /// Log what would be synced without writing anything
    #[arg(long)]
    dry_run: bool,
    /// Check connectivity to one side and exit
    #[arg(long, value_enum)]
    diagnose: Option<DiagnoseTarget>,
    /// Destination for synced records
    #[arg(long, value_enum, default_value_t = Mode::Remote)]
    mode: Mode,
    /// Column layout for `--mode tsv`
    #[arg(long, value_enum, default_value_t = ExportSchema::Staging)]
    schema: ExportSchema,
    /// Directory for `--mode tsv` output (overrides PIMSYNC_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = pimsync_core::load_app_config()
        .map_err(|e| anyhow::anyhow!("configuration error: {e}"))?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Some(target) = cli.diagnose {
        return diagnose::run(target, &config, cli.prefix.as_deref()).await;
    }

    let prefix = cli
        .prefix
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| anyhow::anyhow!("--prefix must not be empty"))?;

    let source = PimClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("failed to build PIM client: {e}"))?;
    let mut destination = build_destination(&cli, &config, prefix)?;
    let options = SyncOptions::from_config(&config, cli.max);

    let summary = sync::run(&source, &mut destination, prefix, &options).await?;
    if let Some(path) = destination.finish()? {
        println!("export written to {}", path.display());
    }
    println!("{summary}");
    Ok(())
}

fn build_destination(cli: &Cli, config: &AppConfig, prefix: &str) -> anyhow::Result<Destination> {
    if cli.dry_run {
        return Ok(Destination::DryRun(cli.mode));
    }
    match cli.mode {
        Mode::Remote => {
            let client = StorefrontClient::from_config(config)
                .map_err(|e| anyhow::anyhow!("failed to build storefront client: {e}"))?;
            Ok(Destination::Storefront(client))
        }
        Mode::Tsv => {
            let dir = cli.output_dir.as_ref().unwrap_or(&config.output_dir);
            let file_name = export_file_name(prefix, &chrono::Local::now());
            Ok(Destination::File(TsvExport::create(
                dir, &file_name, cli.schema,
            )?))
        }
    }
}
