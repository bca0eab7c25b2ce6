//! Read-only asset host commands for operators.
//!
//! Nothing here deletes; `orphans` only reports hosted files that no product
//! and no logo references, for manual review.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use vitrine_assets::{AssetHost, AssetHostClient, AssetRecord, HostMatcher};
use vitrine_core::AppConfig;
use vitrine_reconciler::IdentifierResolver;

/// Sub-commands available under `assets`.
#[derive(Debug, Subcommand)]
pub enum AssetsCommands {
    /// List files on the asset host
    List {
        /// Folder to list (e.g. /products/<id>); the whole account when omitted
        #[arg(long)]
        folder: Option<String>,
        /// Maximum number of files to return (1-1000)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=1000))]
        limit: Option<u32>,
    },
    /// Resolve a stored asset URL to its remote identifier
    Resolve {
        /// Public URL or file path of the asset
        url: String,
    },
    /// Report hosted files in a folder that nothing references
    Orphans {
        /// Folder to inspect (e.g. /products)
        #[arg(long)]
        folder: String,
    },
}

/// Dispatches an `assets` sub-command.
///
/// # Errors
///
/// Returns an error if the asset host is not configured, a host call fails,
/// or (for `orphans`) the database cannot be read.
pub(crate) async fn run(config: &AppConfig, command: AssetsCommands) -> anyhow::Result<()> {
    let host: Arc<dyn AssetHost> = Arc::new(build_client(config)?);

    match command {
        AssetsCommands::List { folder, limit } => {
            let limit = limit.unwrap_or(config.assets_list_limit);
            let records = host
                .list(folder.as_deref(), limit)
                .await
                .context("listing assets")?;
            for record in &records {
                println!("{}", format_record(record));
            }
            eprintln!("{} file(s)", records.len());
        }
        AssetsCommands::Resolve { url } => {
            let resolver = IdentifierResolver::new(
                host,
                HostMatcher::new(config.assets_url_endpoint.as_deref()),
                config.assets_list_limit,
            );
            let remote_id = resolver.resolve(&url).await?;
            println!("{remote_id}");
        }
        AssetsCommands::Orphans { folder } => {
            run_orphans(config, host.as_ref(), &folder).await?;
        }
    }

    Ok(())
}

fn build_client(config: &AppConfig) -> anyhow::Result<AssetHostClient> {
    let key = config
        .assets_private_key
        .as_deref()
        .context("VITRINE_ASSETS_PRIVATE_KEY is required for asset commands")?;
    let client = AssetHostClient::with_base_urls(
        key,
        config.assets_timeout_secs,
        &config.assets_api_base_url,
        &config.assets_upload_base_url,
    )?;
    Ok(client)
}

async fn run_orphans(config: &AppConfig, host: &dyn AssetHost, folder: &str) -> anyhow::Result<()> {
    let pool = vitrine_db::connect_pool_from_config(config).await?;
    let mut referenced: HashSet<String> = vitrine_db::list_referenced_photo_urls(&pool)
        .await?
        .into_iter()
        .map(|url| strip_query(&url).to_owned())
        .collect();
    if let Some(logo) = vitrine_db::get_logo_slot(&pool).await?.into_asset() {
        referenced.insert(strip_query(&logo.url).to_owned());
    }

    let records = host
        .list(Some(folder), config.assets_list_limit)
        .await
        .with_context(|| format!("listing folder {folder}"))?;
    let orphans = find_orphans(&records, &referenced);

    for record in &orphans {
        println!("{}", format_record(record));
    }
    eprintln!(
        "{} of {} file(s) under {folder} are unreferenced",
        orphans.len(),
        records.len()
    );
    if records.len() >= config.assets_list_limit as usize {
        tracing::warn!(
            limit = config.assets_list_limit,
            "listing hit the page bound; files beyond it were not inspected"
        );
    }
    Ok(())
}

/// Records whose URL (ignoring any query string) is not in `referenced`.
pub(crate) fn find_orphans<'a>(
    records: &'a [AssetRecord],
    referenced: &HashSet<String>,
) -> Vec<&'a AssetRecord> {
    records
        .iter()
        .filter(|record| !referenced.contains(strip_query(&record.url)))
        .collect()
}

fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

fn format_record(record: &AssetRecord) -> String {
    format!(
        "{}\t{}\t{} bytes\t{}",
        record.file_id, record.file_path, record.size, record.url
    )
}
