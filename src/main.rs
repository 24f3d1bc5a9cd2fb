mod cli;

use linguarr::{
    arr,
    audit::{AuditSettings, Auditor},
    cache::CacheSet,
    config,
    probe::{FfprobeInspector, Inspector},
    remediate::ConsolePrompt,
    report::Outcome,
};

use anyhow::Result;
use clap::Parser;
use cli::{CacheCommands, CacheStore, Cli, Commands};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "linguarr=debug,linguarr_probe=debug".to_string()
        } else {
            "linguarr=info,linguarr_probe=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Check {
            dry_run,
            interactive,
            catalog,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_check(
                cli.config.as_deref(),
                dry_run,
                interactive,
                catalog.as_deref(),
            ))
        }
        Commands::Probe { file, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_file(cli.config.as_deref(), &file, json))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(validate_config(path.as_deref()))
        }
        Commands::Cache { command } => cache_command(cli.config.as_deref(), command),
        Commands::Version => {
            println!("linguarr {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_check(
    config_path: Option<&std::path::Path>,
    dry_run: bool,
    interactive: bool,
    catalog_filter: Option<&str>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // CLI flags only ever tighten behavior; they never un-set config values.
    config.settings.dry_run |= dry_run;
    config.settings.interactive |= interactive;

    let catalogs: Vec<_> = config
        .catalogs
        .iter()
        .filter(|c| c.enabled)
        .filter(|c| catalog_filter.map_or(true, |name| c.name == name))
        .collect();

    if catalogs.is_empty() {
        match catalog_filter {
            Some(name) => anyhow::bail!("No enabled catalog named '{}' in config", name),
            None => anyhow::bail!("No enabled catalogs in config"),
        }
    }

    if config.settings.dry_run {
        tracing::info!("DRY RUN: no files will be deleted, no downloads will be queued");
    }

    let inspector = FfprobeInspector::locate(
        config.tools.ffprobe_path.as_deref(),
        config.settings.probe_timeout(),
    )?;

    let caches = Arc::new(CacheSet::open(&config.cache.resolved_dir()));

    let clients: Vec<_> = catalogs
        .iter()
        .map(|c| arr::create_client(c, config.settings.api_timeout()))
        .collect();

    let auditor = Auditor::new(
        Arc::new(inspector),
        caches,
        Arc::new(ConsolePrompt),
        AuditSettings::from(&config.settings),
    );

    let report = auditor.run(&clients).await;
    println!("\n{}", report);

    let inconsistent = report.count(|o| {
        matches!(
            o,
            Outcome::RemediationError {
                inconsistent: true,
                ..
            }
        )
    });
    if inconsistent > 0 {
        tracing::warn!(
            "{} items were deleted without a replacement being queued",
            inconsistent
        );
    }

    if !report.any_catalog_succeeded(clients.len()) {
        anyhow::bail!("Every enabled catalog failed, nothing was audited");
    }

    Ok(())
}

async fn probe_file(
    config_path: Option<&std::path::Path>,
    file: &std::path::Path,
    json: bool,
) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let inspector = FfprobeInspector::locate(
        config.tools.ffprobe_path.as_deref(),
        config.settings.probe_timeout(),
    )?;

    let inventory = inspector.inspect(file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&inventory)?);
    } else {
        println!("File: {}", file.display());

        println!("\nAudio Streams: {}", inventory.audio_streams.len());
        for (i, stream) in inventory.audio_streams.iter().enumerate() {
            println!(
                "  [{}] {} ({})",
                i,
                stream.codec,
                stream.language.as_deref().unwrap_or("no language tag")
            );
        }

        println!("\nSubtitle Streams: {}", inventory.subtitle_streams.len());
        for (i, stream) in inventory.subtitle_streams.iter().enumerate() {
            println!(
                "  [{}] {} ({})",
                i,
                stream.codec,
                stream.language.as_deref().unwrap_or("no language tag")
            );
        }
    }

    Ok(())
}

fn check_tools(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let info = linguarr_probe::check_ffprobe(config.tools.ffprobe_path.as_deref());

    if info.available {
        println!(
            "ffprobe: OK ({})",
            info.path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        );
        if let Some(version) = &info.version {
            println!("  {}", version);
        }
        Ok(())
    } else {
        println!("ffprobe: NOT FOUND");
        println!("  Install ffmpeg or set tools.ffprobe_path in the config.");
        anyhow::bail!("Required tool missing")
    }
}

async fn validate_config(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Configuration is valid.");
    println!("  catalogs: {}", config.catalogs.len());
    println!(
        "  languages: {}",
        config.settings.language_codes.join(", ")
    );
    println!("  cache dir: {}", config.cache.resolved_dir().display());

    let mut failures = 0;
    for catalog in config.catalogs.iter().filter(|c| c.enabled) {
        let client = arr::create_client(catalog, config.settings.api_timeout());
        match client.test_connection().await {
            Ok(true) => println!("  catalog '{}': reachable", catalog.name),
            Ok(false) => {
                println!("  catalog '{}': FAILED (unexpected status)", catalog.name);
                failures += 1;
            }
            Err(e) => {
                println!("  catalog '{}': FAILED ({})", catalog.name, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} catalog(s) unreachable", failures);
    }

    Ok(())
}

fn cache_command(config_path: Option<&std::path::Path>, command: CacheCommands) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let caches = CacheSet::open(&config.cache.resolved_dir());

    match command {
        CacheCommands::Stats => {
            println!("Cache dir: {}", config.cache.resolved_dir().display());
            println!("  probe inventories: {}", caches.probe.len());
            println!("  passed files:      {}", caches.passed.len());
            println!("  skip decisions:    {}", caches.skip.len());
            Ok(())
        }
        CacheCommands::Clear { store, entry } => match entry {
            Some(key) => {
                let removed = match store {
                    CacheStore::Probe => caches.probe.clear_entry(&key)?,
                    CacheStore::Passed => caches.passed.clear_entry(&key)?,
                    CacheStore::Skipped => caches.skip.clear_entry(&key)?,
                };
                if removed {
                    println!("Removed entry '{}'", key);
                } else {
                    println!("No entry '{}' found", key);
                }
                Ok(())
            }
            None => {
                match store {
                    CacheStore::Probe => caches.probe.clear()?,
                    CacheStore::Passed => caches.passed.clear()?,
                    CacheStore::Skipped => caches.skip.clear()?,
                }
                println!("Cleared the {:?} store", store);
                Ok(())
            }
        },
    }
}
