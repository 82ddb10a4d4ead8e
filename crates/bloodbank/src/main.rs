//! `bloodbank` - CLI for the blood donor registry
//!
//! This binary registers donors, searches the registry, and shows the
//! dashboard counters.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::warn;

use bloodbank::cli::{
    Cli, Command, ConfigCommand, Console, OutputFormat, RegisterCommand, SearchCommand,
    TerminalCounters,
};
use bloodbank::{
    init_logging, Backend, BackendKind, Config, DonorFilter, Error, FollowUp, FormController,
    StatsReporter, StatsSource, SubmitOutcome, TableRenderer, TableView,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Config(cmd) => handle_config(&config, cmd),
        Command::Register(cmd) => handle_register(&open_backend(&config)?, &cmd).await,
        Command::Search(cmd) => handle_search(&open_backend(&config)?, &cmd).await,
        Command::Reset(cmd) => handle_reset(&open_backend(&config)?, cmd.format).await,
        Command::Stats => handle_stats(&open_backend(&config)?).await,
        Command::Dashboard(cmd) => handle_dashboard(&open_backend(&config)?, cmd.format).await,
        Command::Status(cmd) => handle_status(&config, &open_backend(&config)?, cmd.json).await,
    }
}

fn open_backend(config: &Config) -> anyhow::Result<Backend> {
    config.validate()?;
    Backend::open(config).context("failed to open donor store")
}

type StdConsole = Console<io::Stdout, io::Stderr>;

fn console(format: OutputFormat) -> StdConsole {
    Console::new(io::stdout(), io::stderr(), format)
}

fn print_view(console: &mut StdConsole, view: &TableView) -> anyhow::Result<()> {
    console.table(view)?;
    if view.is_error() {
        bail!("failed to load donors");
    }
    Ok(())
}

fn stats_reporter(backend: &Backend) -> Option<StatsReporter> {
    backend.stats_source().map(StatsReporter::new)
}

async fn animate_stats(reporter: &StatsReporter, out: &mut dyn Write) -> io::Result<bool> {
    let mut counters = TerminalCounters::new(out);
    let fetched = reporter.refresh(&mut counters).await;
    counters.finish()?;
    Ok(fetched.is_some())
}

async fn handle_register(backend: &Backend, cmd: &RegisterCommand) -> anyhow::Result<()> {
    let mut form = cmd.to_form();
    let mut controller = FormController::new(backend.repository());
    let mut console = console(cmd.format);

    match controller.submit(&mut form).await {
        SubmitOutcome::Registered { donor, follow_ups } => {
            console.notice(&format!("Donor registered successfully: {}", donor.full_name))?;
            let renderer = TableRenderer::new(backend.repository());
            for follow_up in follow_ups {
                match follow_up {
                    FollowUp::RefreshTable => {
                        if let Some(view) = renderer.refresh(&DonorFilter::all()).await {
                            print_view(&mut console, &view)?;
                        }
                    }
                    FollowUp::RefreshStats => {
                        if let Some(reporter) = stats_reporter(backend) {
                            animate_stats(&reporter, console.status()).await?;
                        }
                    }
                }
            }
            Ok(())
        }
        SubmitOutcome::Rejected(err) => Err(err).context("registration rejected"),
        SubmitOutcome::Failed(err) => Err(err).context("registration failed"),
    }
}

async fn handle_search(backend: &Backend, cmd: &SearchCommand) -> anyhow::Result<()> {
    let renderer = TableRenderer::new(backend.repository());
    if let Some(view) = renderer.refresh(&cmd.filter()).await {
        print_view(&mut console(cmd.format), &view)?;
    }
    Ok(())
}

async fn handle_reset(backend: &Backend, format: OutputFormat) -> anyhow::Result<()> {
    let renderer = TableRenderer::new(backend.repository());
    if let Some(view) = renderer.reset().await {
        print_view(&mut console(format), &view)?;
    }
    Ok(())
}

async fn handle_stats(backend: &Backend) -> anyhow::Result<()> {
    let Some(reporter) = stats_reporter(backend) else {
        return Err(Error::BackendUnsupported {
            operation: "stats",
            backend: "local",
        }
        .into());
    };
    if !animate_stats(&reporter, &mut io::stdout()).await? {
        bail!("stats are unavailable");
    }
    Ok(())
}

async fn handle_dashboard(backend: &Backend, format: OutputFormat) -> anyhow::Result<()> {
    let renderer = TableRenderer::new(backend.repository());
    let reporter = stats_reporter(backend);
    let mut console = console(format);

    let all = DonorFilter::all();
    let status = console.status();
    let (view, drawn) = tokio::join!(renderer.refresh(&all), async move {
        match &reporter {
            Some(reporter) => animate_stats(reporter, status).await,
            None => Ok(false),
        }
    });

    // Counter output is best effort.
    if let Err(err) = drawn {
        warn!("Failed to draw stats: {}", err);
    }

    if let Some(view) = view {
        print_view(&mut console, &view)?;
    }
    Ok(())
}

async fn handle_status(config: &Config, backend: &Backend, json: bool) -> anyhow::Result<()> {
    match backend {
        Backend::Local(repo) => {
            let donors = repo.count()?;
            let store = repo.store().stats()?;
            if json {
                let status = serde_json::json!({
                    "backend": BackendKind::Local,
                    "database_path": repo.store().path(),
                    "donors": donors,
                    "entries": store.entries,
                    "last_updated": store.last_updated,
                    "db_size_bytes": store.db_size_bytes,
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("bloodbank status");
                println!("----------------");
                println!("Backend:       local");
                println!("Database:      {}", repo.store().path().display());
                println!("Donors:        {donors}");
                println!("Size:          {} bytes", store.db_size_bytes);
                match store.last_updated {
                    Some(ts) => println!("Last updated:  {}", ts.to_rfc3339()),
                    None => println!("Last updated:  never"),
                }
            }
        }
        Backend::Remote(repo) => {
            let stats = repo.fetch_stats().await.ok();
            if json {
                let status = serde_json::json!({
                    "backend": BackendKind::Remote,
                    "base_url": repo.base_url().as_str(),
                    "timeout_secs": config.remote.timeout_secs,
                    "reachable": stats.is_some(),
                    "stats": stats,
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("bloodbank status");
                println!("----------------");
                println!("Backend:       remote");
                println!("API:           {}", repo.base_url());
                println!("Timeout:       {}s", config.remote.timeout_secs);
                match stats {
                    Some(stats) => {
                        println!("Donors:        {}", stats.registered_donors);
                        println!("Lives saved:   {}", stats.lives_saved);
                    }
                    None => println!("API:           unreachable"),
                }
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Store]");
                println!("  Backend:            {}", config.store.backend);
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Remote]");
                println!("  Base URL:           {}", config.remote.base_url);
                println!("  Timeout (secs):     {}", config.remote.timeout_secs);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            let loaded = Config::load_from(Some(path))?;
            loaded.validate()?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
