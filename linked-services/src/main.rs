mod cli;

use std::sync::Arc;
use async_trait::async_trait;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use anyhow::{bail, Context, Result};
use shared::types::{AuthenticationType, ServiceId, ServiceType};
use linked_services::config::Config;
use linked_services::form::DelimiterChoice;
use linked_services::gateway::HttpGateway;
use linked_services::presenter::{NoticeKind, Presenter};
use linked_services::registry::{self, ServiceRegistry};
use linked_services::selection::{Selection, SelectionCoordinator};
use linked_services::upload::Attachment;
use crate::cli::{AddCommands, Cli, Commands};

/// Notices go to stderr; confirmations are read from stdin unless `--yes`.
struct TerminalPresenter {
    assume_yes: bool,
}

#[async_trait]
impl Presenter for TerminalPresenter {
    async fn confirm(&self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{}: {} [y/N] ", title, message);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        match lines.next_line().await {
            Ok(Some(answer)) => matches!(answer.trim(), "y" | "Y" | "yes"),
            _ => false,
        }
    }

    fn notify(&self, message: &str, kind: NoticeKind) {
        match kind {
            NoticeKind::Success => eprintln!("{}", message),
            NoticeKind::Error => eprintln!("error: {}", message),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("linked_services=info,linkctl=info"))
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    if let Some(base_url) = cli.base_url {
        config.gateway.base_url = base_url;
    }
    tracing::debug!("Using linked services API at {}", config.gateway.base_url);

    let gateway = Arc::new(HttpGateway::new(&config.gateway).context("Failed to build HTTP client")?);
    let registry = Arc::new(ServiceRegistry::new(gateway.clone()));
    let assume_yes = matches!(cli.command, Commands::Delete { yes: true, .. });
    let coordinator = SelectionCoordinator::new(
        gateway,
        registry.clone(),
        Arc::new(TerminalPresenter { assume_yes }),
    );

    match cli.command {
        Commands::List => {
            coordinator.refresh().await.context("Failed to list linked services")?;
            for service in registry.all().iter() {
                println!(
                    "{}\t{}\t{}\t{}",
                    service.id.as_ref().map(ServiceId::as_str).unwrap_or("-"),
                    service.name,
                    service.summary(),
                    service.connection_status.as_str()
                );
            }
        }
        Commands::Show { id } => {
            let id = open(&coordinator, &id).await?;
            let Some(service) = registry.by_id(&id) else {
                bail!("No linked service with id {}", id);
            };
            println!("{} ({})", service.name, service.service_type());
            println!("  {}", service.summary());
            if !service.description.is_empty() {
                println!("  {}", service.description);
            }
            println!("  status: {}", service.connection_status.as_str());
            if let Some(message) = &service.connection_message {
                println!("  message: {}", message);
            }
            println!();
            for event in coordinator.event_log() {
                println!("{}", event);
            }
        }
        Commands::Test { id } => {
            open(&coordinator, &id).await?;
            coordinator.test_connection().await.context("Connection test failed")?;
            for event in coordinator.event_log() {
                println!("{}", event);
            }
        }
        Commands::Delete { id, .. } => {
            coordinator.refresh().await.context("Failed to list linked services")?;
            let id = ServiceId::new(id);
            if !coordinator.delete(&id).await.context("Delete failed")? {
                eprintln!("Cancelled");
            }
        }
        Commands::Add { kind } => {
            coordinator.refresh().await.context("Failed to list linked services")?;
            coordinator.start_new();
            fill_draft(&coordinator, kind);
            let saved = coordinator.save().await.context("Save failed")?;
            println!("{}", saved.id.as_ref().map(ServiceId::as_str).unwrap_or("-"));
        }
        Commands::Watch => watch(registry, config).await?,
    }

    Ok(())
}

/// Refreshes and opens `id` in the coordinator.
async fn open(coordinator: &SelectionCoordinator, id: &str) -> Result<ServiceId> {
    coordinator.refresh().await.context("Failed to list linked services")?;
    let id = ServiceId::new(id);
    coordinator.select_existing(&id);
    if coordinator.selection() == Selection::Empty {
        bail!("No linked service with id {}", id);
    }
    Ok(id)
}

fn fill_draft(coordinator: &SelectionCoordinator, kind: AddCommands) {
    coordinator.edit(|form| match kind {
        AddCommands::Db { common, server, database, username, password, trust_server_certificate } => {
            form.set_service_type(ServiceType::Database);
            if username.is_some() {
                form.set_authentication_type(AuthenticationType::Sql);
            }
            let draft = form.draft_mut();
            draft.name = common.name;
            draft.description = common.description;
            draft.database.server_name = server;
            draft.database.database_name = database;
            draft.database.username = username.unwrap_or_default();
            draft.database.password = password.unwrap_or_default();
            draft.database.trust_server_certificate = trust_server_certificate;
        }
        AddCommands::Ai { common, api_key } => {
            form.set_service_type(ServiceType::AiApi);
            let draft = form.draft_mut();
            draft.name = common.name;
            draft.description = common.description;
            draft.ai_api.api_key = api_key;
        }
        AddCommands::File { common, path, delimiter, no_header } => {
            form.set_service_type(ServiceType::File);
            form.attach(Attachment::from_path(path));
            let draft = form.draft_mut();
            draft.name = common.name;
            draft.description = common.description;
            if let Some(delimiter) = delimiter {
                let (choice, custom) = DelimiterChoice::from_stored(Some(&delimiter));
                draft.file.column_delimiter = choice;
                draft.file.custom_delimiter = custom;
            }
            if no_header {
                draft.file.first_row_as_header = false;
                draft.file.excel_first_row_as_header = false;
            }
        }
    });
}

async fn watch(registry: Arc<ServiceRegistry>, config: Config) -> Result<()> {
    let cancel = CancellationToken::new();
    let mut snapshots = registry.subscribe();

    let refresher = tokio::spawn(registry::run(registry.clone(), config.registry.clone(), cancel.clone()));

    let log_cancel = cancel.clone();
    let logger = tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = snapshots.borrow_and_update().clone();
                    for service in snapshot.services.iter() {
                        tracing::info!(
                            "{} {} [{}] {}",
                            service.id.as_ref().map(ServiceId::as_str).unwrap_or("-"),
                            service.name,
                            service.connection_status.as_str(),
                            service.summary()
                        );
                    }
                }
                _ = log_cancel.cancelled() => break,
            }
        }
    });

    tracing::info!(
        "Watching linked services every {}s",
        config.registry.refresh_interval_secs
    );

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutdown signal received");
    cancel.cancel();

    let (refreshed, _) = tokio::join!(refresher, logger);
    refreshed.context("Registry refresher panicked")??;

    tracing::info!("Shutdown complete");
    Ok(())
}
