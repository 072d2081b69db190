use clap::Parser;
use credwatch::adapters::inbound::http::{build_router, serve};
use credwatch::adapters::outbound::console::{ApplicationListing, StdoutPresenter};
use credwatch::adapters::outbound::formatters::EmailReportFormatter;
use credwatch::adapters::outbound::network::{
    build_http_client, CachingTokenProvider, ClientCredentialsTokenClient, GraphDirectoryClient,
};
use credwatch::application::factories::DeliveryBackendFactory;
use credwatch::application::use_cases::AuditCredentialsUseCase;
use credwatch::application::{CredentialScheduler, Notifier, RunTrigger};
use credwatch::cli::{Args, Command};
use credwatch::config::{
    discover_config, env_lookup, load_config_from_path, AppConfig, ConfigFile, DirectoryConfig,
    GRAPH_SCOPE,
};
use credwatch::credential_audit::domain::ThresholdSet;
use credwatch::credential_audit::services::ThresholdFilter;
use credwatch::logging;
use credwatch::ports::inbound::{CredentialAuditPort, RunOutcome};
use credwatch::ports::outbound::OutputPresenter;
use credwatch::shared::{ExitCode, Result};
use std::io::IsTerminal;
use std::path::Path;
use std::process;
use std::sync::Arc;

type DirectoryClient = GraphDirectoryClient<CachingTokenProvider<ClientCredentialsTokenClient>>;

#[tokio::main]
async fn main() {
    // a missing .env is normal
    let _ = dotenvy::dotenv();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::InvalidArguments
            } else {
                ExitCode::Success
            };
            let _ = e.print();
            process::exit(code.as_i32());
        }
    };

    logging::init();

    let code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("\nCaused by: {}", err);
                source = err.source();
            }

            eprintln!();
            ExitCode::ApplicationError
        }
    };

    process::exit(code.as_i32());
}

async fn run(args: Args) -> Result<ExitCode> {
    let file = load_file_config(args.config.as_deref())?;

    match args.selected_command() {
        Command::Serve => run_server(file.as_ref()).await,
        Command::Check => run_check(file.as_ref()).await,
        Command::List { days } => run_list(days.as_deref()).await,
        Command::TestServices => run_test_services(file.as_ref()).await,
    }
}

fn load_file_config(path: Option<&Path>) -> Result<Option<ConfigFile>> {
    match path {
        Some(path) => load_config_from_path(path).map(Some),
        None => discover_config(&std::env::current_dir()?),
    }
}

fn directory_client(config: &DirectoryConfig, client: &reqwest::Client) -> DirectoryClient {
    let tokens = ClientCredentialsTokenClient::new(
        client.clone(),
        ClientCredentialsTokenClient::token_url(&config.authority_host, &config.tenant_id),
        config.client_id.clone(),
        config.client_secret.clone(),
        GRAPH_SCOPE.to_string(),
    );
    GraphDirectoryClient::new(
        client.clone(),
        config.graph_base_url.clone(),
        CachingTokenProvider::new(tokens),
    )
}

/// Wires the full pipeline: directory, notifier and scheduler
fn build_scheduler(config: &AppConfig) -> Result<Arc<CredentialScheduler<DirectoryClient>>> {
    let client = build_http_client()?;

    let backend = DeliveryBackendFactory::create(
        &config.mail.provider,
        &config.directory,
        config.tuning.email_poll,
        client.clone(),
    )?;
    let notifier = Notifier::new(
        backend,
        Box::new(EmailReportFormatter::new()),
        config.mail.from.clone(),
        config.mail.to.clone(),
    );

    tracing::debug!(
        tenant = %config.directory.tenant_id,
        backend = notifier.backend_name(),
        schedule = %config.tuning.schedule,
        thresholds = %config.tuning.thresholds,
        "configuration loaded"
    );

    Ok(Arc::new(CredentialScheduler::new(
        AuditCredentialsUseCase::new(directory_client(&config.directory, &client)),
        notifier,
        config.tuning.thresholds.clone(),
        config.tuning.schedule,
    )))
}

async fn run_server(file: Option<&ConfigFile>) -> Result<ExitCode> {
    let config = AppConfig::from_lookup(&env_lookup, file)?;
    let scheduler = build_scheduler(&config)?;

    // refuse to serve with credentials or a mail backend that do not work
    let report = scheduler.test_services().await?;
    tracing::info!(
        applications = report.applications_visible,
        backend = %report.delivery_backend,
        "startup service check passed"
    );

    scheduler.start();

    let router = build_router(scheduler.clone());
    let result = serve(router, &config.server.bind_address(), shutdown_signal()).await;

    scheduler.stop_scheduler();
    result.map(|_| ExitCode::Success)
}

async fn run_check(file: Option<&ConfigFile>) -> Result<ExitCode> {
    let config = AppConfig::from_lookup(&env_lookup, file)?;
    let scheduler = build_scheduler(&config)?;

    let outcome = scheduler.run(RunTrigger::Cli).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(match outcome {
        RunOutcome::Failed { .. } => ExitCode::ApplicationError,
        _ => ExitCode::Success,
    })
}

async fn run_list(days: Option<&str>) -> Result<ExitCode> {
    let directory = DirectoryConfig::from_lookup(&env_lookup)?;
    let client = build_http_client()?;
    let use_case = AuditCredentialsUseCase::new(directory_client(&directory, &client));

    let views = use_case.list_applications(chrono::Utc::now()).await?;
    let views = match days {
        Some(days) => ThresholdFilter::filter(&views, &ThresholdSet::parse_lenient(Some(days))),
        None => views,
    };

    let listing = ApplicationListing::new(std::io::stdout().is_terminal());
    StdoutPresenter::new().present(&listing.render(&views))?;
    Ok(ExitCode::Success)
}

async fn run_test_services(file: Option<&ConfigFile>) -> Result<ExitCode> {
    let config = AppConfig::from_lookup(&env_lookup, file)?;
    let scheduler = build_scheduler(&config)?;

    let report = scheduler.test_services().await?;
    println!(
        "✅ Directory reachable ({} applications), {} backend ready",
        report.applications_visible, report.delivery_backend
    );
    Ok(ExitCode::Success)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
