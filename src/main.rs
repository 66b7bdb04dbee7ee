use std::process::ExitCode;

use actix_multipart::form::MultipartFormConfig;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use sqlx::{Pool, Postgres};
use tracing::{error, info};

use job_board::api::job::{handlers::not_found, JobService};
use job_board::api::validation;
use job_board::cli::{Cli, Command};
use job_board::config::Config;
use job_board::db::{self, job_repository::PgJobRepository};
use job_board::shutdown::ShutdownCoordinator;
use job_board::storage::LogoStore;
use job_board::{logging, prerender, routes};

#[actix_web::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.log_dir) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.into_command(), config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    let pool = db::connection::get_connection(&config.database_url, config.max_db_connections)
        .await
        .context("Failed to connect to database")?;
    info!("Database connection pool established");

    match command {
        Command::Serve => {
            db::migrations::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            serve(config, pool).await?;
        }
        Command::Migrate => {
            let result = db::migrations::run_migrations(&pool).await;
            pool.close().await;
            result.context("Failed to run database migrations")?;
        }
        Command::Seed => {
            let jobs = db::seed::placeholder_jobs().context("Invalid placeholder data")?;
            let repo = PgJobRepository::new(pool.clone());
            let result = db::seed::seed(&repo, &jobs).await;
            pool.close().await;
            result.context("Error while seeding database")?;
        }
        Command::Prerender { out_dir } => {
            let service = JobService::new(PgJobRepository::new(pool.clone()));
            let result = prerender::prerender(&service, &out_dir).await;
            pool.close().await;
            result.context("Failed to prerender job pages")?;
        }
    }

    Ok(())
}

async fn serve(config: Config, pool: Pool<Postgres>) -> anyhow::Result<()> {
    info!("Starting job-board application");
    info!("Configuration loaded successfully:");
    info!("  - Max payload size: {} bytes", config.max_payload_size);
    info!("  - Max database connections: {}", config.max_db_connections);
    info!("  - Upload directory: {}", config.upload_dir.display());

    let max_payload_size = config.max_payload_size;
    let job_service = web::Data::new(JobService::new(PgJobRepository::new(pool.clone())));
    let logo_store = web::Data::new(LogoStore::new(&config.upload_dir));

    let server = HttpServer::new(move || {
        let payload_config = web::PayloadConfig::default().limit(max_payload_size);
        let multipart_config = MultipartFormConfig::default().total_limit(max_payload_size);

        App::new()
            .app_data(job_service.clone())
            .app_data(logo_store.clone())
            .app_data(payload_config)
            .app_data(multipart_config)
            .app_data(validation::query_config())
            .app_data(validation::form_config(max_payload_size))
            .configure(routes::<PgJobRepository>)
            .default_service(web::to(not_found))
    });

    info!("Server starting on http://{}:{}", config.host, config.port);

    let server = server
        .bind((config.host.as_str(), config.port))
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?
        .run();

    ShutdownCoordinator::start(server, pool)
        .wait_for_shutdown()
        .await?;
    Ok(())
}
