pub mod api;
pub mod config;
pub mod db;
pub mod entities;
pub mod policy;
pub mod services;
pub mod state;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use config::Config;
use db::Store;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "serve" | "-s" | "--serve" => run_server(config, prometheus_handle).await,

        "init" | "--init" => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        "admin" => {
            if args.len() < 3 {
                println!("Usage: balota admin <subcommand>");
                println!("Subcommands: set-password");
                return Ok(());
            }
            match args[2].as_str() {
                "set-password" => {
                    if args.len() < 5 {
                        println!("Usage: balota admin set-password <username> <new_password>");
                        return Ok(());
                    }
                    cmd_admin_set_password(&config, &args[3], &args[4]).await
                }
                _ => {
                    println!("Unknown admin subcommand: {}", args[2]);
                    println!("Use: set-password");
                    Ok(())
                }
            }
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("Balota - Voting & Registration Server");
    println!();
    println!("USAGE:");
    println!("  balota <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  serve             Start the web server");
    println!("  init              Create default config file");
    println!("  admin set-password <username> <password>");
    println!("                    Reset an admin password (local recovery)");
    println!("  help              Show this help message");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml to configure the database, server port, etc.");
}

async fn cmd_admin_set_password(
    config: &Config,
    username: &str,
    new_password: &str,
) -> anyhow::Result<()> {
    if new_password.len() < 8 {
        println!("Password must be at least 8 characters.");
        return Ok(());
    }

    let store = Store::new(&config.general.database_path).await?;
    store
        .set_admin_password(username, new_password, &config.security)
        .await?;

    println!("✓ Password updated for admin '{username}'");
    Ok(())
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("Balota v{} starting...", env!("CARGO_PKG_VERSION"));

    let port = config.server.port;
    let state = api::create_app_state_from_config(config, prometheus_handle).await?;
    let app = api::router(state).await;

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web server running at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Error listening for shutdown: {e}");
    } else {
        info!("Shutdown signal received");
    }
}
