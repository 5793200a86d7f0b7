//! Sesame server binary.
//!
//! `sesame serve` runs the HTTP API; `sesame create-user` provisions an
//! account directly in the configured store.

use clap::{Args, Parser, Subcommand};
use sesame_api::config::ApiConfig;
use sesame_api::{AppState, open_store, router};
use sesame_core::models::auth::Role;
use sesame_core::store::{CredentialStore, normalize_identifier};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "sesame", version, about = "Credential login and bearer tokens")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Create an account.
    CreateUser(CreateUserArgs),
}

/// Store selection shared by every subcommand.
#[derive(Args, Debug)]
struct StoreArgs {
    /// PostgreSQL connection URL. Omit to keep users in memory.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR")]
    bind: Option<String>,

    #[command(flatten)]
    store: StoreArgs,

    /// Admin account created at startup when it does not exist yet.
    #[arg(long, env = "SESAME_ADMIN_USERNAME", requires = "admin_password")]
    admin_username: Option<String>,

    #[arg(long, env = "SESAME_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

#[derive(Args, Debug)]
struct CreateUserArgs {
    username: String,

    #[arg(long, env = "SESAME_NEW_PASSWORD", hide_env_values = true)]
    password: String,

    /// One of admin, pentester, client, asset_owner.
    #[arg(long, default_value = "client")]
    role: Role,

    /// Create the account disabled.
    #[arg(long, default_value_t = false)]
    inactive: bool,

    #[command(flatten)]
    store: StoreArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sesame_api=debug,sesame_core=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ApiConfig::from_env();

    match cli.command {
        Command::Serve(args) => serve(&mut config, args).await,
        Command::CreateUser(args) => create_user(&mut config, args).await,
    }
}

async fn serve(
    config: &mut ApiConfig,
    args: ServeArgs,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if args.store.database_url.is_some() {
        config.database_url = args.store.database_url;
    }

    info!(
        bind_addr = %config.bind_addr,
        ttl_secs = config.auth.token_ttl.num_seconds(),
        fingerprint_policy = %config.auth.fingerprint_policy,
        "starting sesame"
    );

    let store = open_store(config, args.store.max_connections).await?;
    let state = AppState::new(store, config.clone())?;

    if let (Some(username), Some(password)) = (args.admin_username, args.admin_password) {
        bootstrap_admin(&state, &username, &password).await?;
    }

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down");
    Ok(())
}

async fn bootstrap_admin(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if state
        .auth
        .store()
        .find_user_by_identifier(&normalize_identifier(username))
        .await?
        .is_some()
    {
        info!(username, "admin account already present");
        return Ok(());
    }
    let user = state
        .auth
        .provision_user(username, password, Role::Admin, true)
        .await?;
    info!(user_id = %user.id, username = %user.username, "admin account created");
    Ok(())
}

async fn create_user(
    config: &mut ApiConfig,
    args: CreateUserArgs,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if args.store.database_url.is_some() {
        config.database_url = args.store.database_url;
    }
    if config.database_url.is_none() {
        warn!("no DATABASE_URL; the account will not outlive this process");
    }

    let store = open_store(config, args.store.max_connections).await?;
    let state = AppState::new(store, config.clone())?;
    let user = state
        .auth
        .provision_user(&args.username, &args.password, args.role, !args.inactive)
        .await?;

    info!(
        user_id = %user.id,
        username = %user.username,
        role = %user.role,
        active = user.active,
        "user created"
    );
    println!("{}", user.id);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("ctrl-c received, shutting down");
}
