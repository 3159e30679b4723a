use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use api_ingress::{wait_for_shutdown, ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use db::{ConnectOpts, DbHandle};
use library::{Library, LibraryConfig, TokenSettings};
use mimalloc::MiMalloc;
use runtime::{AppConfig, AuthConfig, CliArgs, ServerConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MOCK_DSN: &str = "sqlite::memory:";

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps in-memory DSNs as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> Result<String> {
    if dsn.contains(":memory:") {
        return Ok(dsn.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Library Server - catalog, members and lending over REST
#[derive(Parser)]
#[command(name = "library-server")]
#[command(about = "Library Server - catalog, members and lending over REST")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Create an Admin account
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Library Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args),
        Commands::CreateAdmin {
            email,
            name,
            password,
        } => create_admin(config, args, &name, &email, &password).await,
    }
}

fn bind_addr(server: &ServerConfig) -> Result<SocketAddr> {
    format!("{}:{}", server.host, server.port)
        .parse()
        .with_context(|| format!("invalid bind address '{}:{}'", server.host, server.port))
}

fn token_settings(auth: &AuthConfig) -> TokenSettings {
    if auth.uses_default_secrets() {
        tracing::warn!("auth uses the built-in development secrets; set auth.* before deploying");
    }
    TokenSettings {
        access_secret: auth.access_token_secret.clone(),
        refresh_secret: auth.refresh_token_secret.clone(),
        access_ttl: auth.access_token_ttl,
        refresh_ttl: auth.refresh_token_ttl,
    }
}

/// Configured DSN, or the in-memory one under `--mock`.
fn database_dsn(config: &AppConfig, args: &CliArgs) -> Result<String> {
    if args.mock {
        return Ok(MOCK_DSN.to_string());
    }
    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("Database configuration missing (use --mock for in-memory)"))?;
    let dsn = db_config.url.trim();
    if dsn.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    DbHandle::detect(dsn).map_err(|e| anyhow!("Invalid database DSN '{}': {}", dsn, e))?;

    if dsn.starts_with("sqlite://") {
        absolutize_sqlite_dsn(dsn, Path::new(&config.server.home_dir))
    } else {
        Ok(dsn.to_string())
    }
}

async fn connect_database(config: &AppConfig, args: &CliArgs) -> Result<DbHandle> {
    let dsn = database_dsn(config, args)?;
    let db_config = config.database.as_ref();
    let connect_opts = ConnectOpts {
        max_conns: db_config.and_then(|c| c.max_conns),
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: db_config
            .and_then(|c| c.busy_timeout_ms)
            .map(|ms| Duration::from_millis(u64::from(ms))),
        create_sqlite_dirs: true,
    };

    tracing::info!("Connecting to database: {}", dsn);
    let db = DbHandle::connect(&dsn, connect_opts).await?;
    tracing::info!("Connected DB backend: {:?}", db.engine());
    Ok(db)
}

/// Connects, migrates and wires the library module.
async fn init_library(config: &AppConfig, db: &DbHandle) -> Result<Library> {
    let library_config: LibraryConfig = config.module_config("library")?;
    let library = Library::new();
    library.migrate(db).await?;
    library.init(db.sea(), &library_config, &token_settings(&config.auth))?;
    Ok(library)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");
    let addr = bind_addr(&config.server)?;
    let ingress_config: ApiIngressConfig = config.module_config("api_ingress")?;

    let db = connect_database(&config, &args).await?;
    let library = init_library(&config, &db).await?;

    let ingress = ApiIngress::new(ingress_config)
        .with_request_timeout(Duration::from_secs(config.server.timeout_sec))
        .with_openapi(library.openapi());
    let router = ingress.build_router(library.router()?)?;

    let served = ingress
        .serve(addr, router, async {
            if let Err(e) = wait_for_shutdown().await {
                tracing::error!(error = %e, "shutdown signal handler failed");
            }
        })
        .await;

    db.close().await;
    tracing::info!("Library Server stopped");
    served
}

fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    bind_addr(&config.server)?;
    database_dsn(&config, &args)?;
    config.module_config::<LibraryConfig>("library")?;
    config.module_config::<ApiIngressConfig>("api_ingress")?;
    token_settings(&config.auth);

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn create_admin(
    config: AppConfig,
    args: CliArgs,
    name: &str,
    email: &str,
    password: &str,
) -> Result<()> {
    let db = connect_database(&config, &args).await?;
    let library = init_library(&config, &db).await?;

    let created = library.service()?.create_admin(name, email, password).await;
    db.close().await;

    let admin = created?;
    tracing::info!(user_id = %admin.id, "Admin account created");
    println!("Admin created: {} <{}>", admin.id, admin.email);
    Ok(())
}
