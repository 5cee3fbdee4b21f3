use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::time::Duration;
use tgctl::config::{api_key_from_env, Config, Visibility};
use tgctl::ibm::auth::IamCredentials;
use tgctl::ibm::client::TransitGatewayClient;
use tgctl::ibm::http::format_api_error;
use tgctl::provider::connection_actions::{
    RESOURCE_NAME as CONNECTION_ACTIONS, TG_CONNECTION_ACTION, TG_CONNECTION_ID, TG_GATEWAY_ID,
};
use tgctl::provider::gateway::{DATA_SOURCE_NAME as GATEWAY, TG_NAME};
use tgctl::provider::{get_registry, Provider};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// IBM Cloud Transit Gateway resource handlers
#[derive(Parser, Debug)]
#[command(name = "tgctl", version = tgctl::VERSION, about, long_about = None)]
struct Args {
    /// Transit Gateway API endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// IAM endpoint used for the API key exchange
    #[arg(long, global = true)]
    iam_endpoint: Option<String>,

    /// API version date
    #[arg(long, global = true)]
    api_version: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read the ibm_tg_gateway data source for a gateway name
    Gateway {
        /// Gateway name
        name: String,
    },
    /// Approve or reject a cross-account connection (ibm_tg_connection_actions)
    ConnectionAction {
        /// Transit Gateway identifier
        #[arg(long)]
        gateway: String,
        /// Connection identifier
        #[arg(long)]
        connection: String,
        /// approve or reject
        #[arg(long)]
        action: String,
        /// Create timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Import and read a connection by <gateway>/<connection> id
    ConnectionActionRead {
        id: String,
    },
    /// Print resource and data source schemas
    Schema,
    /// Persist endpoint visibility
    Config {
        #[arg(long, value_enum)]
        visibility: VisibilityArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VisibilityArg {
    Public,
    Private,
}

impl From<VisibilityArg> for Visibility {
    fn from(value: VisibilityArg) -> Self {
        match value {
            VisibilityArg::Public => Visibility::Public,
            VisibilityArg::Private => Visibility::Private,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("tgctl started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("tgctl").join("tgctl.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".tgctl").join("tgctl.log");
    }
    PathBuf::from("tgctl.log")
}

fn build_provider(args: &Args, config: &Config) -> Result<Provider> {
    let api_key = api_key_from_env()
        .context("No API key found. Set IC_API_KEY or IBMCLOUD_API_KEY")?;

    let iam_endpoint = args
        .iam_endpoint
        .clone()
        .unwrap_or_else(|| config.effective_iam_endpoint());
    let endpoint = args
        .endpoint
        .clone()
        .unwrap_or_else(|| config.effective_endpoint());
    let version = args
        .api_version
        .clone()
        .unwrap_or_else(|| config.effective_api_version());

    tracing::debug!("Transit Gateway endpoint: {}, IAM: {}", endpoint, iam_endpoint);

    let credentials = IamCredentials::from_api_key(&api_key, &iam_endpoint)?;
    let client = TransitGatewayClient::new(credentials, &endpoint, &version)?;

    let provider = Provider::new(client);
    Ok(match config.create_timeout() {
        Some(timeout) => provider.with_create_timeout(timeout),
        None => provider,
    })
}

fn attributes(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

async fn run(args: Args) -> Result<Value> {
    let mut config = Config::load();

    match &args.command {
        Command::Schema => Ok(serde_json::to_value(get_registry())?),
        Command::Config { visibility } => {
            config.set_visibility((*visibility).into())?;
            Ok(serde_json::to_value(&config)?)
        },
        Command::Gateway { name } => {
            let provider = build_provider(&args, &config)?;
            let d = provider
                .read_data_source(GATEWAY, attributes(json!({ TG_NAME: name })))
                .await?;
            Ok(d.to_json())
        },
        Command::ConnectionAction {
            gateway,
            connection,
            action,
            timeout,
        } => {
            let mut provider = build_provider(&args, &config)?;
            if let Some(secs) = timeout {
                provider = provider.with_create_timeout(Duration::from_secs(*secs));
            }
            let d = provider
                .create(
                    CONNECTION_ACTIONS,
                    attributes(json!({
                        TG_GATEWAY_ID: gateway,
                        TG_CONNECTION_ID: connection,
                        TG_CONNECTION_ACTION: action,
                    })),
                )
                .await?;
            Ok(d.to_json())
        },
        Command::ConnectionActionRead { id } => {
            let provider = build_provider(&args, &config)?;
            let d = provider.import(CONNECTION_ACTIONS, id).await?;
            Ok(d.to_json())
        },
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: {:#}", e);
            None
        },
    };

    match run(args).await {
        Ok(state) => match serde_json::to_string_pretty(&state) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            },
        },
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            eprintln!("{}", format_api_error(&e));
            std::process::exit(1);
        },
    }
}
