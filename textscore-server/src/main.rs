use std::time::Duration;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use textscore_ai::models::{
    ModelSpec, DEFAULT_GIBBERISH_MODEL, DEFAULT_MAX_TOKENS, DEFAULT_REVISION, DEFAULT_TOXICITY_MODEL,
};
use textscore_core::db::wait_for_db;
use textscore_core::http::DEFAULT_CORS_ORIGIN;
use textscore_core::{Database, DbConfig};

mod context;
mod server;

#[derive(Parser, Debug, Clone)]
#[command(name = "textscore")]
#[command(author, version, about = "Scores text for toxicity and gibberish and keeps the results in Postgres")]
pub struct Args {
    /// Address the HTTP server binds to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    pub bind_addr: String,

    /// Full Postgres URL. Overrides the --db-* parts when set.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    #[arg(long, env = "DB_USER", default_value = "textscore")]
    pub db_user: String,

    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub db_password: String,

    #[arg(long, env = "DB_NAME", default_value = "textscore")]
    pub db_name: String,

    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub db_max_connections: u32,

    /// Delay between connection attempts while waiting for Postgres
    #[arg(long, env = "DB_WAIT_INTERVAL_MS", default_value_t = 1000)]
    pub db_wait_interval_ms: u64,

    /// The single browser origin allowed to call the API
    #[arg(long, env = "CORS_ORIGIN", default_value = DEFAULT_CORS_ORIGIN)]
    pub cors_origin: String,

    /// Hub id or local directory of the toxicity classifier
    #[arg(long, env = "TOXICITY_MODEL", default_value = DEFAULT_TOXICITY_MODEL)]
    pub toxicity_model: String,

    /// Hub id or local directory of the gibberish classifier
    #[arg(long, env = "GIBBERISH_MODEL", default_value = DEFAULT_GIBBERISH_MODEL)]
    pub gibberish_model: String,

    #[arg(long, env = "MODEL_REVISION", default_value = DEFAULT_REVISION)]
    pub model_revision: String,

    /// Inputs are truncated to this many tokens before inference
    #[arg(long, env = "MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: usize,

    /// Use the built-in heuristic scorer instead of downloading models
    #[arg(long, env = "STUB_MODELS", default_value_t = false)]
    pub stub_models: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Apply pending migrations, then run the HTTP API (default)
    Serve {
        /// Serve against the schema as-is, without applying migrations
        #[arg(long, default_value_t = false)]
        no_migrate: bool,
    },
    /// Apply pending migrations and exit
    Migrate,
    /// Drop all tables and recreate the schema. Deletes every stored analysis.
    ResetSchema {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Serve { no_migrate: false }
    }
}

impl Args {
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.database_url.clone().filter(|u| !u.trim().is_empty()),
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            database: self.db_name.clone(),
            max_connections: self.db_max_connections,
        }
    }

    pub fn wait_interval(&self) -> Duration {
        Duration::from_millis(self.db_wait_interval_ms)
    }

    /// Toxicity and gibberish specs, in that order.
    pub fn model_specs(&self) -> (ModelSpec, ModelSpec) {
        let spec = |id: &str, defaults: ModelSpec| ModelSpec {
            model_id: id.to_string(),
            ..defaults
        }
        .with_revision(self.model_revision.clone())
        .with_max_tokens(self.max_tokens);

        (
            spec(&self.toxicity_model, ModelSpec::toxicity()),
            spec(&self.gibberish_model, ModelSpec::gibberish()),
        )
    }
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_log::LogTracer::init()?;
    let filter = EnvFilter::from_default_env()
        .add_directive("textscore=info".parse()?);
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)?;
    Ok(())
}

/// Waits for Postgres and opens a pool, for the one-shot schema commands.
async fn connect(args: &Args) -> anyhow::Result<Database> {
    let config = args.db_config();
    wait_for_db(&config, args.wait_interval(), None).await?;
    Ok(Database::new(&config).await?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing()?;
    let args = Args::parse();
    let command = args.command.clone().unwrap_or_default();
    info!("textscore starting. command={:?}, stub_models={}", command, args.stub_models);

    match command {
        Command::Serve { no_migrate } => {
            server::run_server(&args, !no_migrate).await?;
        }
        Command::Migrate => {
            let db = connect(&args).await?;
            db.migrate().await?;
            db.close().await;
        }
        Command::ResetSchema { yes } => {
            if !yes {
                bail!("reset-schema deletes every stored analysis; pass --yes to confirm");
            }
            let db = connect(&args).await?;
            warn!("Resetting schema on {}", args.db_config().describe());
            db.reset_schema().await?;
            db.close().await;
        }
    }

    info!("Main finished. Goodbye!");
    Ok(())
}
