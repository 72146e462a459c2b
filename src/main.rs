use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use session_gate::app::{App, RunOutcome, Services};
use session_gate::config::{ConfigError, GateConfig};
use session_gate::local_state::{FileStore, LocalState, LocalStore, MemoryStore, StorageError};
use session_gate::net::firestore::FirestoreStore;
use session_gate::net::identity_toolkit::{IdentityToolkit, spawn_identity_feed};
use session_gate::net::session_api::HttpSessionApi;
use session_gate::net::types::{ApiError, DocumentStore, ProfileDocument};
use session_gate::observer::IdentityHub;
use session_gate::redirect::Navigator;
use session_gate::verifier::{SessionCheck, SessionVerifier};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("client setup failed: {0}")]
    Api(#[from] ApiError),
    #[error("local state error: {0}")]
    Storage(#[from] StorageError),
    #[error("output encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "session-gate", about = "Cross-subdomain session cookie test harness")]
struct Cli {
    /// Raw `Cookie` header value; saved to the local state file for later runs.
    #[arg(long, env = "SESSION_GATE_COOKIE")]
    session_cookie: Option<String>,

    /// Identity-provider ID token used to resolve the signed-in user.
    #[arg(long, env = "FIREBASE_ID_TOKEN")]
    id_token: Option<String>,

    #[arg(long)]
    current_url: Option<String>,

    #[arg(long)]
    redirect_delay_ms: Option<u64>,

    #[arg(long)]
    state_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the session check once and print the result as JSON.
    Check,
    /// Mount the app and print each screen it passes through.
    Run(RunArgs),
    /// Sign out, clear local state and redirect to login.
    SignOut,
    /// Print the login URL.
    LoginUrl {
        #[arg(long)]
        return_url: Option<String>,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// How long to wait for the profile after a successful check.
    #[arg(long, default_value_t = 5000)]
    settle_ms: u64,

    /// Sign out once the profile has been shown.
    #[arg(long, default_value_t = false)]
    sign_out: bool,
}

/// "Navigates" by printing the target; a terminal has no page to leave.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, url: &str) {
        println!("navigate: {url}");
    }
}

/// Document store used when no Firebase project is configured.
struct NoDocuments;

#[async_trait::async_trait]
impl DocumentStore for NoDocuments {
    async fn user_document(&self, _uid: &str) -> Result<Option<ProfileDocument>, ApiError> {
        Ok(None)
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = GateConfig::from_env()?;
    if let Some(url) = cli.current_url {
        config.current_url = url;
    }
    if let Some(ms) = cli.redirect_delay_ms {
        config.redirect_delay = Duration::from_millis(ms);
    }
    if let Some(path) = cli.state_file {
        config.state_file = Some(path);
    }

    let storage = local_state(&config);
    let cookie = storage.session_cookie(cli.session_cookie)?;
    let services = build_services(&config, cookie.as_deref(), cli.id_token, storage)?;

    match cli.command {
        Command::Check => run_check(&services).await,
        Command::Run(args) => run_app(&App::new(&config, services)?, args).await,
        Command::SignOut => {
            App::new(&config, services)?.sign_out().await;
            Ok(())
        }
        Command::LoginUrl { return_url } => {
            let app = App::new(&config, services)?;
            println!("{}", app.gate().login_url(return_url.as_deref()));
            Ok(())
        }
    }
}

fn local_state(config: &GateConfig) -> LocalState {
    let local: Arc<dyn LocalStore> = match &config.state_file {
        Some(path) => Arc::new(FileStore::new(path.clone())),
        None => Arc::new(MemoryStore::default()),
    };
    LocalState::new(Arc::new(MemoryStore::default()), local)
}

fn build_services(
    config: &GateConfig,
    cookie: Option<&str>,
    id_token: Option<String>,
    storage: LocalState,
) -> Result<Services, CliError> {
    let hub = Arc::new(IdentityHub::new());
    let documents: Arc<dyn DocumentStore> = match &config.firebase {
        Some(firebase) => {
            if let Some(token) = id_token.clone() {
                let toolkit = IdentityToolkit::new(&firebase.identity_base_url, firebase.api_key.clone())?;
                let _feed = spawn_identity_feed(Arc::clone(&hub), toolkit, token);
            } else {
                tracing::warn!("no ID token; the identity provider will report no user");
            }
            Arc::new(
                FirestoreStore::new(&firebase.firestore_base_url, &firebase.project_id, Some(firebase.api_key.clone()))?
                    .with_id_token(id_token),
            )
        }
        None => {
            tracing::warn!("FIREBASE_PROJECT_ID/FIREBASE_API_KEY not set; profile documents disabled");
            Arc::new(NoDocuments)
        }
    };

    Ok(Services {
        session_api: Arc::new(HttpSessionApi::new(&config.api_base_url, cookie)?),
        documents,
        identity: hub,
        navigator: Arc::new(ConsoleNavigator),
        storage,
    })
}

async fn run_check(services: &Services) -> Result<(), CliError> {
    let result = SessionVerifier::new(Arc::clone(&services.session_api)).check_auth().await;
    println!("{}", serde_json::to_string_pretty(&SessionCheck::from(&result))?);
    Ok(())
}

async fn run_app(app: &App, args: RunArgs) -> Result<(), CliError> {
    let outcome = app.run(Duration::from_millis(args.settle_ms), |text| println!("{text}")).await;
    if args.sign_out && outcome != RunOutcome::Redirected {
        app.sign_out().await;
    }
    Ok(())
}
