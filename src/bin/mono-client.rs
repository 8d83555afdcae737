use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use mono_client::config::{backend_url_from_env, ClientOptions, TokenStorage};
use mono_client::router::{Navigation, Route};
use mono_client::{view, MonoClient};

const DEFAULT_TOKEN_FILE: &str = ".mono-session.json";

#[derive(Parser, Debug)]
#[clap(name = "mono-client", version)]
#[clap(about = "Command-line client for the mono banking API", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Backend base URL. Falls back to MONO_BACKEND_URL.
    #[clap(long)]
    backend_url: Option<String>,

    /// File holding the session tokens. Falls back to MONO_TOKEN_FILE, then .mono-session.json
    #[clap(long)]
    token_file: Option<PathBuf>,

    /// Output debug logs to stderr
    #[clap(long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Telegram id used as the login
        #[clap(long)]
        tg_id: String,
        #[clap(long, env = "MONO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Navigate to a path such as /cards or /jars/<id>
    Open { path: String },
    /// List credit cards
    Cards,
    /// List jars
    Jars,
    /// Show one jar with its transactions
    Jar { jar_id: String },
}

async fn run() -> anyhow::Result<bool> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    if cli.debug {
        pretty_env_logger::formatted_builder()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        pretty_env_logger::init();
    }

    let backend_url = match cli.backend_url {
        Some(url) => url,
        None => backend_url_from_env()?,
    };

    let mut options = ClientOptions::from_env().context("invalid MONO_* environment")?;
    options.token_storage = match (cli.token_file, options.token_storage) {
        (Some(path), _) => TokenStorage::File(path),
        (None, TokenStorage::File(path)) => TokenStorage::File(path),
        (None, TokenStorage::Memory) => TokenStorage::File(PathBuf::from(DEFAULT_TOKEN_FILE)),
    };

    let client = MonoClient::new_with_options(&backend_url, options)
        .with_context(|| format!("cannot create client for {}", backend_url))?;
    let sweeper = client.notifications().spawn_sweeper();
    let router = client.router();
    let signing_out = matches!(cli.command, Commands::Logout);

    let navigation = match cli.command {
        Commands::Login { tg_id, password } => router.submit_login(&tg_id, &password).await,
        Commands::Logout => router.navigate(&Route::Logout).await,
        Commands::Open { path } => router.navigate_path(&path).await,
        Commands::Cards => router.navigate(&Route::Cards).await,
        Commands::Jars => router.navigate(&Route::Jars).await,
        Commands::Jar { jar_id } => router.navigate(&Route::JarDetail(jar_id)).await,
    };

    print!("{}", view::render(&navigation));

    // loader failures are reported with a delay
    tokio::time::sleep(client.options.loader_notify_delay * 2).await;
    eprint!("{}", view::render_notifications(&client.notifications().visible()));
    sweeper.abort();

    // a redirect to sign-in is only a success when signing out
    let ok = match &navigation {
        Navigation::LoginForm { error } => error.is_none(),
        Navigation::NotFound(_) => false,
        Navigation::Redirect(Route::Login) => signing_out,
        _ => true,
    };
    Ok(ok)
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
