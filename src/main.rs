//! Fomento console - a terminal client for the Fomento administration
//! backend.
//!
//! The console signs in against the backend token service, keeps the
//! session record between runs, re-verifies it on every access, and
//! lists the modules the signed-in user is authorized to open.

mod api;
mod auth;
mod config;
mod models;

use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use api::ApiClient;
use auth::providers::CREDENTIALS_PROVIDER;
use auth::{
    credentials::DEFAULT_DOMAIN, Credentials, FileSessionStore, SessionManager, SessionStore,
    SessionToken,
};
use config::Config;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    eprintln!("Usage: fomento-console <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  login    Sign in and store a session");
    eprintln!("  status   Show the current session (default)");
    eprintln!("  modules  List modules the signed-in user may open");
    eprintln!("  logout   Drop the stored session");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("Fomento console starting");

    let config = Config::load().context("Failed to load configuration")?;
    let store = FileSessionStore::new(
        config.session_dir()?,
        config.session_secret.clone(),
        config.access_window_secs,
        config.max_session_secs,
    );
    let client = ApiClient::new(&config.backend_url).context("Failed to build API client")?;
    let manager = SessionManager::new(client.clone());

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("status");

    match command {
        "login" => login(&manager, &store).await,
        "status" => status(&manager, &store).await,
        "modules" => modules(&manager, &store, &client).await,
        "logout" => logout(&store),
        _ => {
            print_usage();
            std::process::exit(2);
        }
    }
}

/// Prompt for credentials and establish a new session.
///
/// Each field can be preset through the environment (FOMENTO_DOMAIN,
/// FOMENTO_USERNAME, FOMENTO_PASSWORD, FOMENTO_OTP) for scripted use.
async fn login(manager: &SessionManager<ApiClient>, store: &FileSessionStore) -> Result<()> {
    let domain = match std::env::var("FOMENTO_DOMAIN") {
        Ok(domain) if !domain.is_empty() => domain,
        _ => DEFAULT_DOMAIN.to_string(),
    };
    let username = env_or_prompt("FOMENTO_USERNAME", "Username: ")?;
    let password = match std::env::var("FOMENTO_PASSWORD") {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password("Password: ")?,
    };
    let otp = env_or_prompt("FOMENTO_OTP", "One-time code: ")?;

    let credentials = Credentials::new(domain, username, password, otp);

    match manager.authenticate(CREDENTIALS_PROVIDER, &credentials).await {
        Ok(token) => {
            store.save(&token).context("Failed to store session")?;
            println!(
                "Signed in as {}{}",
                token.sub,
                if token.is_superuser { " (superuser)" } else { "" }
            );
            Ok(())
        }
        Err(error) => {
            // All sign-in failures collapse to the same operator
            // message; details go to the log.
            warn!(error = %error, "sign-in failed");
            eprintln!("Sign-in failed.");
            std::process::exit(1);
        }
    }
}

/// Show the current session, if any survives a verification cycle.
async fn status(manager: &SessionManager<ApiClient>, store: &FileSessionStore) -> Result<()> {
    match current_session(manager, store).await? {
        Some(token) => {
            println!("{}", serde_json::to_string_pretty(&token.project())?);
            let remaining = token.seconds_until_claim_expiry();
            if remaining > 0 {
                println!("Access token expires in {}s", remaining);
            } else {
                println!("Access token expiry claim has passed");
            }
            Ok(())
        }
        None => {
            println!("Not signed in.");
            Ok(())
        }
    }
}

/// List the modules the signed-in user is authorized to open.
async fn modules(
    manager: &SessionManager<ApiClient>,
    store: &FileSessionStore,
    client: &ApiClient,
) -> Result<()> {
    let Some(token) = current_session(manager, store).await? else {
        eprintln!("Not signed in.");
        std::process::exit(1);
    };

    let list = client
        .fetch_modules(&token.access_token)
        .await
        .context("Failed to fetch module list")?;

    for module in &list.modules {
        println!("{:>4}  {}", module.id, module.title);
    }
    println!("{} module(s)", list.total_records);
    Ok(())
}

fn logout(store: &FileSessionStore) -> Result<()> {
    store.clear().context("Failed to clear session")?;
    println!("Signed out.");
    Ok(())
}

/// One access cycle: load the stored session, run it through refresh,
/// and either extend it or drop it. Returns the live session, if any.
async fn current_session(
    manager: &SessionManager<ApiClient>,
    store: &FileSessionStore,
) -> Result<Option<SessionToken>> {
    let Some(token) = store.load().context("Failed to load session")? else {
        return Ok(None);
    };

    match manager.refresh(token).await {
        Some(mut token) => {
            token.touch();
            store.save(&token).context("Failed to store session")?;
            Ok(Some(token))
        }
        None => {
            store.clear().context("Failed to clear session")?;
            Ok(None)
        }
    }
}

fn env_or_prompt(var: &str, label: &str) -> Result<String> {
    if let Ok(value) = std::env::var(var) {
        if !value.is_empty() {
            return Ok(value);
        }
    }
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
