//! JiraWidget
//!
//! Headless front end: log in, track issues, and print their progress.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use jirawidget_cli::{
    logging, ConfigManager, EventManager, IssueRegistry, RegistryEvent, RegistryEventType,
    SessionStore,
};
use jirawidget_core::models::{Config, IssueKey, TrackedIssue};
use jirawidget_jira::{login_url, CredentialStore, Session, SessionCookie};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

#[derive(Parser, Debug)]
#[command(name = "jirawidget")]
#[command(about = "Track Jira issue progress from linked activities", long_about = None)]
struct Args {
    /// Log level (overrides the configured level)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// JSON file of browser session cookies to use instead of a token
    #[arg(long, global = true)]
    cookies: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate credentials and remember the Jira URL and token
    Login {
        /// Jira base URL, e.g. https://jira.example.com/
        #[arg(long)]
        url: Option<String>,

        /// Personal access token (or API token with --username)
        #[arg(long, env = "JIRAWIDGET_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Use basic auth with this username
        #[arg(long)]
        username: Option<String>,
    },
    /// Forget the stored token and tracked issues
    Logout,
    /// Print the browser URL for an Okta/SSO login
    LoginUrl {
        #[arg(long)]
        url: Option<String>,
    },
    /// Start tracking issues
    Track {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Stop tracking issues
    Untrack {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Fetch every tracked issue once and print its progress
    Status,
    /// Refresh tracked issues periodically until interrupted
    Watch {
        /// Seconds between refreshes
        #[arg(short, long, default_value_t = 60)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_manager = ConfigManager::new()?;
    let config = config_manager.get().await;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.log_level.clone());
    let log_path = logging::init(&level)?;
    tracing::info!("JiraWidget {} starting", env!("CARGO_PKG_VERSION"));

    let store = SessionStore::with_timeout(Duration::from_secs(config.jira.request_timeout_secs));
    let credentials = CredentialStore::new();

    let result = run(args, &config_manager, &config, &store, &credentials).await;
    if let Err(ref e) = result {
        tracing::error!("Command failed: {:#}", e);
        eprintln!("Check log: {}", log_path.display());
    }
    result
}

async fn run(
    args: Args,
    config_manager: &ConfigManager,
    config: &Config,
    store: &SessionStore,
    credentials: &CredentialStore,
) -> Result<()> {
    match args.command {
        Command::Login {
            url,
            token,
            username,
        } => {
            let url = url
                .or_else(|| config.jira.base_url.clone())
                .ok_or_else(|| anyhow!("Please provide the Jira URL with --url"))?;

            let token = match &args.cookies {
                Some(path) => {
                    store.configure_cookies(&url, read_cookies(path)?).await?;
                    None
                }
                None => {
                    let token = token.ok_or_else(|| {
                        anyhow!("Please provide a token with --token or JIRAWIDGET_TOKEN")
                    })?;
                    match &username {
                        Some(user) => store.configure_basic(&url, user, &token).await?,
                        None => store.configure_bearer(&url, &token).await?,
                    };
                    Some(token)
                }
            };

            store
                .validate()
                .await
                .map_err(|e| anyhow!("Login failed. {}", e))?;

            if let Some(token) = token {
                credentials.save_token(&url, &token)?;
            }
            // Cookie sessions never use basic auth on later starts
            let username = username.filter(|_| args.cookies.is_none());
            config_manager.set_login(&url, username.as_deref()).await?;
            println!("Connected to {}", url);
        }

        Command::Logout => {
            if let Some(url) = &config.jira.base_url {
                credentials.delete_token(url)?;
            }
            store.clear().await;
            config_manager.clear_tracked_issues().await?;
            tracing::info!("Logged out");
            println!("Logged out.");
        }

        Command::LoginUrl { url } => {
            let url = url
                .or_else(|| config.jira.base_url.clone())
                .ok_or_else(|| anyhow!("Please provide the Jira URL with --url"))?;
            println!("{}", login_url(&url)?);
        }

        Command::Track { keys } => {
            for raw in keys {
                let key = IssueKey::parse(&raw, &config.jira.project_key)?;
                if config_manager.add_tracked_issue(&key).await? {
                    println!("Tracking {}", key);
                } else {
                    eprintln!("This issue is already being tracked: {}", key);
                }
            }
        }

        Command::Untrack { keys } => {
            for raw in keys {
                if config_manager.remove_tracked_issue(&raw).await? {
                    println!("Stopped tracking {}", IssueKey::normalize(&raw));
                } else {
                    eprintln!("Issue is not tracked: {}", IssueKey::normalize(&raw));
                }
            }
        }

        Command::Status => {
            let registry = load_registry(config, Arc::new(EventManager::new())).await;
            connect(config, args.cookies.as_deref(), store, credentials).await?;

            for issue in registry.refresh_all(store).await {
                println!("{}", render(&issue));
            }
        }

        Command::Watch { interval } => {
            let events = Arc::new(EventManager::new());
            let mut receiver = events.subscribe();
            let registry = load_registry(config, events).await;
            connect(config, args.cookies.as_deref(), store, credentials).await?;

            let printer = tokio::spawn(async move {
                loop {
                    match receiver.recv().await {
                        Ok(RegistryEvent {
                            event_type: RegistryEventType::Updated,
                            issue: Some(issue),
                            ..
                        }) => println!("{}", render(&issue)),
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!("Display lagged behind by {} events", skipped);
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            });

            let interval = Duration::from_secs(interval.max(1));
            registry
                .watch(store, interval, async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("Failed to listen for Ctrl-C: {}", e);
                    }
                })
                .await;

            printer.abort();
            store.clear().await;
        }
    }

    Ok(())
}

/// Configure the session from saved settings, then check it reaches Jira
async fn connect(
    config: &Config,
    cookies: Option<&Path>,
    store: &SessionStore,
    credentials: &CredentialStore,
) -> Result<Session> {
    let url = config
        .jira
        .base_url
        .as_deref()
        .ok_or_else(|| anyhow!("No Jira URL configured. Run `jirawidget login --url <URL>` first."))?;

    let session = match cookies {
        Some(path) => store.configure_cookies(url, read_cookies(path)?).await?,
        None => {
            let token = credentials
                .load_token(url)?
                .ok_or_else(|| anyhow!("No stored token for {}. Run `jirawidget login` first.", url))?;
            match &config.jira.username {
                Some(user) => store.configure_basic(url, user, &token).await?,
                None => store.configure_bearer(url, &token).await?,
            }
        }
    };

    store
        .validate()
        .await
        .map_err(|e| anyhow!("Login failed. {}", e))?;
    Ok(session)
}

async fn load_registry(config: &Config, events: Arc<EventManager>) -> IssueRegistry {
    let registry = IssueRegistry::new(events);
    for key in &config.tracked_issues {
        if let Err(e) = registry.add(key).await {
            tracing::warn!("Skipping saved issue: {}", e);
        }
    }
    registry
}

fn read_cookies(path: &Path) -> Result<Vec<SessionCookie>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cookie file {}", path.display()))?;
    let cookies: Vec<SessionCookie> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid cookie file {}", path.display()))?;
    if cookies.is_empty() {
        bail!("Cookie file {} contains no cookies", path.display());
    }
    Ok(cookies)
}

fn render(issue: &TrackedIssue) -> String {
    const WIDTH: usize = 20;
    let filled = usize::from(issue.percent()) * WIDTH / 100;
    format!(
        "{:<40} {:>3}% [{}{}] {}",
        issue.display_text(),
        issue.percent(),
        "#".repeat(filled),
        "-".repeat(WIDTH - filled),
        issue.status_text()
    )
}
