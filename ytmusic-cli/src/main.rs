use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use qrcode::QrCode;
use qrcode::render::unicode::Dense1x2;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use ytmusic_api::auth::{
    BrowserHeaders, CredentialExchanger, FileTokenStorage, OAuthCredentials, OAuthSettings,
    OAuthToken, TokenStorage, parse_browser_headers,
};
use ytmusic_api::{AuthConfig, ListItem, YtMusic, YtMusicError};

#[derive(Parser)]
#[command(name = "ytmusic", version, about = "YouTube Music command-line client")]
struct Cli {
    /// Debug logging (otherwise `YTMUSIC_LOG`, default `warn`)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// OAuth client id
    #[arg(long, env = "YTMUSIC_CLIENT_ID", global = true)]
    client_id: Option<String>,
    /// OAuth client secret
    #[arg(long, env = "YTMUSIC_CLIENT_SECRET", global = true, hide_env_values = true)]
    client_secret: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in with the OAuth device flow
    Login,
    /// Import request headers copied from a logged-in browser
    Browser {
        /// File with raw headers (stdin if omitted)
        file: Option<PathBuf>,
    },
    /// Remove saved OAuth token and browser headers
    Logout,
    /// Show which credentials are configured and whether they work
    Status,
    /// Show home-feed shelves
    Home {
        #[arg(short, long, default_value = "3")]
        limit: usize,
    },
    /// List songs in your library
    Library {
        /// Max songs (all if omitted)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List playlist tracks
    Playlist {
        /// Playlist ID (with or without `VL`)
        playlist_id: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show the watch queue for a video or playlist
    Watch {
        /// Video ID
        video_id: Option<String>,
        /// Playlist ID
        #[arg(short, long)]
        playlist: Option<String>,
        #[arg(short, long, default_value = "25")]
        limit: usize,
    },
    /// Send a raw POST to an API endpoint and print the JSON response
    Request {
        /// Endpoint path, e.g. `browse`
        endpoint: String,
        /// JSON body
        #[arg(default_value = "{}")]
        body: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let creds = (cli.client_id, cli.client_secret);
    match cli.command {
        Command::Login => cmd_login(creds).await,
        Command::Browser { file } => cmd_browser(file),
        Command::Logout => cmd_logout().await,
        Command::Status => cmd_status(creds).await,
        Command::Home { limit } => cmd_home(creds, limit).await,
        Command::Library { limit } => cmd_library(creds, limit).await,
        Command::Playlist { playlist_id, limit } => cmd_playlist(creds, &playlist_id, limit).await,
        Command::Watch {
            video_id,
            playlist,
            limit,
        } => cmd_watch(creds, video_id.as_deref(), playlist.as_deref(), limit).await,
        Command::Request { endpoint, body } => cmd_request(creds, &endpoint, &body).await,
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("ytmusic_api=debug,ytmusic=debug")
    } else {
        EnvFilter::try_from_env("YTMUSIC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

type Creds = (Option<String>, Option<String>);

fn oauth_credentials(creds: Creds) -> Result<Option<OAuthCredentials>> {
    match creds {
        (Some(id), Some(secret)) => Ok(Some(OAuthCredentials::new(id, secret)?)),
        (None, None) => Ok(None),
        _ => bail!("both --client-id and --client-secret are required"),
    }
}

/// Build a session from saved credentials: OAuth token first, then browser
/// headers, else unauthenticated.
async fn open_session(creds: Creds) -> Result<YtMusic> {
    let storage = FileTokenStorage::new()?;
    if storage.load().await?.is_some() {
        if let Some(credentials) = oauth_credentials(creds)? {
            debug!("using saved oauth token");
            let settings = OAuthSettings::new(Arc::new(credentials), Arc::new(storage))
                .on_refreshed(|| info!("access token refreshed"));
            return Ok(YtMusic::new(AuthConfig::OAuth(settings))?);
        }
        eprintln!("warning: OAuth token found but no client id/secret given; ignoring it");
    }

    if let Some(headers) = BrowserHeaders::load()? {
        debug!("using saved browser headers");
        return Ok(YtMusic::new(AuthConfig::from_browser_headers(&headers.0)?)?);
    }

    Ok(YtMusic::new(AuthConfig::Unauthorized)?)
}

// ── login / logout ──

async fn cmd_login(creds: Creds) -> Result<()> {
    let credentials = oauth_credentials(creds)?
        .context("OAuth login needs --client-id and --client-secret")?;
    let code = credentials.get_code().await?;

    let url = format!("{}?user_code={}", code.verification_url, code.user_code);
    println!("Open {} and enter code {}", code.verification_url, code.user_code);
    match QrCode::new(url.as_bytes()) {
        Ok(qr) => {
            let image = qr
                .render::<Dense1x2>()
                .dark_color(Dense1x2::Light)
                .light_color(Dense1x2::Dark)
                .build();
            println!("{image}");
        }
        Err(e) => debug!(error = %e, "could not render QR code"),
    }

    let deadline = Instant::now() + Duration::from_secs(code.expires_in);
    let interval = Duration::from_secs(code.interval.max(1));
    let token = loop {
        tokio::time::sleep(interval).await;
        match credentials.token_from_code(&code.device_code).await {
            Ok(token) => break token,
            // authorization_pending / slow_down
            Err(YtMusicError::Server { status, .. }) if Instant::now() < deadline => {
                debug!(status, "waiting for approval");
            }
            Err(YtMusicError::Server { .. }) => bail!("device code expired before approval"),
            Err(e) => return Err(e.into()),
        }
    };

    let storage = FileTokenStorage::new()?;
    storage
        .save(&OAuthToken::from_record(token).to_record())
        .await?;
    println!("Token saved to {}.", storage.path().display());
    Ok(())
}

fn cmd_browser(file: Option<PathBuf>) -> Result<()> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            eprintln!("Paste request headers, then press Ctrl-D:");
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let headers = parse_browser_headers(&raw);
    // Fails here rather than on first use if the cookie is unusable.
    AuthConfig::from_browser_headers(&headers)?.into_provider(headers.clone())?;
    BrowserHeaders(headers).save()?;
    println!("Browser headers saved.");
    Ok(())
}

async fn cmd_logout() -> Result<()> {
    FileTokenStorage::new()?.clear().await?;
    BrowserHeaders::clear()?;
    println!("Credentials cleared.");
    Ok(())
}

async fn cmd_status(creds: Creds) -> Result<()> {
    let ytm = open_session(creds).await?;
    println!("Auth: {:?}", ytm.auth_type());
    if ytm.check_auth().is_err() {
        println!("Not logged in.");
        return Ok(());
    }
    match ytm.get_library_songs(Some(1)).await {
        Ok(_) => println!("Credentials accepted."),
        Err(e) => println!("Credentials rejected: {e}"),
    }
    Ok(())
}

// ── browsing ──

async fn cmd_home(creds: Creds, limit: usize) -> Result<()> {
    let ytm = open_session(creds).await?;
    for section in ytm.get_home(limit).await? {
        println!(
            "{} ({} items)",
            section.title.as_deref().unwrap_or(&section.kind),
            section.contents.len()
        );
    }
    Ok(())
}

async fn cmd_library(creds: Creds, limit: Option<usize>) -> Result<()> {
    let ytm = open_session(creds).await?;
    print_items(&ytm.get_library_songs(limit).await?);
    Ok(())
}

async fn cmd_playlist(creds: Creds, playlist_id: &str, limit: Option<usize>) -> Result<()> {
    let ytm = open_session(creds).await?;
    print_items(&ytm.get_playlist_items(playlist_id, limit).await?);
    Ok(())
}

async fn cmd_watch(
    creds: Creds,
    video_id: Option<&str>,
    playlist_id: Option<&str>,
    limit: usize,
) -> Result<()> {
    let ytm = open_session(creds).await?;
    print_items(&ytm.get_watch_playlist(video_id, playlist_id, limit).await?);
    Ok(())
}

async fn cmd_request(creds: Creds, endpoint: &str, body: &str) -> Result<()> {
    let body = serde_json::from_str(body).context("body is not valid JSON")?;
    let ytm = open_session(creds).await?;
    let response = ytm.send_request(endpoint, body, "").await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn print_items(items: &[ListItem]) {
    for item in items {
        println!(
            "  [{}] {}",
            item.video_id.as_deref().unwrap_or("-"),
            item.title.as_deref().unwrap_or("")
        );
    }
    println!("{} items", items.len());
}
